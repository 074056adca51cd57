use anyhow::{Context, Result};
use fracdisc::prelude::*;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run parameters recorded next to the fracture file.
#[derive(Serialize)]
pub struct Payload {
    pub add_only_known_fractures: bool,
    pub max_fractures: usize,
    pub config: PipelineCfg,
    pub report: GenerationReport,
    pub outputs: Vec<String>,
}

impl Payload {
    pub fn new(
        cfg: &PipelineCfg,
        opts: RunOptions,
        report: &GenerationReport,
        outputs: &[PathBuf],
    ) -> Self {
        Self {
            add_only_known_fractures: opts.add_only_known_fractures,
            max_fractures: opts.max_fractures,
            config: cfg.clone(),
            report: *report,
            outputs: outputs
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Document {
    code_rev: String,
    version: &'static str,
    callsite: Callsite,
    #[serde(flatten)]
    payload: Payload,
}

/// Write `<artifact stem>.provenance.json` beside `artifact`; returns its path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let path = provenance_path(artifact.as_ref());
    let callsite = Location::caller();
    let doc = Document {
        code_rev: current_git_rev(),
        version: fracdisc::VERSION,
        callsite: Callsite {
            file: callsite.file(),
            line: callsite.line(),
        },
        payload,
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("fracture_params"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit from `GIT_COMMIT` (build time, then runtime), else `git rev-parse HEAD`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_replaces_extension() {
        let derived = provenance_path(Path::new("/tmp/out/fracture_params.json"));
        assert_eq!(derived, Path::new("/tmp/out/fracture_params.provenance.json"));
    }

    #[test]
    fn sidecar_records_params_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("fracture_params.json");
        fs::write(&artifact, "[]").unwrap();
        let cfg = PipelineCfg::default();
        let opts = RunOptions {
            add_only_known_fractures: true,
            max_fractures: 12,
        };
        let report = GenerationReport {
            sampled: 12,
            emitted: 9,
            ..GenerationReport::default()
        };
        let payload = Payload::new(&cfg, opts, &report, &[artifact.clone()]);
        let path = write_sidecar(&artifact, payload).unwrap();
        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["max_fractures"], 12);
        assert_eq!(doc["add_only_known_fractures"], true);
        assert_eq!(doc["report"]["emitted"], 9);
        assert_eq!(doc["config"]["seed"], 12345);
        assert_eq!(doc["outputs"][0], artifact.to_string_lossy().as_ref());
        assert!(doc["callsite"]["line"].as_u64().unwrap() > 0);
    }
}
