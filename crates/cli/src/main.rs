use anyhow::{Context, Result};
use clap::Parser;
use fracdisc::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod summary;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Generate 3-D fracture disc parameters from trace and area GeoJSON files")]
struct Cmd {
    /// Only add fractures with known dip and dip direction
    #[arg(long)]
    add_only_known_fractures: bool,

    /// Maximum number of fractures to add
    #[arg(long, default_value_t = 100)]
    max_fractures: usize,

    /// Optional JSON file overriding paths, azimuth sets, fallbacks and seed
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = match &cmd.config {
        Some(path) => PipelineCfg::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineCfg::default(),
    };
    let opts = RunOptions {
        add_only_known_fractures: cmd.add_only_known_fractures,
        max_fractures: cmd.max_fractures,
    };
    generate(&cfg, opts)
}

fn generate(cfg: &PipelineCfg, opts: RunOptions) -> Result<()> {
    tracing::info!(
        traces = %cfg.traces_path.display(),
        area = %cfg.area_path.display(),
        only_known = opts.add_only_known_fractures,
        max_fractures = opts.max_fractures,
        seed = cfg.seed,
        "generate"
    );
    let out = fracdisc::pipeline::run(cfg, opts).context("generating fracture parameters")?;
    let mut outputs = out
        .write_all(cfg)
        .with_context(|| format!("writing outputs under {}", cfg.output_dir.display()))?;

    let summary_path = cfg.output_dir.join("set_summary.csv");
    summary::write_set_summary(&summary_path, &out.orientations)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    outputs.push(summary_path);

    let payload = provenance::Payload::new(cfg, opts, &out.report, &outputs);
    let prov_path = provenance::write_sidecar(cfg.fractures_path(), payload)?;
    tracing::info!(
        fractures = out.fractures.len(),
        provenance = %prov_path.display(),
        "done"
    );
    Ok(())
}
