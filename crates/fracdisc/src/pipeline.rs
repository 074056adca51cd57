//! End-to-end run: load → classify → impute → sample → build discs.
//!
//! `run` performs no writes; `RunOutput::write_all` produces the artifacts.
//! Loading validates the required DIP / DIP_DIR attributes, so a bad input
//! aborts before any output file exists.

use crate::area::{load_area, Area};
use crate::config::PipelineCfg;
use crate::error::{Error, Result};
use crate::fracture::{
    generate_fractures, write_domain, write_fractures, Domain, Fracture, GenerateOpts,
    GenerationReport,
};
use crate::network::Network;
use crate::orientation::{set_orientations, SetOrientation};
use crate::plot::save_plot;
use crate::trace::{load_traces, Trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Per-invocation switches, kept apart from the static configuration.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub add_only_known_fractures: bool,
    pub max_fractures: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            add_only_known_fractures: false,
            max_fractures: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOutput {
    /// Traces as loaded, before truncation; the plot shows these.
    pub traces: Vec<Trace>,
    pub area: Area,
    pub network: Network,
    pub orientations: Vec<SetOrientation>,
    pub fractures: Vec<Fracture>,
    pub report: GenerationReport,
    pub domain: Domain,
}

pub fn run(cfg: &PipelineCfg, opts: RunOptions) -> Result<RunOutput> {
    cfg.validate()?;
    let traces = load_traces(&cfg.traces_path)?;
    let area = load_area(&cfg.area_path)?;
    run_with(cfg, opts, traces, area)
}

/// Same as `run` but with layers already in memory.
pub fn run_with(
    cfg: &PipelineCfg,
    opts: RunOptions,
    traces: Vec<Trace>,
    area: Area,
) -> Result<RunOutput> {
    let x_diff = area.bounds().x_diff();
    if x_diff.is_nan() || x_diff <= 0.0 {
        return Err(Error::DegenerateArea { x_diff });
    }
    let network = Network::new(&traces, &area, cfg);
    let orientations = set_orientations(&network, cfg);
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let gen_opts = GenerateOpts::from_cfg(cfg, opts.max_fractures, opts.add_only_known_fractures);
    let (fractures, report) = generate_fractures(&network, &orientations, &gen_opts, &mut rng)?;
    Ok(RunOutput {
        traces,
        area,
        network,
        orientations,
        fractures,
        report,
        domain: Domain {
            domain_size: x_diff,
        },
    })
}

impl RunOutput {
    /// Write fractures, domain and plot under `cfg.output_dir`; returns the written paths.
    pub fn write_all(&self, cfg: &PipelineCfg) -> Result<Vec<PathBuf>> {
        let fractures_path = cfg.fractures_path();
        write_fractures(&fractures_path, &self.fractures)?;
        let domain_path = cfg.domain_path();
        write_domain(&domain_path, &self.domain)?;
        let plot_path = cfg.plot_path();
        save_plot(&plot_path, &self.area, &self.traces, cfg.plot_size_px, &cfg.plot_title)?;
        tracing::info!(
            dir = %cfg.output_dir.display(),
            fractures = self.fractures.len(),
            domain_size = self.domain.domain_size,
            "write_all"
        );
        Ok(vec![fractures_path, domain_path, plot_path])
    }
}
