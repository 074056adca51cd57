//! 3-D fracture discs built from sampled traces, and their JSON outputs.

use crate::area::Bounds;
use crate::config::PipelineCfg;
use crate::ensure_parent_dir;
use crate::error::{Error, Result};
use crate::network::{ClassifiedTrace, Network};
use crate::orientation::{normalize, sample_normal, SetOrientation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Elliptical disc as consumed by the downstream simulators. Angles in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fracture {
    pub center: [f64; 3],
    pub major_axis: f64,
    pub minor_axis: f64,
    pub major_axis_angle: f64,
    pub strike_angle: f64,
    pub dip_angle: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub domain_size: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct GenerateOpts {
    pub max_fractures: usize,
    /// Skip traces lacking a measured dip or dip direction instead of imputing.
    pub only_known: bool,
    pub dip_std: f64,
    pub dip_dir_std: f64,
}

impl GenerateOpts {
    /// Spread of the imputation draws comes from the pipeline configuration.
    pub fn from_cfg(cfg: &PipelineCfg, max_fractures: usize, only_known: bool) -> Self {
        Self {
            max_fractures,
            only_known,
            dip_std: cfg.dip_std,
            dip_dir_std: cfg.dip_dir_std,
        }
    }
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self::from_cfg(&PipelineCfg::default(), 100, false)
    }
}

/// Counters describing what happened to the sampled traces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub sampled: usize,
    pub emitted: usize,
    pub skipped_unclassified: usize,
    pub skipped_unknown_orientation: usize,
    pub skipped_outside_domain: usize,
    pub imputed_dip: usize,
    pub imputed_dip_dir: usize,
}

/// Disc from an already-resolved orientation (degrees), translated so that
/// `bounds.min` is the origin. `None` if the centroid falls below the origin.
pub fn build_fracture(
    trace: &ClassifiedTrace,
    dip: f64,
    dip_dir: f64,
    bounds: &Bounds,
    z: f64,
) -> Option<Fracture> {
    let centroid = trace.trace.geometry.centroid()?;
    let (x, y) = (centroid.x() - bounds.min.x, centroid.y() - bounds.min.y);
    if x < 0.0 || y < 0.0 || z < 0.0 {
        return None;
    }
    let (dip, strike) = normalize(dip, dip_dir);
    let radius = trace.trace.geometry.length() / 2.0;
    Some(Fracture {
        center: [x, y, z],
        major_axis: radius,
        minor_axis: radius,
        major_axis_angle: 0.0,
        strike_angle: strike.to_radians(),
        dip_angle: dip.to_radians(),
    })
}

/// Sample up to `opts.max_fractures` traces and turn each classified one into a disc.
///
/// Draw order per trace (dip, then dip direction, then z) is fixed so a seeded
/// `rng` reproduces the same output.
pub fn generate_fractures<R: Rng>(
    network: &Network,
    orientations: &[SetOrientation],
    opts: &GenerateOpts,
    rng: &mut R,
) -> Result<(Vec<Fracture>, GenerationReport)> {
    let bounds = network.bounds();
    let x_diff = bounds.x_diff();
    if x_diff.is_nan() || x_diff <= 0.0 {
        return Err(Error::DegenerateArea { x_diff });
    }
    let traces = network.traces();
    let amount = opts.max_fractures.min(traces.len());
    let picks = rand::seq::index::sample(&mut *rng, traces.len(), amount);

    let mut report = GenerationReport {
        sampled: amount,
        ..GenerationReport::default()
    };
    let mut fractures = Vec::with_capacity(amount);
    for idx in picks.into_iter() {
        let trace = &traces[idx];
        let Some(orientation) = trace
            .set
            .as_deref()
            .and_then(|label| orientations.iter().find(|o| o.label == label))
        else {
            report.skipped_unclassified += 1;
            continue;
        };

        let dip = match trace.trace.dip {
            Some(d) => d,
            None if opts.only_known => {
                report.skipped_unknown_orientation += 1;
                continue;
            }
            None => {
                report.imputed_dip += 1;
                sample_normal(rng, orientation.mean_dip()?, opts.dip_std)
            }
        };
        let dip_dir = match trace.trace.dip_dir {
            Some(d) => d,
            None if opts.only_known => {
                report.skipped_unknown_orientation += 1;
                continue;
            }
            None => {
                report.imputed_dip_dir += 1;
                sample_normal(rng, orientation.mean_dip_dir()?, opts.dip_dir_std)
            }
        };

        let z = rng.gen_range(0.0..x_diff);
        match build_fracture(trace, dip, dip_dir, &bounds, z) {
            Some(f) => fractures.push(f),
            None => {
                tracing::warn!(
                    trace = trace.trace.index,
                    "trace centroid lies outside the area bounds, skipping"
                );
                report.skipped_outside_domain += 1;
            }
        }
    }
    report.emitted = fractures.len();
    tracing::info!(
        sampled = report.sampled,
        emitted = report.emitted,
        unclassified = report.skipped_unclassified,
        unknown_orientation = report.skipped_unknown_orientation,
        imputed_dip = report.imputed_dip,
        imputed_dip_dir = report.imputed_dip_dir,
        "generate_fractures"
    );
    Ok((fractures, report))
}

/// Write the disc list as a JSON array indented by four spaces.
pub fn write_fractures(path: &Path, fractures: &[Fracture]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    fractures
        .serialize(&mut ser)
        .map_err(|e| Error::json(path, e))?;
    fs::write(path, buf).map_err(|e| Error::io(path, e))
}

pub fn write_domain(path: &Path, domain: &Domain) -> Result<()> {
    ensure_parent_dir(path)?;
    let body = serde_json::to_vec(domain).map_err(|e| Error::json(path, e))?;
    fs::write(path, body).map_err(|e| Error::io(path, e))
}
