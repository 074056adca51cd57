//! Fracture traces → 3-D fracture discs.
//!
//! Reads 2-D fracture traces and a bounding area (GeoJSON), sorts traces into
//! azimuth sets, fills in missing dip / dip-direction from per-set statistics,
//! and turns a random sample of traces into circular discs placed inside the
//! area's bounding box. The result feeds DFN-based geomechanical simulators.
//!
//! Layout
//! - `geojson`, `trace`, `area`: input layers and planar geometry.
//! - `network`: truncation and azimuth-set classification.
//! - `orientation`: dip classes, set means, imputation, strike/dip folding.
//! - `fracture`: disc construction and JSON outputs.
//! - `plot`: diagnostic PNG.
//! - `pipeline`: the end-to-end run.

pub mod area;
pub mod config;
pub mod error;
pub mod fracture;
pub mod geojson;
pub mod network;
pub mod orientation;
pub mod pipeline;
pub mod plot;
pub mod trace;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};

/// Create the parent directory of an output file; a bare file name needs nothing.
pub(crate) fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Common exports for callers driving a run.
pub mod prelude {
    pub use crate::area::{Area, Bounds};
    pub use crate::config::{AzimuthSet, FallbackOrientation, PipelineCfg};
    pub use crate::error::{Error, Result};
    pub use crate::fracture::{Domain, Fracture, GenerateOpts, GenerationReport};
    pub use crate::network::Network;
    pub use crate::orientation::{DipClass, SetOrientation};
    pub use crate::pipeline::{run, run_with, RunOptions, RunOutput};
    pub use crate::trace::Trace;
}
