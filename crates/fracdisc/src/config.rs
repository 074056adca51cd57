//! Pipeline configuration.
//!
//! `PipelineCfg::default()` reproduces the stock OG1 setup: fixed input and
//! output locations, three azimuth sets and a fallback orientation for set "1"
//! (no DIP/DIP_DIR was collected for it). Every field can be overridden from a
//! JSON file; missing fields keep their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted edge length of the diagnostic PNG.
pub const MAX_PLOT_SIZE_PX: u32 = 20_000;

/// Named azimuth range in compass degrees, both ends inclusive.
///
/// `start > end` wraps through north, e.g. `(160, 25)` covers `[160, 180) ∪ [0, 25]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AzimuthSet {
    pub label: String,
    pub start: f64,
    pub end: f64,
}

impl AzimuthSet {
    pub fn new(label: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Whether an azimuth (folded to [0, 180)) falls in this range.
    #[inline]
    pub fn contains(&self, azimuth: f64) -> bool {
        if self.start > self.end {
            azimuth >= self.start || azimuth <= self.end
        } else {
            self.start <= azimuth && azimuth <= self.end
        }
    }
}

/// Orientation used when a set carries no measured values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallbackOrientation {
    pub dip: f64,
    pub dip_dir: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    pub traces_path: PathBuf,
    pub area_path: PathBuf,
    pub output_dir: PathBuf,
    pub azimuth_sets: Vec<AzimuthSet>,
    pub fallback_orientations: BTreeMap<String, FallbackOrientation>,
    /// Seed for both trace sampling and orientation imputation.
    pub seed: u64,
    pub dip_std: f64,
    pub dip_dir_std: f64,
    /// Clip traces to the area polygon before classification.
    pub truncate_traces: bool,
    /// Edge length of the square diagnostic PNG.
    pub plot_size_px: u32,
    pub plot_title: String,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        let mut fallback_orientations = BTreeMap::new();
        fallback_orientations.insert(
            "1".to_string(),
            FallbackOrientation {
                dip: 85.0,
                dip_dir: 90.0,
            },
        );
        Self {
            traces_path: PathBuf::from("data/og1_clipped_traces.geojson"),
            area_path: PathBuf::from("data/og1_area_with_dip_data.geojson"),
            output_dir: PathBuf::from("outputs/fractopo_to_porepy_and_opengeosys/"),
            azimuth_sets: vec![
                AzimuthSet::new("1", 160.0, 25.0),
                AzimuthSet::new("2", 30.0, 60.0),
                AzimuthSet::new("3", 120.0, 150.0),
            ],
            fallback_orientations,
            seed: 12345,
            dip_std: 5.0,
            dip_dir_std: 10.0,
            truncate_traces: true,
            plot_size_px: 3000,
            plot_title: "OG1 clipped traces and area with dip data (colored by DIP data)".to_string(),
        }
    }
}

impl PipelineCfg {
    /// Load from a JSON file and validate.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
        let cfg: Self = serde_json::from_slice(&raw).map_err(|e| Error::json(path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.azimuth_sets.is_empty() {
            return Err(Error::config("need at least one azimuth set"));
        }
        let mut seen = HashSet::new();
        for set in &self.azimuth_sets {
            if !seen.insert(set.label.as_str()) {
                return Err(Error::config(format!(
                    "duplicate azimuth set label '{}'",
                    set.label
                )));
            }
            for bound in [set.start, set.end] {
                if !(0.0..=180.0).contains(&bound) {
                    return Err(Error::config(format!(
                        "azimuth set '{}' bound {bound} outside [0, 180]",
                        set.label
                    )));
                }
            }
        }
        for label in self.fallback_orientations.keys() {
            if !seen.contains(label.as_str()) {
                return Err(Error::config(format!(
                    "fallback orientation for unknown set '{label}'"
                )));
            }
        }
        for (name, value) in [("dip_std", self.dip_std), ("dip_dir_std", self.dip_dir_std)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::config(format!("{name} must be finite and > 0")));
            }
        }
        if self.plot_size_px == 0 || self.plot_size_px > MAX_PLOT_SIZE_PX {
            return Err(Error::config(format!(
                "plot_size_px must be in 1..={MAX_PLOT_SIZE_PX}, got {}",
                self.plot_size_px
            )));
        }
        Ok(())
    }

    pub fn set_labels(&self) -> impl Iterator<Item = &str> {
        self.azimuth_sets.iter().map(|s| s.label.as_str())
    }

    pub fn fallback(&self, label: &str) -> Option<FallbackOrientation> {
        self.fallback_orientations.get(label).copied()
    }

    pub fn fractures_path(&self) -> PathBuf {
        self.output_dir.join("fracture_params.json")
    }

    pub fn domain_path(&self) -> PathBuf {
        self.output_dir.join("domain.json")
    }

    pub fn plot_path(&self) -> PathBuf {
        self.output_dir.join("og1_traces_and_area.png")
    }
}
