//! Trace network: truncation to the area and azimuth-set classification.

use crate::area::{Area, Bounds};
use crate::config::{AzimuthSet, PipelineCfg};
use crate::trace::Trace;

/// A trace after truncation, with its azimuth and set label (`None` = unclassified).
#[derive(Clone, Debug)]
pub struct ClassifiedTrace {
    pub trace: Trace,
    pub azimuth: Option<f64>,
    pub set: Option<String>,
}

impl ClassifiedTrace {
    pub fn in_set(&self, label: &str) -> bool {
        self.set.as_deref() == Some(label)
    }
}

#[derive(Clone, Debug)]
pub struct Network {
    traces: Vec<ClassifiedTrace>,
    bounds: Bounds,
    set_labels: Vec<String>,
}

impl Network {
    pub fn new(traces: &[Trace], area: &Area, cfg: &PipelineCfg) -> Self {
        let mut dropped = 0usize;
        let mut classified = Vec::with_capacity(traces.len());
        for trace in traces {
            let mut trace = trace.clone();
            if cfg.truncate_traces {
                trace.geometry = area.clip(&trace.geometry);
                if trace.geometry.is_empty() {
                    dropped += 1;
                    continue;
                }
            }
            let azimuth = trace.geometry.azimuth();
            let set = azimuth
                .and_then(|az| classify_azimuth(az, &cfg.azimuth_sets))
                .map(str::to_string);
            classified.push(ClassifiedTrace {
                trace,
                azimuth,
                set,
            });
        }
        let network = Self {
            traces: classified,
            bounds: area.bounds(),
            set_labels: cfg.set_labels().map(str::to_string).collect(),
        };
        tracing::info!(
            traces = network.traces.len(),
            outside_area = dropped,
            unclassified = network.traces.iter().filter(|t| t.set.is_none()).count(),
            "network"
        );
        network
    }

    pub fn traces(&self) -> &[ClassifiedTrace] {
        &self.traces
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_labels(&self) -> &[String] {
        &self.set_labels
    }

    pub fn set_members<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ClassifiedTrace> {
        self.traces.iter().filter(move |t| t.in_set(label))
    }

    pub fn classified_count(&self) -> usize {
        self.traces.iter().filter(|t| t.set.is_some()).count()
    }
}

/// First configured set whose range contains `azimuth`.
pub fn classify_azimuth(azimuth: f64, sets: &[AzimuthSet]) -> Option<&str> {
    sets.iter()
        .find(|s| s.contains(azimuth))
        .map(|s| s.label.as_str())
}
