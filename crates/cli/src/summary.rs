//! Per-set orientation table written as CSV next to the fracture file.

use anyhow::{Context, Result};
use fracdisc::prelude::SetOrientation;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub fn set_summary_frame(orientations: &[SetOrientation]) -> Result<DataFrame> {
    let df = df!(
        "set" => orientations.iter().map(|o| o.label.clone()).collect::<Vec<_>>(),
        "traces" => orientations.iter().map(|o| o.traces as u64).collect::<Vec<_>>(),
        "measured_dip" => orientations.iter().map(|o| o.measured_dip as u64).collect::<Vec<_>>(),
        "measured_dip_dir" => orientations.iter().map(|o| o.measured_dip_dir as u64).collect::<Vec<_>>(),
        "mean_dip" => orientations.iter().map(|o| o.dip).collect::<Vec<_>>(),
        "mean_dip_dir" => orientations.iter().map(|o| o.dip_dir).collect::<Vec<_>>(),
        "dip_from_fallback" => orientations.iter().map(|o| o.dip_from_fallback).collect::<Vec<_>>(),
        "dip_dir_from_fallback" => orientations.iter().map(|o| o.dip_dir_from_fallback).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn write_set_summary(path: &Path, orientations: &[SetOrientation]) -> Result<()> {
    let mut df = set_summary_frame(orientations)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    tracing::info!(path = %path.display(), rows = df.height(), "set_summary");
    Ok(())
}
