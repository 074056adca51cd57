//! Error type shared by loading, classification and generation.
//!
//! Two tiers
//! - Fatal input/configuration problems surface as `Error` and abort the run.
//! - Per-trace data quality issues (non-numeric dip, missing direction) are not
//!   errors; they are routed through imputation or skipped by the generator.

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Image(image::ImageError),
    Font(ab_glyph::InvalidFont),
    /// A required attribute is absent from every feature of a layer.
    MissingAttribute { attribute: String, path: PathBuf },
    InvalidGeometry { reason: String },
    EmptyArea { path: PathBuf },
    DegenerateArea { x_diff: f64 },
    InvalidConfig { reason: String },
    /// Imputation requested for a set with neither measured data nor a fallback.
    NoOrientation { set: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid JSON in {}: {source}", path.display())
            }
            Self::Image(err) => write!(f, "image error: {err}"),
            Self::Font(err) => write!(f, "legend font: {err}"),
            Self::MissingAttribute { attribute, path } => write!(
                f,
                "the '{attribute}' column is missing from {}; \
                 please ensure the input GeoJSON contains a '{attribute}' column",
                path.display()
            ),
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::EmptyArea { path } => {
                write!(f, "area file {} contains no polygon", path.display())
            }
            Self::DegenerateArea { x_diff } => {
                write!(f, "area bounding box has non-positive width {x_diff}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            Self::NoOrientation { set } => write!(
                f,
                "azimuth set '{set}' has no measured orientation and no fallback configured"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Image(err) => Some(err),
            Self::Font(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ab_glyph::InvalidFont> for Error {
    fn from(err: ab_glyph::InvalidFont) -> Self {
        Self::Font(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}
