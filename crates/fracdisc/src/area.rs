//! Area polygons: total bounds and trace truncation.

use crate::error::{Error, Result};
use crate::geojson::{read_feature_collection, FeatureCollection, Geometry};
use crate::trace::Polyline;
use geo::{BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use nalgebra::Vector2;
use std::path::Path;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: Vector2::repeat(f64::INFINITY),
            max: Vector2::repeat(f64::NEG_INFINITY),
        }
    }

    pub fn include(&mut self, p: Vector2<f64>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Horizontal extent; reused as the vertical sampling range of the domain.
    #[inline]
    pub fn x_diff(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn y_diff(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Simulation domain: one or more polygons, holes allowed.
#[derive(Clone, Debug)]
pub struct Area {
    polygons: MultiPolygon<f64>,
    bounds: Bounds,
}

impl Area {
    /// Returns `None` when no polygon has an exterior ring of at least three vertices.
    pub fn from_polygons(polygons: Vec<Polygon<f64>>) -> Option<Self> {
        // rings are closed on construction, so a triangle has four coordinates
        let polygons: MultiPolygon<f64> = polygons
            .into_iter()
            .filter(|p| p.exterior().0.len() >= 4)
            .collect();
        let rect = polygons.bounding_rect()?;
        let bounds = Bounds {
            min: Vector2::new(rect.min().x, rect.min().y),
            max: Vector2::new(rect.max().x, rect.max().y),
        };
        Some(Self { polygons, bounds })
    }

    /// Single polygon from its exterior ring.
    pub fn from_exterior(ring: Vec<(f64, f64)>) -> Option<Self> {
        Self::from_polygons(vec![Polygon::new(LineString::from(ring), vec![])])
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    /// Exterior and interior rings of every polygon.
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> + '_ {
        self.polygons
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Clip a polyline to the area.
    pub fn clip(&self, line: &Polyline) -> Polyline {
        let clipped = self.polygons.clip(line.lines(), false);
        Polyline::new(stitch(clipped.0).into_iter().collect())
    }
}

/// Rejoin clipped pieces that share an end point. Pieces may come back split
/// at every vertex and in either direction.
fn stitch(pieces: Vec<LineString<f64>>) -> Vec<LineString<f64>> {
    let mut chains: Vec<Vec<Coord<f64>>> = Vec::new();
    for piece in pieces {
        let mut coords = piece.0;
        if coords.len() < 2 {
            continue;
        }
        loop {
            let (first, last) = (coords[0], coords[coords.len() - 1]);
            let Some(pos) = chains.iter().position(|c| {
                let (cf, cl) = (c[0], c[c.len() - 1]);
                cl == first || cl == last || cf == last || cf == first
            }) else {
                break;
            };
            let mut other = chains.swap_remove(pos);
            let (of, ol) = (other[0], other[other.len() - 1]);
            coords = if ol == first {
                other.extend_from_slice(&coords[1..]);
                other
            } else if ol == last {
                coords.reverse();
                other.extend_from_slice(&coords[1..]);
                other
            } else if of == last {
                coords.extend_from_slice(&other[1..]);
                coords
            } else {
                other.reverse();
                other.extend_from_slice(&coords[1..]);
                other
            };
        }
        chains.push(coords);
    }
    chains.into_iter().map(LineString::new).collect()
}

pub fn area_from_collection(fc: &FeatureCollection, path: &Path) -> Result<Area> {
    let mut polygons = Vec::new();
    for feat in &fc.features {
        if let Geometry::Polygons(polys) = &feat.geometry {
            polygons.extend(polys.iter().cloned());
        }
    }
    Area::from_polygons(polygons).ok_or_else(|| Error::EmptyArea {
        path: path.to_path_buf(),
    })
}

pub fn load_area(path: &Path) -> Result<Area> {
    let fc = read_feature_collection(path)?;
    let area = area_from_collection(&fc, path)?;
    let b = area.bounds();
    tracing::info!(
        path = %path.display(),
        polygons = area.polygons().0.len(),
        min_x = b.min.x,
        min_y = b.min.y,
        max_x = b.max.x,
        max_y = b.max.y,
        "load_area"
    );
    Ok(area)
}
