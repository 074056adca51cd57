//! Minimal GeoJSON FeatureCollection reader.
//!
//! Only the pieces the pipeline consumes are modelled: line and polygon
//! geometries (single and multi) plus the raw property map. Positions keep
//! their first two ordinates; any elevation is dropped.

use crate::error::{Error, Result};
use geo::{Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// Line or polygon geometry, flattened to 2-D.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Lines(MultiLineString<f64>),
    Polygons(MultiPolygon<f64>),
}

#[derive(Clone, Debug)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Parsed collection; `has_attribute` answers the "does this column exist" question.
#[derive(Clone, Debug, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub skipped: usize,
}

impl FeatureCollection {
    /// True when any feature carries the property key (even with a null value).
    pub fn has_attribute(&self, key: &str) -> bool {
        self.features.iter().any(|f| f.properties.contains_key(key))
    }
}

pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
    let parsed: RawCollection = serde_json::from_slice(&raw).map_err(|e| Error::json(path, e))?;
    let collection = convert(parsed)?;
    tracing::debug!(
        path = %path.display(),
        features = collection.features.len(),
        skipped = collection.skipped,
        "read_feature_collection"
    );
    Ok(collection)
}

/// Parse an in-memory document; errors report the source as `<memory>`.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let parsed: RawCollection =
        serde_json::from_str(text).map_err(|e| Error::json("<memory>", e))?;
    convert(parsed)
}

fn convert(raw: RawCollection) -> Result<FeatureCollection> {
    let mut out = FeatureCollection::default();
    for (idx, feat) in raw.features.into_iter().enumerate() {
        let geometry = match feat.geometry {
            Some(RawGeometry::LineString { coordinates }) => {
                Geometry::Lines(MultiLineString::new(vec![to_line(&coordinates)?]))
            }
            Some(RawGeometry::MultiLineString { coordinates }) => Geometry::Lines(
                coordinates
                    .iter()
                    .map(|part| to_line(part))
                    .collect::<Result<_>>()?,
            ),
            Some(RawGeometry::Polygon { coordinates }) => {
                Geometry::Polygons(MultiPolygon::new(vec![to_polygon(&coordinates)?]))
            }
            Some(RawGeometry::MultiPolygon { coordinates }) => Geometry::Polygons(
                coordinates
                    .iter()
                    .map(|poly| to_polygon(poly))
                    .collect::<Result<_>>()?,
            ),
            Some(RawGeometry::Unsupported) | None => {
                tracing::warn!(feature = idx, "skipping feature without line/polygon geometry");
                out.skipped += 1;
                continue;
            }
        };
        out.features.push(Feature {
            geometry,
            properties: feat.properties.unwrap_or_default(),
        });
    }
    Ok(out)
}

fn to_line(coords: &[Position]) -> Result<LineString<f64>> {
    coords
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(Error::geometry(format!(
                "position needs at least two ordinates, got {}",
                p.len()
            ))),
        })
        .collect()
}

/// Exterior ring first, holes after; an empty ring list yields an empty polygon.
fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|r| to_line(r));
    let exterior = rings.next().transpose()?.unwrap_or_else(|| LineString::new(vec![]));
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}
