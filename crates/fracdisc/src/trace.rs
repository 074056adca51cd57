//! Fracture traces: polyline geometry plus coerced DIP / DIP_DIR attributes.

use crate::error::{Error, Result};
use crate::geojson::{read_feature_collection, FeatureCollection, Geometry};
use geo::{Centroid, EuclideanLength, Line, LineString, MultiLineString, Point};
use serde_json::Value;
use std::path::Path;

pub const DIP_ATTR: &str = "DIP";
pub const DIP_DIR_ATTR: &str = "DIP_DIR";

/// Polyline parts of one trace. Degenerate parts (< 2 vertices) are dropped on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    lines: MultiLineString<f64>,
}

impl Polyline {
    pub fn new(lines: MultiLineString<f64>) -> Self {
        Self {
            lines: lines.into_iter().filter(|l| l.0.len() >= 2).collect(),
        }
    }

    pub fn lines(&self) -> &MultiLineString<f64> {
        &self.lines
    }

    pub fn parts(&self) -> &[LineString<f64>] {
        &self.lines.0
    }

    pub fn is_empty(&self) -> bool {
        self.lines.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.lines.iter().flat_map(|l| l.lines())
    }

    pub fn length(&self) -> f64 {
        self.lines.euclidean_length()
    }

    /// Length-weighted centroid; the vertex centroid for zero-length lines.
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.lines.centroid()
    }

    /// Compass bearing (clockwise from north) between the end points of the
    /// longest part, folded into [0, 180).
    pub fn azimuth(&self) -> Option<f64> {
        let part = self.lines.iter().max_by(|a, b| {
            a.euclidean_length()
                .partial_cmp(&b.euclidean_length())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        let d = *part.0.last()? - *part.0.first()?;
        if d.x == 0.0 && d.y == 0.0 {
            return None;
        }
        Some(d.x.atan2(d.y).to_degrees().rem_euclid(180.0))
    }
}

impl From<LineString<f64>> for Polyline {
    fn from(line: LineString<f64>) -> Self {
        Self::new(MultiLineString::new(vec![line]))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    /// Position in the source file, kept for diagnostics.
    pub index: usize,
    pub geometry: Polyline,
    pub dip: Option<f64>,
    pub dip_dir: Option<f64>,
}

/// Coerce a property value to a finite number, `None` otherwise.
///
/// Numbers and numeric strings (surrounding whitespace ignored) are accepted;
/// null, booleans, containers, unparsable strings, NaN and infinities are not.
pub fn to_numeric(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Build traces from a parsed collection; fails when DIP or DIP_DIR is absent everywhere.
pub fn traces_from_collection(fc: &FeatureCollection, path: &Path) -> Result<Vec<Trace>> {
    for attribute in [DIP_ATTR, DIP_DIR_ATTR] {
        if !fc.has_attribute(attribute) {
            return Err(Error::MissingAttribute {
                attribute: attribute.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    let mut traces = Vec::with_capacity(fc.features.len());
    for (index, feat) in fc.features.iter().enumerate() {
        let lines = match &feat.geometry {
            Geometry::Lines(lines) => lines.clone(),
            Geometry::Polygons(_) => {
                tracing::warn!(feature = index, "polygon in traces layer, skipping");
                continue;
            }
        };
        let geometry = Polyline::new(lines);
        if geometry.is_empty() {
            tracing::warn!(feature = index, "trace has no usable segment, skipping");
            continue;
        }
        traces.push(Trace {
            index,
            geometry,
            dip: to_numeric(feat.property(DIP_ATTR)),
            dip_dir: to_numeric(feat.property(DIP_DIR_ATTR)),
        });
    }
    Ok(traces)
}

pub fn load_traces(path: &Path) -> Result<Vec<Trace>> {
    let fc = read_feature_collection(path)?;
    let traces = traces_from_collection(&fc, path)?;
    let measured = traces.iter().filter(|t| t.dip.is_some()).count();
    tracing::info!(path = %path.display(), traces = traces.len(), with_dip = measured, "load_traces");
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::parse_feature_collection;
    use serde_json::json;

    fn line(points: &[(f64, f64)]) -> Polyline {
        Polyline::from(LineString::from(points.to_vec()))
    }

    #[test]
    fn coercion_matches_lenient_numeric_parsing() {
        assert_eq!(to_numeric(Some(&json!(85))), Some(85.0));
        assert_eq!(to_numeric(Some(&json!(42.5))), Some(42.5));
        assert_eq!(to_numeric(Some(&json!(" 95 "))), Some(95.0));
        assert_eq!(to_numeric(Some(&json!("n/a"))), None);
        assert_eq!(to_numeric(Some(&json!("NaN"))), None);
        assert_eq!(to_numeric(Some(&json!(""))), None);
        assert_eq!(to_numeric(Some(&json!(null))), None);
        assert_eq!(to_numeric(Some(&json!(true))), None);
        assert_eq!(to_numeric(None), None);
    }

    #[test]
    fn length_and_centroid_are_length_weighted() {
        let l = line(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0)]);
        assert!((l.length() - 6.0).abs() < 1e-12);
        let c = l.centroid().unwrap();
        // midpoints (2,0) w=4 and (4,1) w=2
        assert!((c.x() - 16.0 / 6.0).abs() < 1e-12);
        assert!((c.y() - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn azimuth_is_axial_compass_bearing() {
        assert!((line(&[(5.0, 3.0), (5.0, 7.0)]).azimuth().unwrap() - 0.0).abs() < 1e-12);
        assert!((line(&[(5.0, 7.0), (5.0, 3.0)]).azimuth().unwrap() - 0.0).abs() < 1e-12);
        assert!((line(&[(0.0, 0.0), (1.0, 1.0)]).azimuth().unwrap() - 45.0).abs() < 1e-9);
        assert!((line(&[(0.0, 0.0), (-1.0, 1.0)]).azimuth().unwrap() - 135.0).abs() < 1e-9);
        assert!((line(&[(0.0, 0.0), (1.0, 0.0)]).azimuth().unwrap() - 90.0).abs() < 1e-9);
        assert!(line(&[(1.0, 1.0), (1.0, 1.0)]).azimuth().is_none());
    }

    #[test]
    fn degenerate_parts_are_dropped() {
        let p = Polyline::new(MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0)]),
            LineString::new(vec![]),
        ]));
        assert!(p.is_empty());
        assert!(p.centroid().is_none());
    }

    #[test]
    fn missing_dip_column_is_fatal() {
        let fc = parse_feature_collection(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"DIP_DIR": 10},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}]}"#,
        )
        .unwrap();
        let err = traces_from_collection(&fc, Path::new("t.geojson")).unwrap_err();
        match err {
            Error::MissingAttribute { attribute, .. } => assert_eq!(attribute, "DIP"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn builds_traces_with_coerced_attributes() {
        let fc = parse_feature_collection(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"DIP": "80", "DIP_DIR": null},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
                {"type": "Feature", "properties": {"DIP": "x", "DIP_DIR": 270},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 1]]}}]}"#,
        )
        .unwrap();
        let traces = traces_from_collection(&fc, Path::new("t.geojson")).unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].dip, Some(80.0));
        assert_eq!(traces[0].dip_dir, None);
        assert_eq!(traces[1].dip, None);
        assert_eq!(traces[1].dip_dir, Some(270.0));
    }
}
