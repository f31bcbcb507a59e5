//! Geometry normalization for query parameters
//!
//! Callers pass spatial inputs as JSON text in the query string:
//! - a GeoJSON polygon (bare geometry or a Feature wrapping one)
//! - a bounding box as a 4-element numeric array
//!
//! Both are turned into typed values carrying an explicit [`Crs`]. Query
//! inputs are always interpreted as WGS84. Geometric validity beyond ring
//! closure (self-intersection, winding) is left to the provider.

use geojson::{GeoJson, Geometry, Value};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("geometry is not valid GeoJSON: {0}")]
    Parse(String),
    #[error("expected a Polygon geometry, got {0}")]
    NotAPolygon(String),
    #[error("polygon has no rings")]
    EmptyPolygon,
    #[error("polygon ring {0} is not closed (first and last positions differ)")]
    UnclosedRing(usize),
    #[error("polygon ring {0} needs at least 4 positions")]
    RingTooShort(usize),
    #[error("bbox must be a JSON array of 4 numbers: {0}")]
    InvalidBbox(String),
}

/// Coordinate reference system attached to spatial inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Crs {
    #[default]
    Wgs84,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
        }
    }

    /// CRS identifier in the form the provider APIs expect
    pub fn url(&self) -> &'static str {
        match self {
            Crs::Wgs84 => "http://www.opengis.net/def/crs/OGC/1.3/CRS84",
        }
    }
}

/// Validated polygon with its CRS
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGeometry {
    pub geometry: Geometry,
    pub crs: Crs,
}

/// Four ordered bounds `[min_x, min_y, max_x, max_y]`, consumed as given
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub bounds: [f64; 4],
    pub crs: Crs,
}

/// Parse a GeoJSON polygon from JSON text
pub fn parse_polygon(text: &str) -> Result<PolygonGeometry, GeometryError> {
    let geojson: GeoJson = text
        .trim()
        .parse()
        .map_err(|e: geojson::Error| GeometryError::Parse(e.to_string()))?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| GeometryError::NotAPolygon("Feature without geometry".into()))?,
        GeoJson::FeatureCollection(_) => {
            return Err(GeometryError::NotAPolygon("FeatureCollection".into()));
        }
    };

    let rings = match &geometry.value {
        Value::Polygon(rings) => rings,
        other => return Err(GeometryError::NotAPolygon(value_type(other).to_string())),
    };

    if rings.is_empty() {
        return Err(GeometryError::EmptyPolygon);
    }

    for (idx, ring) in rings.iter().enumerate() {
        if ring.len() < 4 {
            return Err(GeometryError::RingTooShort(idx));
        }
        if ring.first() != ring.last() {
            return Err(GeometryError::UnclosedRing(idx));
        }
    }

    Ok(PolygonGeometry {
        geometry,
        crs: Crs::Wgs84,
    })
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Parse a bounding box from a JSON array such as `[12.0, 2.0, 12.5, 2.5]`
pub fn parse_bbox(text: &str) -> Result<BoundingBox, GeometryError> {
    let values: Vec<f64> = serde_json::from_str(text.trim())
        .map_err(|e| GeometryError::InvalidBbox(e.to_string()))?;

    let bounds: [f64; 4] = values
        .try_into()
        .map_err(|v: Vec<f64>| GeometryError::InvalidBbox(format!("got {} values", v.len())))?;

    Ok(BoundingBox {
        bounds,
        crs: Crs::Wgs84,
    })
}
