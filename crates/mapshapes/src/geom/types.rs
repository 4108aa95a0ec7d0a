//! Raw drawn geometry, validation into `geo` types, and rule tolerances.
//!
//! - `RawGeometry`: what a drawing surface hands over (GeoJSON-shaped, `[lon, lat]`).
//! - `RulesCfg`: minimum area and circle resolution used by the rules engine.
//! - `GeometryError`: why a raw geometry could not be turned into a `geo` value.

use geo::orient::{Direction, Orient};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `[longitude, latitude]` pair in decimal degrees.
pub type LonLat = [f64; 2];

/// Geometry as produced by a drawing tool, before normalization.
///
/// Serialized in GeoJSON form; a circle travels as a `Point` with a `radius`
/// in meters, which is how map libraries hand circles over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<LonLat>>,
    },
    LineString {
        coordinates: Vec<LonLat>,
    },
    #[serde(rename = "Point")]
    Circle {
        coordinates: LonLat,
        radius: f64,
    },
}

impl RawGeometry {
    /// Single-ring polygon. The ring may be open; it is closed on validation.
    pub fn polygon(ring: Vec<LonLat>) -> Self {
        RawGeometry::Polygon {
            coordinates: vec![ring],
        }
    }

    /// Axis-aligned rectangle from its south-west and north-east corners.
    pub fn rectangle(south_west: LonLat, north_east: LonLat) -> Self {
        let [w, s] = south_west;
        let [e, n] = north_east;
        Self::polygon(vec![[w, s], [w, n], [e, n], [e, s], [w, s]])
    }

    pub fn line(coordinates: Vec<LonLat>) -> Self {
        RawGeometry::LineString { coordinates }
    }

    pub fn circle(center: LonLat, radius: f64) -> Self {
        RawGeometry::Circle {
            coordinates: center,
            radius,
        }
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, RawGeometry::LineString { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            RawGeometry::Polygon { .. } => "polygon",
            RawGeometry::LineString { .. } => "linestring",
            RawGeometry::Circle { .. } => "circle",
        }
    }
}

/// Rules-engine tolerances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesCfg {
    /// Areas (m²) below this are slivers: ignored as overlaps, rejected as results.
    pub min_area_m2: f64,
    /// Number of sides used to approximate a circle.
    pub circle_steps: usize,
}

impl Default for RulesCfg {
    fn default() -> Self {
        Self {
            min_area_m2: 1.0,
            circle_steps: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("coordinate ({lon}, {lat}) is not finite")]
    NonFinite { lon: f64, lat: f64 },

    #[error("coordinate ({lon}, {lat}) is outside the valid longitude/latitude range")]
    OutOfRange { lon: f64, lat: f64 },

    #[error("{kind} needs at least {min} coordinates, got {got}")]
    TooFewCoordinates {
        kind: &'static str,
        min: usize,
        got: usize,
    },

    #[error("polygons with holes are not supported ({rings} rings given)")]
    HolesUnsupported { rings: usize },

    #[error("circle radius {0} must be a positive finite number of meters")]
    InvalidRadius(f64),

    #[error("area {area_m2} m² is below the minimum of {min_m2} m²")]
    Degenerate { area_m2: f64, min_m2: f64 },

    #[error("circle approximation needs at least 3 steps, got {0}")]
    TooFewSteps(usize),

    #[error("geometry computation failed: {0}")]
    Computation(String),
}

pub(crate) fn to_coord([lon, lat]: LonLat) -> Result<Coord<f64>, GeometryError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeometryError::NonFinite { lon, lat });
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(GeometryError::OutOfRange { lon, lat });
    }
    Ok(Coord { x: lon, y: lat })
}

/// Validate a single ring and build a polygon (ring closed if needed, wound
/// counter-clockwise whatever order it was drawn in).
pub fn polygon_from_ring(ring: &[LonLat]) -> Result<Polygon<f64>, GeometryError> {
    let mut coords = ring
        .iter()
        .map(|&c| to_coord(c))
        .collect::<Result<Vec<_>, _>>()?;
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }
    if coords.len() < 4 {
        return Err(GeometryError::TooFewCoordinates {
            kind: "polygon ring",
            min: 4,
            got: coords.len(),
        });
    }
    Ok(Polygon::new(LineString::from(coords), vec![]).orient(Direction::Default))
}

/// Validate polygon rings (exactly one) and build a polygon.
pub fn polygon_from_rings(rings: &[Vec<LonLat>]) -> Result<Polygon<f64>, GeometryError> {
    match rings {
        [ring] => polygon_from_ring(ring),
        [] => Err(GeometryError::TooFewCoordinates {
            kind: "polygon ring",
            min: 4,
            got: 0,
        }),
        _ => Err(GeometryError::HolesUnsupported { rings: rings.len() }),
    }
}

pub fn line_from_coords(coords: &[LonLat]) -> Result<LineString<f64>, GeometryError> {
    let coords = coords
        .iter()
        .map(|&c| to_coord(c))
        .collect::<Result<Vec<_>, _>>()?;
    if coords.len() < 2 {
        return Err(GeometryError::TooFewCoordinates {
            kind: "linestring",
            min: 2,
            got: coords.len(),
        });
    }
    Ok(LineString::from(coords))
}

#[inline]
pub(crate) fn to_lon_lat(c: Coord<f64>) -> LonLat {
    [c.x, c.y]
}
