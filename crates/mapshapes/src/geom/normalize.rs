//! Raw drawn geometry → canonical stored geometry.

use geo::{LineString, Polygon};

use super::circle::circle_polygon;
use super::types::{line_from_coords, polygon_from_rings, GeometryError, RawGeometry, RulesCfg};

/// Canonical geometry: polygon-like shapes are always polygons, circles keep
/// their radius alongside the approximation.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    Area {
        polygon: Polygon<f64>,
        radius: Option<f64>,
    },
    Line(LineString<f64>),
}

pub fn normalize(raw: &RawGeometry, cfg: RulesCfg) -> Result<Normalized, GeometryError> {
    match raw {
        RawGeometry::Polygon { coordinates } => Ok(Normalized::Area {
            polygon: polygon_from_rings(coordinates)?,
            radius: None,
        }),
        RawGeometry::LineString { coordinates } => {
            Ok(Normalized::Line(line_from_coords(coordinates)?))
        }
        RawGeometry::Circle {
            coordinates,
            radius,
        } => Ok(Normalized::Area {
            polygon: circle_polygon(*coordinates, *radius, cfg.circle_steps)?,
            radius: Some(*radius),
        }),
    }
}
