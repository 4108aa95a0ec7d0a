//! Circle → polygon approximation.
//!
//! Vertices are haversine destinations from the center (mean Earth radius),
//! walked counter-clockwise from north; the ring is closed by repeating the
//! first vertex.

use geo::orient::{Direction, Orient};
use geo::{Coord, HaversineDestination, LineString, Point, Polygon};

use super::types::{to_coord, GeometryError, LonLat};

/// Approximate a circle of `radius_m` meters around `center` with `steps` sides.
pub fn circle_polygon(
    center: LonLat,
    radius_m: f64,
    steps: usize,
) -> Result<Polygon<f64>, GeometryError> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius_m));
    }
    if steps < 3 {
        return Err(GeometryError::TooFewSteps(steps));
    }
    let origin = Point::from(to_coord(center)?);
    let mut ring: Vec<Coord<f64>> = (0..steps)
        .map(|i| {
            let bearing = -360.0 * (i as f64) / (steps as f64);
            origin.haversine_destination(bearing, radius_m).0
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::Computation(
            "circle vertex is not finite".to_string(),
        ));
    }
    Ok(Polygon::new(LineString::from(ring), vec![]).orient(Direction::Default))
}
