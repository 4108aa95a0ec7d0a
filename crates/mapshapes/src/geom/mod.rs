//! Geometry rules engine (stateless).
//!
//! Purpose
//! - Decide, for one candidate polygon and one existing polygon at a time,
//!   whether they contain each other, whether they intersect, and what is left
//!   of the candidate once the existing polygon is cut away.
//! - Turn raw drawn geometry into validated `geo` values (circles become
//!   many-sided polygons that keep their radius).
//!
//! Conventions
//! - Coordinates are `[lon, lat]` in decimal degrees (`geo::Coord { x: lon, y: lat }`).
//! - Areas are unsigned geodesic areas in m²; anything below
//!   `RulesCfg::min_area_m2` is a sliver.
//! - Validated exterior rings are wound counter-clockwise, whatever order they
//!   were drawn in.
//! - Checks fail open, trim fails closed (see `rules`).

pub mod circle;
mod normalize;
pub mod rules;
mod types;

pub use circle::circle_polygon;
pub use normalize::{normalize, Normalized};
pub use rules::{area_m2, contains_either_way, intersects, trim, trim_detailed, TrimOutcome};
pub use types::{
    line_from_coords, polygon_from_ring, polygon_from_rings, GeometryError, LonLat, RawGeometry,
    RulesCfg,
};
pub(crate) use types::to_lon_lat;
