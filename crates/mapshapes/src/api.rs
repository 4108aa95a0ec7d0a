//! Curated surface for front ends driving a drawing session.
//!
//! Prefer these re-exports over reaching into module internals; the rules
//! engine is re-exported for callers that want to preview a trim.

// Rules engine
pub use crate::geom::{
    area_m2, circle_polygon, contains_either_way, intersects, normalize, trim, trim_detailed,
    GeometryError, LonLat, Normalized, RawGeometry, RulesCfg, TrimOutcome,
};
// Collection manager
pub use crate::store::{
    Accepted, DrawTool, EditError, Notice, NoticeLevel, Outcome, RejectReason, Rejection, Shape,
    ShapeEvent, ShapeGeometry, ShapeId, ShapeLimits, ShapeStore, ShapeType, StoreCfg, Styling,
};
// Export
pub use crate::export::{Feature, FeatureCollection, FeatureGeometry, ImportError, ShapeProperties};
