//! Shape bookkeeping and overlap resolution for map drawing sessions.
//!
//! A drawing surface reports shapes the user drew, edited or deleted; this
//! crate decides what the canonical collection looks like afterwards and hands
//! it back for rendering or export.
//!
//! - `geom`: stateless polygon rules (containment, intersection, trim).
//! - `store`: the shape collection, per-type caps, identities, colors, events.
//! - `export`: feature-collection document out, and back in.

pub mod api;
pub mod export;
pub mod geom;
pub mod store;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::export::FeatureCollection;
    pub use crate::geom::{RawGeometry, RulesCfg};
    pub use crate::store::{
        DrawTool, Outcome, Rejection, ShapeEvent, ShapeId, ShapeLimits, ShapeStore, ShapeType,
        StoreCfg,
    };
}
