//! Shape collection manager.
//!
//! Purpose
//! - Own the in-memory list of accepted shapes for one session and decide, for
//!   each newly drawn shape, whether it is accepted as drawn, accepted trimmed,
//!   or rejected.
//! - Enforce per-type caps, assign identities and colors, and apply edits and
//!   deletes by identity.
//!
//! Policies
//! - Ids come from a monotonic counter owned by the store.
//! - Existing shapes are visited in ascending id order during trimming, so the
//!   result for a candidate overlapping several shapes is reproducible.
//! - Rectangles are polygons for overlap purposes but have their own cap.
//! - Single-threaded: every call runs to completion and takes `&mut self`.

mod collection;
mod events;
pub mod palette;
mod types;

pub use collection::{Accepted, ShapeStore};
pub use events::{Notice, NoticeLevel, Outcome, ShapeEvent};
pub use types::{
    DrawTool, EditError, RejectReason, Rejection, Shape, ShapeGeometry, ShapeId, ShapeLimits,
    ShapeType, StoreCfg, Styling,
};

#[cfg(test)]
mod tests;
