//! Feature-collection export of the shape collection, and restore from it.

mod geojson;

pub use geojson::{Feature, FeatureCollection, FeatureGeometry, ImportError, ShapeProperties};
