//! GeoJSON `FeatureCollection` export and restore.
//!
//! Each feature carries its full coordinates and, in `properties`, `shapeType`,
//! `id`, the two colors and (circles only) `radius`. Polygon rings are written
//! closed. With `serde_json`'s `float_roundtrip` feature, coordinates survive
//! an export/parse cycle bit-exactly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{line_from_coords, polygon_from_rings, to_lon_lat, GeometryError, LonLat};
use crate::store::palette::default_styling;
use crate::store::{Shape, ShapeGeometry, ShapeId, ShapeStore, ShapeType, StoreCfg, Styling};

const COLLECTION: &str = "FeatureCollection";
const FEATURE: &str = "Feature";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub r#type: String,
    pub features: Vec<Feature>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub r#type: String,
    pub geometry: FeatureGeometry,
    pub properties: ShapeProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureGeometry {
    Polygon { coordinates: Vec<Vec<LonLat>> },
    LineString { coordinates: Vec<LonLat> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProperties {
    pub shape_type: ShapeType,
    pub id: ShapeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("expected a {expected}, found {found:?}")]
    WrongType {
        expected: &'static str,
        found: String,
    },

    #[error("duplicate shape id {0}")]
    DuplicateId(ShapeId),

    #[error("{count} {shape_type} shapes exceed the limit of {max}")]
    LimitExceeded {
        shape_type: ShapeType,
        count: usize,
        max: usize,
    },

    #[error("shape {id} is a {shape_type} but carries {geometry} geometry")]
    KindMismatch {
        id: ShapeId,
        shape_type: ShapeType,
        geometry: &'static str,
    },

    #[error("circle {0} has no radius")]
    MissingRadius(ShapeId),

    #[error("shape id {0} leaves no room for new ids")]
    IdSpaceExhausted(ShapeId),

    #[error("shape {id}: {source}")]
    Geometry {
        id: ShapeId,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FeatureCollection {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<&Shape> for Feature {
    fn from(shape: &Shape) -> Self {
        let geometry = match &shape.geometry {
            ShapeGeometry::Polygon(p) => FeatureGeometry::Polygon {
                coordinates: vec![p.exterior().coords().map(|c| to_lon_lat(*c)).collect()],
            },
            ShapeGeometry::LineString(l) => FeatureGeometry::LineString {
                coordinates: l.coords().map(|c| to_lon_lat(*c)).collect(),
            },
        };
        Feature {
            r#type: FEATURE.to_string(),
            geometry,
            properties: ShapeProperties {
                shape_type: shape.shape_type,
                id: shape.id,
                stroke_color: Some(shape.styling.stroke.clone()),
                fill_color: Some(shape.styling.fill.clone()),
                radius: shape.radius,
            },
        }
    }
}

impl ShapeStore {
    /// Snapshot of every shape as a feature collection, in insertion order.
    pub fn export_all(&self) -> FeatureCollection {
        FeatureCollection {
            r#type: COLLECTION.to_string(),
            features: self.shapes().iter().map(Feature::from).collect(),
        }
    }

    /// Rebuild a store from an exported document. Ids, types, colors and radii
    /// are taken as stored; overlap rules are not re-run.
    pub fn restore(cfg: StoreCfg, doc: &FeatureCollection) -> Result<ShapeStore, ImportError> {
        if doc.r#type != COLLECTION {
            return Err(ImportError::WrongType {
                expected: COLLECTION,
                found: doc.r#type.clone(),
            });
        }
        let mut seen = HashSet::new();
        let mut shapes = Vec::with_capacity(doc.features.len());
        for feature in &doc.features {
            if feature.r#type != FEATURE {
                return Err(ImportError::WrongType {
                    expected: FEATURE,
                    found: feature.r#type.clone(),
                });
            }
            let shape = shape_from_feature(feature)?;
            if !seen.insert(shape.id) {
                return Err(ImportError::DuplicateId(shape.id));
            }
            shapes.push(shape);
        }
        for shape_type in ShapeType::ALL {
            let count = shapes.iter().filter(|s| s.shape_type == shape_type).count();
            let max = cfg.limits.max_for(shape_type);
            if count > max {
                return Err(ImportError::LimitExceeded {
                    shape_type,
                    count,
                    max,
                });
            }
        }
        let store = ShapeStore::from_shapes(cfg, shapes)
            .ok_or(ImportError::IdSpaceExhausted(ShapeId(u64::MAX)))?;
        tracing::info!(shapes = store.len(), "collection restored");
        Ok(store)
    }
}

fn shape_from_feature(feature: &Feature) -> Result<Shape, ImportError> {
    let props = &feature.properties;
    let id = props.id;
    let geometry = match (&feature.geometry, props.shape_type) {
        (FeatureGeometry::LineString { coordinates }, ShapeType::Linestring) => {
            ShapeGeometry::LineString(
                line_from_coords(coordinates)
                    .map_err(|source| ImportError::Geometry { id, source })?,
            )
        }
        (FeatureGeometry::Polygon { coordinates }, t) if t.is_polygon_like() => {
            ShapeGeometry::Polygon(
                polygon_from_rings(coordinates)
                    .map_err(|source| ImportError::Geometry { id, source })?,
            )
        }
        (geometry, shape_type) => {
            return Err(ImportError::KindMismatch {
                id,
                shape_type,
                geometry: match geometry {
                    FeatureGeometry::Polygon { .. } => "polygon",
                    FeatureGeometry::LineString { .. } => "linestring",
                },
            })
        }
    };
    let radius = match props.shape_type {
        ShapeType::Circle => match props.radius {
            Some(r) if r.is_finite() && r > 0.0 => Some(r),
            Some(r) => {
                return Err(ImportError::Geometry {
                    id,
                    source: GeometryError::InvalidRadius(r),
                })
            }
            None => return Err(ImportError::MissingRadius(id)),
        },
        _ => None,
    };
    let styling = match (&props.stroke_color, &props.fill_color) {
        (Some(stroke), Some(fill)) => Styling::new(stroke.as_str(), fill.as_str()),
        _ => default_styling(),
    };
    Ok(Shape {
        id,
        shape_type: props.shape_type,
        geometry,
        styling,
        radius,
    })
}
