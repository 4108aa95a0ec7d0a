//! Data types for the shape collection: identities, shape kinds, styling,
//! per-type limits, and the ways a submission or edit can fail.

use std::fmt;

use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{GeometryError, RulesCfg};

/// Store-assigned shape identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a stored shape, fixed at acceptance from the drawing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Polygon,
    Rectangle,
    Circle,
    Linestring,
}

impl ShapeType {
    pub const ALL: [ShapeType; 4] = [
        ShapeType::Polygon,
        ShapeType::Rectangle,
        ShapeType::Circle,
        ShapeType::Linestring,
    ];

    /// Polygon-like shapes take part in overlap resolution; linestrings do not.
    #[inline]
    pub fn is_polygon_like(self) -> bool {
        !matches!(self, ShapeType::Linestring)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Polygon => "polygon",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Linestring => "linestring",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing tool that produced a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTool {
    Polygon,
    Rectangle,
    Circle,
    Polyline,
}

/// Stroke and fill colors as CSS hex strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Styling {
    pub stroke: String,
    pub fill: String,
}

impl Styling {
    pub fn new(stroke: impl Into<String>, fill: impl Into<String>) -> Self {
        Self {
            stroke: stroke.into(),
            fill: fill.into(),
        }
    }
}

/// Stored geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeGeometry {
    Polygon(Polygon<f64>),
    LineString(LineString<f64>),
}

impl ShapeGeometry {
    #[inline]
    pub fn as_polygon(&self) -> Option<&Polygon<f64>> {
        match self {
            ShapeGeometry::Polygon(p) => Some(p),
            ShapeGeometry::LineString(_) => None,
        }
    }
}

/// One accepted shape.
///
/// `radius` is carried for circles only; the stored geometry is the polygon
/// approximation (possibly trimmed), so the radius cannot be re-derived.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub shape_type: ShapeType,
    pub geometry: ShapeGeometry,
    pub styling: Styling,
    pub radius: Option<f64>,
}

/// Maximum number of stored shapes per type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeLimits {
    pub polygon: usize,
    pub rectangle: usize,
    pub circle: usize,
    pub linestring: usize,
}

impl Default for ShapeLimits {
    fn default() -> Self {
        Self {
            polygon: 10,
            rectangle: 5,
            circle: 5,
            linestring: 7,
        }
    }
}

impl ShapeLimits {
    #[inline]
    pub fn max_for(&self, shape_type: ShapeType) -> usize {
        match shape_type {
            ShapeType::Polygon => self.polygon,
            ShapeType::Rectangle => self.rectangle,
            ShapeType::Circle => self.circle,
            ShapeType::Linestring => self.linestring,
        }
    }
}

/// Store configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCfg {
    pub limits: ShapeLimits,
    pub rules: RulesCfg,
    /// Seed for palette picks; `None` seeds from entropy.
    pub seed: Option<u64>,
}

/// Machine-readable rejection reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    LimitReached,
    FullOverlap,
    InvalidGeometry,
}

/// Why a new shape was not accepted. The collection is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("maximum of {max} {shape_type} shapes reached")]
    LimitReached { shape_type: ShapeType, max: usize },

    #[error("shape overlaps existing shape {against}")]
    FullOverlap { against: ShapeId },

    #[error("no shape ids left to assign")]
    IdsExhausted,

    #[error("a {shape_type} cannot be drawn as a {geometry}")]
    KindMismatch {
        shape_type: ShapeType,
        geometry: &'static str,
    },

    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),
}

impl Rejection {
    pub fn reason(&self) -> RejectReason {
        match self {
            Rejection::LimitReached { .. } | Rejection::IdsExhausted => RejectReason::LimitReached,
            Rejection::FullOverlap { .. } => RejectReason::FullOverlap,
            Rejection::KindMismatch { .. } | Rejection::InvalidGeometry(_) => {
                RejectReason::InvalidGeometry
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no shape with id {0}")]
    NotFound(ShapeId),

    #[error("shape {id} is a {shape_type} and cannot take a {geometry} geometry")]
    KindMismatch {
        id: ShapeId,
        shape_type: ShapeType,
        geometry: &'static str,
    },

    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),
}
