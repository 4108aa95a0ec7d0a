//! The authoritative shape collection and its acceptance algorithm.
//!
//! Acceptance (one submission, all-or-nothing)
//! 1. Per-type cap: `count(type) >= max(type)` rejects with `LimitReached`.
//! 2. Linestrings are committed as drawn; they never take part in overlap rules.
//! 3. Polygon-like input is normalized (circles → 64-gon + radius).
//! 4. Every stored polygon-like shape, in ascending id order, is checked against
//!    the progressively trimmed candidate: containment either way rejects with
//!    `FullOverlap`; an intersection trims the candidate, and a candidate with
//!    nothing usable left rejects with `FullOverlap`.
//! 5. The survivor gets a fresh id and a palette color and is appended.
//!
//! Nothing is written to the collection before step 5, so a rejection leaves it
//! exactly as it was.

use crate::geom::{
    area_m2, contains_either_way, intersects, normalize, trim_detailed, GeometryError, Normalized,
    RawGeometry, RulesCfg, TrimOutcome,
};
use geo::Polygon;

use super::palette::{default_styling, ColorPicker};
use super::types::{
    DrawTool, EditError, Rejection, Shape, ShapeGeometry, ShapeId, ShapeType, StoreCfg, Styling,
};

/// Result of a successful acceptance.
#[derive(Clone, Debug, PartialEq)]
pub struct Accepted {
    pub id: ShapeId,
    pub shape_type: ShapeType,
    /// Existing shapes that cut area out of the candidate, in the order applied.
    pub trimmed_by: Vec<ShapeId>,
    /// Total area the candidate lost to trimming (m²).
    pub removed_m2: f64,
}

impl Accepted {
    #[inline]
    pub fn was_trimmed(&self) -> bool {
        !self.trimmed_by.is_empty()
    }
}

/// Owns the shape list. Consumers get read-only views; changes go through
/// `submit`/`accept`, `edit` and `delete`.
#[derive(Clone, Debug)]
pub struct ShapeStore {
    cfg: StoreCfg,
    shapes: Vec<Shape>,
    next_id: u64,
    colors: ColorPicker,
}

impl ShapeStore {
    pub fn new(cfg: StoreCfg) -> Self {
        Self {
            cfg,
            shapes: Vec::new(),
            next_id: 1,
            colors: ColorPicker::new(cfg.seed),
        }
    }

    /// Rebuild a store around already-accepted shapes (used by restore).
    /// Ids continue after the largest one present; `None` when that id is
    /// already `u64::MAX`.
    pub(crate) fn from_shapes(cfg: StoreCfg, shapes: Vec<Shape>) -> Option<Self> {
        let next_id = match shapes.iter().map(|s| s.id.0).max() {
            Some(max) => max.checked_add(1)?,
            None => 1,
        };
        Some(Self {
            cfg,
            shapes,
            next_id,
            colors: ColorPicker::new(cfg.seed),
        })
    }

    #[inline]
    pub fn cfg(&self) -> &StoreCfg {
        &self.cfg
    }

    /// Current shapes in insertion order.
    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn count(&self, shape_type: ShapeType) -> usize {
        self.shapes
            .iter()
            .filter(|s| s.shape_type == shape_type)
            .count()
    }

    /// Shape type from the drawing tool; line geometry is always a linestring.
    pub fn classify(raw: &RawGeometry, tool: DrawTool) -> ShapeType {
        if raw.is_line() {
            return ShapeType::Linestring;
        }
        match tool {
            DrawTool::Polygon => ShapeType::Polygon,
            DrawTool::Rectangle => ShapeType::Rectangle,
            DrawTool::Circle => ShapeType::Circle,
            DrawTool::Polyline => ShapeType::Linestring,
        }
    }

    /// Classify then accept.
    pub fn submit(&mut self, tool: DrawTool, raw: &RawGeometry) -> Result<Accepted, Rejection> {
        let shape_type = Self::classify(raw, tool);
        self.accept(raw, shape_type)
    }

    pub fn accept(
        &mut self,
        raw: &RawGeometry,
        shape_type: ShapeType,
    ) -> Result<Accepted, Rejection> {
        let max = self.cfg.limits.max_for(shape_type);
        if self.count(shape_type) >= max {
            tracing::debug!(%shape_type, max, "shape limit reached");
            return Err(Rejection::LimitReached { shape_type, max });
        }
        // `u64::MAX` is never handed out, so the counter cannot overflow.
        if self.next_id == u64::MAX {
            tracing::warn!("shape ids exhausted");
            return Err(Rejection::IdsExhausted);
        }
        check_kind(raw, shape_type)?;

        match normalize(raw, self.cfg.rules)? {
            Normalized::Line(line) => Ok(self.commit(
                shape_type,
                ShapeGeometry::LineString(line),
                default_styling(),
                None,
                Vec::new(),
                0.0,
            )),
            Normalized::Area { polygon, radius } => {
                let (polygon, trimmed_by, removed_m2) = self.resolve_overlaps(polygon)?;
                let styling = self.colors.pick();
                Ok(self.commit(
                    shape_type,
                    ShapeGeometry::Polygon(polygon),
                    styling,
                    radius,
                    trimmed_by,
                    removed_m2,
                ))
            }
        }
    }

    /// Narrow `candidate` against every stored polygon-like shape, ascending id.
    fn resolve_overlaps(
        &self,
        candidate: Polygon<f64>,
    ) -> Result<(Polygon<f64>, Vec<ShapeId>, f64), Rejection> {
        let rules = self.cfg.rules;
        check_area(&candidate, rules)?;

        let mut existing: Vec<&Shape> = self
            .shapes
            .iter()
            .filter(|s| s.shape_type.is_polygon_like())
            .collect();
        existing.sort_by_key(|s| s.id);

        let mut candidate = candidate;
        let mut trimmed_by = Vec::new();
        let mut removed_m2 = 0.0;
        for shape in existing {
            let Some(other) = shape.geometry.as_polygon() else {
                continue;
            };
            if contains_either_way(&candidate, other) {
                tracing::debug!(
                    against = %shape.id,
                    "candidate and existing shape contain one another"
                );
                return Err(Rejection::FullOverlap { against: shape.id });
            }
            if !intersects(&candidate, other) {
                continue;
            }
            match trim_detailed(&candidate, other, rules) {
                TrimOutcome::Untouched => {
                    tracing::debug!(against = %shape.id, "overlap below minimum area; ignored");
                }
                TrimOutcome::Trimmed {
                    remainder,
                    removed_m2: removed,
                } => {
                    tracing::debug!(
                        against = %shape.id,
                        removed_m2 = removed,
                        "candidate trimmed"
                    );
                    candidate = remainder;
                    trimmed_by.push(shape.id);
                    removed_m2 += removed;
                }
                TrimOutcome::Consumed => {
                    tracing::debug!(against = %shape.id, "nothing usable left after trim");
                    return Err(Rejection::FullOverlap { against: shape.id });
                }
            }
        }
        Ok((candidate, trimmed_by, removed_m2))
    }

    fn commit(
        &mut self,
        shape_type: ShapeType,
        geometry: ShapeGeometry,
        styling: Styling,
        radius: Option<f64>,
        trimmed_by: Vec<ShapeId>,
        removed_m2: f64,
    ) -> Accepted {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        let radius = radius.filter(|_| shape_type == ShapeType::Circle);
        self.shapes.push(Shape {
            id,
            shape_type,
            geometry,
            styling,
            radius,
        });
        tracing::info!(%id, %shape_type, trimmed = trimmed_by.len(), "shape accepted");
        Accepted {
            id,
            shape_type,
            trimmed_by,
            removed_m2,
        }
    }

    /// Replace the geometry of shape `id`. Overlap and limit rules are not
    /// re-run; id, type and colors are kept. The new geometry must be of the
    /// shape's own kind, and an edited circle takes the new radius.
    pub fn edit(&mut self, id: ShapeId, raw: &RawGeometry) -> Result<&Shape, EditError> {
        let rules = self.cfg.rules;
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(%id, "edit of unknown shape");
            return Err(EditError::NotFound(id));
        };
        if check_kind(raw, shape.shape_type).is_err() {
            tracing::debug!(%id, shape_type = %shape.shape_type, "edit with wrong geometry kind");
            return Err(EditError::KindMismatch {
                id,
                shape_type: shape.shape_type,
                geometry: raw.kind_name(),
            });
        }
        match normalize(raw, rules)? {
            Normalized::Line(line) => {
                shape.geometry = ShapeGeometry::LineString(line);
            }
            Normalized::Area { polygon, radius } => {
                check_area(&polygon, rules)?;
                shape.geometry = ShapeGeometry::Polygon(polygon);
                shape.radius = radius;
            }
        }
        tracing::info!(%id, shape_type = %shape.shape_type, "shape edited");
        Ok(shape)
    }

    /// Remove shape `id`; `false` if there was none.
    pub fn delete(&mut self, id: ShapeId) -> bool {
        match self.shapes.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.shapes.remove(idx);
                tracing::info!(%id, "shape deleted");
                true
            }
            None => {
                tracing::debug!(%id, "delete of unknown shape");
                false
            }
        }
    }
}

fn check_area(polygon: &Polygon<f64>, rules: RulesCfg) -> Result<(), GeometryError> {
    let area = area_m2(polygon);
    if area.is_nan() || area < rules.min_area_m2 {
        return Err(GeometryError::Degenerate {
            area_m2: area,
            min_m2: rules.min_area_m2,
        });
    }
    Ok(())
}

/// Each shape type accepts exactly one raw geometry kind.
fn check_kind(raw: &RawGeometry, shape_type: ShapeType) -> Result<(), Rejection> {
    let ok = matches!(
        (shape_type, raw),
        (ShapeType::Linestring, RawGeometry::LineString { .. })
            | (ShapeType::Circle, RawGeometry::Circle { .. })
            | (
                ShapeType::Polygon | ShapeType::Rectangle,
                RawGeometry::Polygon { .. }
            )
    );
    if ok {
        Ok(())
    } else {
        Err(Rejection::KindMismatch {
            shape_type,
            geometry: raw.kind_name(),
        })
    }
}
