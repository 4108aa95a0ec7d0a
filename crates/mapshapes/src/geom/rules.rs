//! Pairwise polygon rules: containment, intersection, trim-by-difference.
//!
//! Failure policy
//! - Every public function here is total. Failures inside the geometry library
//!   (panics on degenerate or self-intersecting input, non-finite results) are
//!   caught and folded into a fixed default.
//! - Checks fail open: `contains_either_way` and `intersects` return `false`.
//! - Trim fails closed: `trim` returns `None`, so a corrupt remainder is never stored.

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::orient::{Direction, Orient};
use geo::{BooleanOps, Contains, GeodesicArea, Intersects, MultiPolygon, Polygon};

use super::types::{GeometryError, RulesCfg};

/// Three-way result of trimming a candidate against one existing polygon.
#[derive(Clone, Debug, PartialEq)]
pub enum TrimOutcome {
    /// No overlap, or only a sliver below the minimum area.
    Untouched,
    /// The candidate minus the existing polygon.
    /// `removed_m2` is everything the candidate lost, dropped split pieces included.
    Trimmed {
        remainder: Polygon<f64>,
        removed_m2: f64,
    },
    /// Nothing usable remains (or the computation failed).
    Consumed,
}

/// Run a geometry-library computation, turning a panic into an error.
pub(crate) fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T, GeometryError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        GeometryError::Computation(format!("{op}: {detail}"))
    })
}

/// Unsigned geodesic area on the WGS84 ellipsoid, in m².
///
/// The exterior is re-wound counter-clockwise first: measured clockwise, a
/// ring encloses the rest of the globe.
pub fn area_m2(poly: &Polygon<f64>) -> f64 {
    poly.orient(Direction::Default).geodesic_area_unsigned()
}

fn multi_area_m2(mp: &MultiPolygon<f64>) -> f64 {
    mp.0.iter().map(area_m2).sum()
}

/// True if `a` fully contains `b` or `b` fully contains `a`. Fails open.
pub fn contains_either_way(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    match guarded("contains", || a.contains(b) || b.contains(a)) {
        Ok(hit) => hit,
        Err(err) => {
            tracing::warn!(%err, "containment check failed; treating as no containment");
            false
        }
    }
}

/// True if the two polygons share any interior or boundary point. Fails open.
pub fn intersects(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    match guarded("intersects", || a.intersects(b)) {
        Ok(hit) => hit,
        Err(err) => {
            tracing::warn!(%err, "intersection check failed; treating as disjoint");
            false
        }
    }
}

/// Portion of `candidate` not covered by `existing`, or `None` when nothing
/// usable remains. Returns `candidate` unchanged for disjoint or sliver overlaps.
pub fn trim(
    candidate: &Polygon<f64>,
    existing: &Polygon<f64>,
    cfg: RulesCfg,
) -> Option<Polygon<f64>> {
    match trim_detailed(candidate, existing, cfg) {
        TrimOutcome::Untouched => Some(candidate.clone()),
        TrimOutcome::Trimmed { remainder, .. } => Some(remainder),
        TrimOutcome::Consumed => None,
    }
}

/// Same as [`trim`], reporting whether area was actually removed.
pub fn trim_detailed(
    candidate: &Polygon<f64>,
    existing: &Polygon<f64>,
    cfg: RulesCfg,
) -> TrimOutcome {
    match try_trim(candidate, existing, cfg) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(%err, "trim failed; rejecting candidate");
            TrimOutcome::Consumed
        }
    }
}

fn try_trim(
    candidate: &Polygon<f64>,
    existing: &Polygon<f64>,
    cfg: RulesCfg,
) -> Result<TrimOutcome, GeometryError> {
    if !guarded("intersects", || candidate.intersects(existing))? {
        return Ok(TrimOutcome::Untouched);
    }
    let overlap = guarded("intersection", || candidate.intersection(existing))?;
    let overlap_m2 = multi_area_m2(&overlap);
    if !overlap_m2.is_finite() {
        return Err(GeometryError::Computation("overlap area is not finite".into()));
    }
    if overlap_m2 < cfg.min_area_m2 {
        return Ok(TrimOutcome::Untouched);
    }

    let difference = guarded("difference", || candidate.difference(existing))?;
    let mut pieces: Vec<(f64, Polygon<f64>)> = difference
        .into_iter()
        .map(|p| (area_m2(&p), p))
        .collect();
    if pieces.iter().any(|(a, _)| !a.is_finite()) {
        return Err(GeometryError::Computation("remainder area is not finite".into()));
    }
    pieces.sort_by(|a, b| b.0.total_cmp(&a.0));
    if pieces.len() > 1 {
        tracing::debug!(
            pieces = pieces.len(),
            "difference split the candidate; keeping the largest piece"
        );
    }
    let Some((remainder_m2, remainder)) = pieces.into_iter().next() else {
        return Ok(TrimOutcome::Consumed);
    };
    if remainder_m2 < cfg.min_area_m2 || !remainder.interiors().is_empty() {
        return Ok(TrimOutcome::Consumed);
    }
    Ok(TrimOutcome::Trimmed {
        remainder,
        removed_m2: (area_m2(candidate) - remainder_m2).max(0.0),
    })
}
