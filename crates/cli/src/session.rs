use anyhow::{Context, Result};
use mapshapes::export::FeatureCollection;
use mapshapes::geom::area_m2;
use mapshapes::store::{
    NoticeLevel, Outcome, ShapeEvent, ShapeGeometry, ShapeStore, ShapeType, StoreCfg,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Load a store config (JSON, partial files allowed); `seed` overrides the file.
pub fn load_cfg(path: Option<&Path>, seed: Option<u64>) -> Result<StoreCfg> {
    let mut cfg = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => StoreCfg::default(),
    };
    if seed.is_some() {
        cfg.seed = seed;
    }
    Ok(cfg)
}

/// Read one event per line. Blank lines and lines starting with `#` are skipped.
pub fn read_events(path: &Path) -> Result<Vec<ShapeEvent>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading events {}", path.display()))?;
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: bad event", path.display(), idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Tally of a replayed session.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Summary {
    pub created: usize,
    pub trimmed: usize,
    pub rejected: BTreeMap<String, usize>,
    pub edited: usize,
    pub edit_failed: usize,
    pub deleted: usize,
    pub not_found: usize,
    pub counts: BTreeMap<String, usize>,
}

/// Apply `events` in order, logging every outcome and notice.
pub fn replay(store: &mut ShapeStore, events: &[ShapeEvent]) -> Summary {
    let mut summary = Summary::default();
    for (idx, event) in events.iter().enumerate() {
        let outcome = store.apply(event);
        match &outcome {
            Outcome::Created { trimmed_by, .. } => {
                summary.created += 1;
                if !trimmed_by.is_empty() {
                    summary.trimmed += 1;
                }
            }
            Outcome::Rejected { reason, .. } => {
                *summary.rejected.entry(format!("{reason:?}")).or_default() += 1;
            }
            Outcome::Edited { .. } => summary.edited += 1,
            Outcome::EditFailed { .. } => summary.edit_failed += 1,
            Outcome::Deleted { .. } => summary.deleted += 1,
            Outcome::NotFound { .. } => summary.not_found += 1,
        }
        tracing::info!(event = idx, outcome = ?outcome, "applied");
        if let Some(notice) = outcome.notice() {
            match notice.level {
                NoticeLevel::Blocking => tracing::warn!(event = idx, "{}", notice.message),
                NoticeLevel::Advisory => tracing::info!(event = idx, "{}", notice.message),
            }
        }
    }
    summary.counts = ShapeType::ALL
        .iter()
        .map(|&t| (t.to_string(), store.count(t)))
        .collect();
    summary
}

/// Write the export document, creating parent directories as needed.
pub fn write_export(out: &Path, store: &ShapeStore) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let text = store.export_all().to_json_pretty()?;
    fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

pub fn read_export(path: &Path) -> Result<FeatureCollection> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    FeatureCollection::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

/// One row per shape: id, type, radius, vertex count, area.
pub fn describe(store: &ShapeStore) -> Value {
    let rows: Vec<Value> = store
        .shapes()
        .iter()
        .map(|s| {
            let (vertices, area) = match &s.geometry {
                ShapeGeometry::Polygon(p) => (p.exterior().0.len(), area_m2(p)),
                ShapeGeometry::LineString(l) => (l.0.len(), 0.0),
            };
            json!({
                "id": s.id,
                "shapeType": s.shape_type,
                "radius": s.radius,
                "vertices": vertices,
                "area_m2": area,
            })
        })
        .collect();
    json!({ "shapes": rows })
}
