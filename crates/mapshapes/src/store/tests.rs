use super::palette::{default_styling, in_palette};
use super::*;
use crate::geom::{area_m2, polygon_from_ring, GeometryError, RawGeometry, RulesCfg};
use proptest::prelude::*;

fn seeded() -> StoreCfg {
    StoreCfg {
        seed: Some(7),
        ..StoreCfg::default()
    }
}

fn rect(lon: f64, lat: f64, w: f64, h: f64) -> RawGeometry {
    RawGeometry::rectangle([lon, lat], [lon + w, lat + h])
}

fn square_ring(lon: f64, lat: f64, size: f64) -> RawGeometry {
    RawGeometry::polygon(vec![
        [lon, lat],
        [lon + size, lat],
        [lon + size, lat + size],
        [lon, lat + size],
        [lon, lat],
    ])
}

fn raw_area(raw: &RawGeometry) -> f64 {
    match raw {
        RawGeometry::Polygon { coordinates } => {
            area_m2(&polygon_from_ring(&coordinates[0]).unwrap())
        }
        _ => panic!("polygon expected"),
    }
}

fn stored_area(store: &ShapeStore, id: ShapeId) -> f64 {
    area_m2(store.get(id).unwrap().geometry.as_polygon().unwrap())
}

/// Non-overlapping geometry of the right kind, placed by index.
fn disjoint_raw(shape_type: ShapeType, i: usize) -> RawGeometry {
    let lon = (i as f64) * 0.1;
    match shape_type {
        ShapeType::Polygon => square_ring(lon, 0.0, 0.01),
        ShapeType::Rectangle => rect(lon, 1.0, 0.01, 0.01),
        ShapeType::Circle => RawGeometry::circle([lon, 2.0], 200.0),
        ShapeType::Linestring => RawGeometry::line(vec![[lon, 3.0], [lon + 0.01, 3.01]]),
    }
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * b.abs().max(1.0)
}

#[test]
fn classify_uses_tool_except_for_lines() {
    let poly = square_ring(0.0, 0.0, 0.01);
    let line = RawGeometry::line(vec![[0.0, 0.0], [1.0, 1.0]]);
    assert_eq!(ShapeStore::classify(&poly, DrawTool::Polygon), ShapeType::Polygon);
    assert_eq!(ShapeStore::classify(&poly, DrawTool::Rectangle), ShapeType::Rectangle);
    assert_eq!(
        ShapeStore::classify(&RawGeometry::circle([0.0, 0.0], 5.0), DrawTool::Circle),
        ShapeType::Circle
    );
    assert_eq!(ShapeStore::classify(&line, DrawTool::Polygon), ShapeType::Linestring);
    assert_eq!(ShapeStore::classify(&line, DrawTool::Polyline), ShapeType::Linestring);
}

#[test]
fn concrete_scenario_accept_trim_reject() {
    let mut store = ShapeStore::new(seeded());
    let a = rect(0.0, 0.0, 0.01, 0.01);
    let b = rect(0.007, 0.0, 0.01, 0.01);

    let first = store.submit(DrawTool::Rectangle, &a).unwrap();
    assert!(!first.was_trimmed());
    assert!(close(stored_area(&store, first.id), raw_area(&a), 1e-9));

    let second = store.submit(DrawTool::Polygon, &b).unwrap();
    assert_eq!(second.trimmed_by, vec![first.id]);
    let b_area = raw_area(&b);
    let committed = stored_area(&store, second.id);
    assert!(close(committed, b_area - second.removed_m2, 1e-6));
    assert!(close(committed, 0.7 * b_area, 1e-3));
    assert!(committed >= 1.0);

    let again = store.submit(DrawTool::Polygon, &a).unwrap_err();
    assert_eq!(again.reason(), RejectReason::FullOverlap);
    assert_eq!(again, Rejection::FullOverlap { against: first.id });
    assert_eq!(store.len(), 2);
}

#[test]
fn clockwise_input_is_measured_like_counter_clockwise() {
    let mut store = ShapeStore::new(seeded());
    // Rectangle corners come sw -> nw -> ne -> se.
    let a = rect(0.0, 0.0, 0.01, 0.01);
    let ok = store.submit(DrawTool::Rectangle, &a).unwrap();
    let ccw = square_ring(0.0, 0.0, 0.01);
    let stored = stored_area(&store, ok.id);
    assert!(close(stored, raw_area(&ccw), 1e-9));
    assert!(stored > 1.0e6 && stored < 1.3e6, "{stored}");

    // A clockwise sliver of about 0.006 m² stays out.
    let sliver = RawGeometry::polygon(vec![[1.0, 1.0], [1.0000001, 1.000001], [1.000001, 1.0]]);
    let err = store.submit(DrawTool::Polygon, &sliver).unwrap_err();
    assert!(matches!(
        err,
        Rejection::InvalidGeometry(GeometryError::Degenerate { area_m2, .. }) if area_m2 < 1.0
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn containment_rejection_is_idempotent() {
    let mut store = ShapeStore::new(seeded());
    store.submit(DrawTool::Polygon, &square_ring(0.0, 0.0, 0.01)).unwrap();
    let inner = square_ring(0.002, 0.002, 0.004);
    let before = store.shapes().to_vec();
    for _ in 0..3 {
        let err = store.submit(DrawTool::Polygon, &inner).unwrap_err();
        assert_eq!(err.reason(), RejectReason::FullOverlap);
        assert_eq!(store.shapes(), before.as_slice());
    }
    // A candidate enclosing an existing shape is rejected as well.
    let outer = square_ring(-0.01, -0.01, 0.05);
    assert_eq!(
        store.submit(DrawTool::Polygon, &outer).unwrap_err().reason(),
        RejectReason::FullOverlap
    );
}

#[test]
fn tiny_remainder_is_rejected_not_stored() {
    let cfg = StoreCfg {
        rules: RulesCfg {
            min_area_m2: 50_000.0,
            ..RulesCfg::default()
        },
        ..seeded()
    };
    let mut store = ShapeStore::new(cfg);
    store.submit(DrawTool::Rectangle, &rect(0.0003, -0.01, 0.03, 0.03)).unwrap();
    let err = store.submit(DrawTool::Polygon, &square_ring(0.0, 0.0, 0.01)).unwrap_err();
    assert_eq!(err.reason(), RejectReason::FullOverlap);
    assert_eq!(store.len(), 1);
}

#[test]
fn trimming_visits_existing_shapes_in_id_order() {
    let mut store = ShapeStore::new(seeded());
    let x = store.submit(DrawTool::Polygon, &rect(0.0, 0.0, 0.01, 0.01)).unwrap();
    let y = store.submit(DrawTool::Polygon, &rect(0.02, 0.0, 0.01, 0.01)).unwrap();
    let z_raw = rect(0.005, 0.002, 0.02, 0.006);
    let z = store.submit(DrawTool::Polygon, &z_raw).unwrap();
    assert_eq!(z.trimmed_by, vec![x.id, y.id]);
    assert!(close(stored_area(&store, z.id), 0.5 * raw_area(&z_raw), 1e-3));
}

#[test]
fn linestrings_ignore_overlaps() {
    let mut store = ShapeStore::new(seeded());
    store.submit(DrawTool::Polygon, &square_ring(0.0, 0.0, 0.01)).unwrap();
    store.submit(DrawTool::Polygon, &square_ring(0.02, 0.0, 0.01)).unwrap();
    let crossing = RawGeometry::line(vec![[-0.01, 0.005], [0.04, 0.005]]);
    for _ in 0..7 {
        let ok = store.submit(DrawTool::Polyline, &crossing).unwrap();
        assert_eq!(ok.shape_type, ShapeType::Linestring);
        assert!(!ok.was_trimmed());
        assert_eq!(store.get(ok.id).unwrap().styling, default_styling());
    }
    let err = store.submit(DrawTool::Polyline, &crossing).unwrap_err();
    assert_eq!(
        err,
        Rejection::LimitReached {
            shape_type: ShapeType::Linestring,
            max: 7
        }
    );
    // Polygons are not trimmed by linestrings either.
    let p = store.submit(DrawTool::Polygon, &square_ring(0.0, 0.02, 0.01)).unwrap();
    assert!(!p.was_trimmed());
}

#[test]
fn circles_keep_radius_and_resolution() {
    let mut store = ShapeStore::new(seeded());
    let ok = store
        .submit(DrawTool::Circle, &RawGeometry::circle([5.0, 45.0], 300.0))
        .unwrap();
    let shape = store.get(ok.id).unwrap();
    assert_eq!(shape.shape_type, ShapeType::Circle);
    assert_eq!(shape.radius, Some(300.0));
    assert_eq!(shape.geometry.as_polygon().unwrap().exterior().0.len(), 65);
    assert!(in_palette(&shape.styling));
}

#[test]
fn mismatched_and_degenerate_input_is_invalid() {
    let mut store = ShapeStore::new(seeded());
    let err = store
        .accept(&square_ring(0.0, 0.0, 0.01), ShapeType::Circle)
        .unwrap_err();
    assert!(matches!(err, Rejection::KindMismatch { .. }));
    assert_eq!(err.reason(), RejectReason::InvalidGeometry);

    let flat = RawGeometry::polygon(vec![[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]]);
    let err = store.submit(DrawTool::Polygon, &flat).unwrap_err();
    assert!(matches!(
        err,
        Rejection::InvalidGeometry(GeometryError::Degenerate { .. })
    ));

    let nan = RawGeometry::circle([f64::NAN, 0.0], 10.0);
    assert_eq!(
        store.submit(DrawTool::Circle, &nan).unwrap_err().reason(),
        RejectReason::InvalidGeometry
    );
    assert!(store.is_empty());
}

#[test]
fn edit_replaces_geometry_only() {
    let mut store = ShapeStore::new(seeded());
    let ok = store.submit(DrawTool::Rectangle, &rect(0.0, 0.0, 0.01, 0.01)).unwrap();
    let before = store.get(ok.id).unwrap().clone();

    // Overlaps are not re-checked on edit.
    store.submit(DrawTool::Polygon, &rect(0.05, 0.0, 0.01, 0.01)).unwrap();
    let edited = store.edit(ok.id, &rect(0.045, 0.0, 0.02, 0.01)).unwrap().clone();
    assert_eq!(edited.id, before.id);
    assert_eq!(edited.shape_type, before.shape_type);
    assert_eq!(edited.styling, before.styling);
    assert_ne!(edited.geometry, before.geometry);

    let line = RawGeometry::line(vec![[0.0, 0.0], [1.0, 1.0]]);
    assert!(matches!(
        store.edit(ok.id, &line),
        Err(EditError::KindMismatch { .. })
    ));
    assert_eq!(
        store.edit(ShapeId(999), &line).unwrap_err(),
        EditError::NotFound(ShapeId(999))
    );
    assert_eq!(store.get(ok.id).unwrap(), &edited);
}

#[test]
fn circle_edit_updates_radius() {
    let mut store = ShapeStore::new(seeded());
    let ok = store
        .submit(DrawTool::Circle, &RawGeometry::circle([0.0, 0.0], 100.0))
        .unwrap();
    store
        .edit(ok.id, &RawGeometry::circle([0.001, 0.0], 150.0))
        .unwrap();
    assert_eq!(store.get(ok.id).unwrap().radius, Some(150.0));
}

#[test]
fn edit_requires_the_shapes_own_geometry_kind() {
    let mut store = ShapeStore::new(seeded());
    let circle = store
        .submit(DrawTool::Circle, &RawGeometry::circle([0.0, 0.0], 100.0))
        .unwrap();
    let square = store
        .submit(DrawTool::Rectangle, &rect(1.0, 1.0, 0.01, 0.01))
        .unwrap();
    let before = store.shapes().to_vec();

    let err = store
        .edit(circle.id, &RawGeometry::rectangle([5.0, 5.0], [5.5, 5.5]))
        .unwrap_err();
    assert_eq!(
        err,
        EditError::KindMismatch {
            id: circle.id,
            shape_type: ShapeType::Circle,
            geometry: "polygon",
        }
    );
    let err = store
        .edit(square.id, &RawGeometry::circle([1.0, 1.0], 50.0))
        .unwrap_err();
    assert!(matches!(
        err,
        EditError::KindMismatch {
            shape_type: ShapeType::Rectangle,
            ..
        }
    ));

    // Clockwise sliver edits are degenerate too.
    let sliver = RawGeometry::polygon(vec![[1.0, 1.0], [1.0000001, 1.000001], [1.000001, 1.0]]);
    assert!(matches!(
        store.edit(square.id, &sliver),
        Err(EditError::InvalidGeometry(GeometryError::Degenerate { .. }))
    ));
    assert_eq!(store.shapes(), before.as_slice());
    let exported = store.export_all();
    assert_eq!(exported.features[0].properties.radius, Some(100.0));
    assert_eq!(
        store.get(circle.id).unwrap().geometry.as_polygon().unwrap().exterior().0.len(),
        65
    );
}

#[test]
fn delete_and_identity() {
    let mut store = ShapeStore::new(seeded());
    let a = store.submit(DrawTool::Polygon, &disjoint_raw(ShapeType::Polygon, 0)).unwrap();
    assert!(!store.delete(ShapeId(42)));
    assert_eq!(store.len(), 1);
    assert!(store.delete(a.id));
    assert!(!store.delete(a.id));
    assert!(store.is_empty());
    // Ids are never reused.
    let b = store.submit(DrawTool::Polygon, &disjoint_raw(ShapeType::Polygon, 0)).unwrap();
    assert!(b.id > a.id);
}

#[test]
fn seeded_colors_are_reproducible() {
    let run = || {
        let mut store = ShapeStore::new(seeded());
        (0..4)
            .map(|i| {
                let ok = store
                    .submit(DrawTool::Polygon, &disjoint_raw(ShapeType::Polygon, i))
                    .unwrap();
                store.get(ok.id).unwrap().styling.clone()
            })
            .collect::<Vec<_>>()
    };
    let first = run();
    assert_eq!(first, run());
    assert!(first.iter().all(in_palette));
}

#[test]
fn apply_reports_outcomes_and_notices() {
    let mut store = ShapeStore::new(seeded());
    let drawn = |geometry| ShapeEvent::Drawn {
        tool: DrawTool::Polygon,
        geometry,
    };

    let out = store.apply(&drawn(rect(0.0, 0.0, 0.01, 0.01)));
    let Outcome::Created { id: a, .. } = out.clone() else {
        panic!("expected created");
    };
    assert!(out.notice().is_none());

    let out = store.apply(&drawn(rect(0.007, 0.0, 0.01, 0.01)));
    assert!(matches!(&out, Outcome::Created { trimmed_by, .. } if trimmed_by == &vec![a]));
    assert_eq!(out.notice().unwrap().level, NoticeLevel::Advisory);

    let out = store.apply(&drawn(rect(0.0, 0.0, 0.01, 0.01)));
    let notice = out.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Blocking);
    assert_eq!(notice.reason, Some(RejectReason::FullOverlap));

    let out = store.apply(&ShapeEvent::Deleted { id: ShapeId(77) });
    assert_eq!(out, Outcome::NotFound { id: ShapeId(77) });
    assert_eq!(store.apply(&ShapeEvent::Deleted { id: a }), Outcome::Deleted { id: a });
    assert_eq!(store.len(), 1);
}

#[test]
fn events_parse_from_json() {
    let line = r#"{"event":"drawn","tool":"circle","geometry":{"type":"Point","coordinates":[10.0,50.0],"radius":120.5}}"#;
    let ev: ShapeEvent = serde_json::from_str(line).unwrap();
    assert_eq!(
        ev,
        ShapeEvent::Drawn {
            tool: DrawTool::Circle,
            geometry: RawGeometry::circle([10.0, 50.0], 120.5)
        }
    );
    let ev: ShapeEvent = serde_json::from_str(r#"{"event":"deleted","id":3}"#).unwrap();
    assert_eq!(ev, ShapeEvent::Deleted { id: ShapeId(3) });

    let cfg: StoreCfg = serde_json::from_str(r#"{"limits":{"circle":2}}"#).unwrap();
    assert_eq!(cfg.limits.circle, 2);
    assert_eq!(cfg.limits.polygon, 10);
    assert_eq!(cfg.rules, RulesCfg::default());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn limit_is_never_exceeded(kind in 0usize..4, max in 0usize..4, extra in 1usize..3) {
        let shape_type = ShapeType::ALL[kind];
        let mut cfg = seeded();
        match shape_type {
            ShapeType::Polygon => cfg.limits.polygon = max,
            ShapeType::Rectangle => cfg.limits.rectangle = max,
            ShapeType::Circle => cfg.limits.circle = max,
            ShapeType::Linestring => cfg.limits.linestring = max,
        }
        let mut store = ShapeStore::new(cfg);
        for i in 0..max {
            prop_assert!(store.accept(&disjoint_raw(shape_type, i), shape_type).is_ok());
        }
        for j in 0..extra {
            let before = store.shapes().to_vec();
            let err = store.accept(&disjoint_raw(shape_type, max + j), shape_type).unwrap_err();
            prop_assert_eq!(err.reason(), RejectReason::LimitReached);
            prop_assert_eq!(store.shapes(), before.as_slice());
        }
        prop_assert_eq!(store.count(shape_type), max);
    }

    #[test]
    fn delete_unknown_is_noop(n in 0usize..4, unknown in 100u64..1000) {
        let mut store = ShapeStore::new(seeded());
        for i in 0..n {
            store.submit(DrawTool::Polygon, &disjoint_raw(ShapeType::Polygon, i)).unwrap();
        }
        prop_assert!(!store.delete(ShapeId(unknown)));
        prop_assert_eq!(store.len(), n);
    }

    #[test]
    fn ids_are_unique(n in 1usize..6) {
        let mut store = ShapeStore::new(seeded());
        for i in 0..n {
            store.submit(DrawTool::Rectangle, &disjoint_raw(ShapeType::Rectangle, i)).ok();
            store.submit(DrawTool::Polyline, &disjoint_raw(ShapeType::Linestring, i)).ok();
        }
        let mut ids: Vec<_> = store.shapes().iter().map(|s| s.id).collect();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), len);
    }
}
