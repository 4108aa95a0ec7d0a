//! Walk through accept / trim / reject on three squares near the equator.
//!
//! Purpose
//! - Show the collection's decisions for a first shape, a partially
//!   overlapping second shape, and a third shape identical to the first.
//! - Print the export document the rendering side would receive.

use mapshapes::geom::area_m2;
use mapshapes::prelude::*;

fn main() {
    let mut store = ShapeStore::new(StoreCfg {
        seed: Some(1),
        ..StoreCfg::default()
    });
    let a = RawGeometry::rectangle([0.0, 0.0], [0.01, 0.01]);
    let b = RawGeometry::rectangle([0.007, 0.0], [0.017, 0.01]);

    for (name, raw) in [("A", &a), ("B", &b), ("C", &a)] {
        match store.submit(DrawTool::Polygon, raw) {
            Ok(ok) => {
                let shape = store.get(ok.id).expect("accepted shape is stored");
                let area = shape.geometry.as_polygon().map(area_m2).unwrap_or(0.0);
                println!(
                    "{name}: accepted id={} area_m2={area:.1} trimmed_by={:?}",
                    ok.id, ok.trimmed_by
                );
            }
            Err(rejection) => println!("{name}: rejected ({:?}) {rejection}", rejection.reason()),
        }
    }
    println!("shapes={}", store.len());
    println!(
        "{}",
        store
            .export_all()
            .to_json_pretty()
            .expect("export serializes")
    );
}
