//! Builds a 2x2 pin lattice, locates a point in it and prints the instance
//! paths of the fuel material.
//!
//! Run with `RUST_LOG=debug` to see the traversal logs.

use csgverse::geometry::{BoundaryType, Quadric};
use csgverse::io::GeometryXmlWriter;
use csgverse::math::Point3;
use csgverse::model::{
    CellData, Fill, GeometryStore, LatticeData, MaterialData, Region, SurfaceData, UniverseData,
};
use csgverse::operations::clone::CloneUniverse;
use csgverse::operations::instances::DeterminePaths;
use csgverse::operations::query::Find;

fn main() -> csgverse::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut store = GeometryStore::new();
    let fuel = store.insert_material(
        MaterialData::new(None)
            .with_name("UO2")
            .with_nuclide("U235", 0.05),
    );
    let water = store.insert_material(
        MaterialData::new(None)
            .with_name("water")
            .with_nuclide("H1", 2.0),
    );

    let clad = store.insert_surface(SurfaceData::new(
        None,
        Quadric::ZCylinder {
            x0: 0.0,
            y0: 0.0,
            r: 0.4,
        },
    ));
    let pin = store.insert_universe(UniverseData::csg(None).with_name("pin"));
    let fuel_cell = store.insert_cell(
        CellData::new(None)
            .with_fill(Fill::Material(fuel))
            .with_region(Region::below(clad)),
    );
    let water_cell = store.insert_cell(
        CellData::new(None)
            .with_fill(Fill::Material(water))
            .with_region(Region::above(clad)),
    );
    store.add_cells(pin, [fuel_cell, water_cell])?;

    let lattice = store.insert_lattice(LatticeData::new_2d(
        None,
        [1.0, 1.0],
        [-1.0, -1.0],
        vec![vec![pin, pin], vec![pin, pin]],
    )?);

    let planes = [
        Quadric::XPlane { x0: -1.0 },
        Quadric::XPlane { x0: 1.0 },
        Quadric::YPlane { y0: -1.0 },
        Quadric::YPlane { y0: 1.0 },
    ];
    let mut halves = Vec::new();
    for (i, quadric) in planes.into_iter().enumerate() {
        let surface = store.insert_surface(
            SurfaceData::new(None, quadric).with_boundary(BoundaryType::Reflective),
        );
        halves.push(if i % 2 == 0 {
            Region::above(surface)
        } else {
            Region::below(surface)
        });
    }
    let root = store.insert_universe(UniverseData::csg(None).with_name("root"));
    let assembly = store.insert_cell(
        CellData::new(None)
            .with_fill(Fill::Lattice(lattice))
            .with_region(Region::Intersection(halves)),
    );
    store.add_cell(root, assembly)?;

    let point = Point3::new(0.6, 0.4, 0.0);
    let chain = Find::new(root, point).execute(&store)?;
    println!("{point} is inside {} levels:", chain.len());
    for level in &chain {
        println!("  {level:?}");
    }

    let instances = DeterminePaths::new(root).execute(&store)?;
    if let Some(fuel_instances) = instances.material(fuel) {
        println!("fuel appears {} times:", fuel_instances.count);
        for path in &fuel_instances.paths {
            println!("  {path}");
        }
    }
    store.reset_instances();
    instances.apply(&mut store)?;

    let copy = CloneUniverse::new(root).execute(&mut store)?;
    println!("{}", GeometryXmlWriter::new().write(&store, copy)?);
    Ok(())
}
