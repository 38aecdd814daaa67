use crate::error::Result;
use crate::math::Point3;
use crate::model::{
    CellId, Fill, GeometryStore, LatticeId, LatticeIndex, UniverseId, UniverseKind,
};
use crate::operations::descent::Descent;

/// One level of the containment chain returned by [`Find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    /// A universe entered by the walk.
    Universe(UniverseId),
    /// The cell of the enclosing universe containing the point.
    Cell(CellId),
    /// The lattice element containing the point.
    Lattice {
        lattice: LatticeId,
        index: LatticeIndex,
    },
}

/// Finds the chain of universes, cells and lattice elements containing a
/// point.
///
/// Cells are tested in insertion order and the first one containing the
/// point wins. Before descending into a universe fill the cell's translation
/// is subtracted from the point and its rotation applied, in that order.
/// An empty chain means the point lies outside every cell of the starting
/// universe; a chain ending in a universe-filled cell means the point is in
/// that cell but outside everything below it.
pub struct Find {
    universe: UniverseId,
    point: Point3,
}

impl Find {
    /// Creates a new `Find` query.
    #[must_use]
    pub fn new(universe: UniverseId, point: Point3) -> Self {
        Self { universe, point }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities or a
    /// universe contains itself.
    pub fn execute(&self, store: &GeometryStore) -> Result<Vec<Located>> {
        let mut chain = Vec::new();
        let mut descent = Descent::new();
        locate_in_universe(store, self.universe, self.point, &mut descent, &mut chain)?;
        Ok(chain)
    }
}

fn locate_in_universe(
    store: &GeometryStore,
    universe: UniverseId,
    point: Point3,
    descent: &mut Descent,
    chain: &mut Vec<Located>,
) -> Result<()> {
    descent.enter(store, universe)?;
    let result = locate_in_cells(store, universe, point, descent, chain);
    descent.leave(universe);
    result
}

fn locate_in_cells(
    store: &GeometryStore,
    universe: UniverseId,
    point: Point3,
    descent: &mut Descent,
    chain: &mut Vec<Located>,
) -> Result<()> {
    let cells = match &store.universe(universe)?.kind {
        UniverseKind::Csg { cells } => cells,
        UniverseKind::Mesh(_) => {
            // Opaque: the mesh engine resolves anything below this level.
            chain.push(Located::Universe(universe));
            return Ok(());
        }
    };

    for cell_id in cells.values() {
        let cell = store.cell(cell_id)?;
        let inside = match &cell.region {
            Some(region) => region.contains(store, &point)?,
            None => true,
        };
        if !inside {
            continue;
        }

        chain.push(Located::Universe(universe));
        chain.push(Located::Cell(cell_id));
        match &cell.fill {
            Fill::Void | Fill::Material(_) | Fill::Distributed(_) => {}
            Fill::Universe(child) => {
                let mut p = point;
                if let Some(t) = cell.translation {
                    p -= t;
                }
                if let Some(r) = &cell.rotation {
                    p = Point3::from(r.matrix() * p.coords);
                }
                locate_in_universe(store, *child, p, descent, chain)?;
            }
            Fill::Lattice(lattice) => {
                locate_in_lattice(store, *lattice, point, descent, chain)?;
            }
        }
        return Ok(());
    }
    Ok(())
}

fn locate_in_lattice(
    store: &GeometryStore,
    lattice_id: LatticeId,
    point: Point3,
    descent: &mut Descent,
    chain: &mut Vec<Located>,
) -> Result<()> {
    let lattice = store.lattice(lattice_id)?;
    let (index, local) = lattice.find_element(&point);
    let Some(universe) = lattice.get_universe(&index).or(lattice.outer) else {
        return Ok(());
    };
    chain.push(Located::Lattice {
        lattice: lattice_id,
        index,
    });
    locate_in_universe(store, universe, local, descent, chain)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{CsgError, ModelError};
    use crate::geometry::Quadric;
    use crate::math::Vector3;
    use crate::model::{
        CellData, LatticeData, MaterialData, Region, Rotation, SurfaceData, UniverseData,
    };

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn x_slab(store: &mut GeometryStore, lo: f64, hi: f64) -> Region {
        let a = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: lo }));
        let b = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: hi }));
        Region::above(a) & Region::below(b)
    }

    /// Universe holding one material cell that fills all of space.
    fn leaf_universe(store: &mut GeometryStore) -> (UniverseId, CellId) {
        let m = store.insert_material(MaterialData::new(None));
        let c = store.insert_cell(CellData::new(None).with_fill(Fill::Material(m)));
        let u = store.insert_universe(UniverseData::csg(None));
        store.add_cell(u, c).unwrap();
        (u, c)
    }

    #[test]
    fn locates_material_cells_by_region() {
        let mut store = GeometryStore::new();
        let ma = store.insert_material(MaterialData::new(None));
        let mb = store.insert_material(MaterialData::new(None));
        let ra = x_slab(&mut store, 0.0, 1.0);
        let rb = x_slab(&mut store, 1.0, 2.0);
        let a = store.insert_cell(
            CellData::new(None)
                .with_region(ra)
                .with_fill(Fill::Material(ma)),
        );
        let b = store.insert_cell(
            CellData::new(None)
                .with_region(rb)
                .with_fill(Fill::Material(mb)),
        );
        let u = store.insert_universe(UniverseData::csg(None));
        store.add_cells(u, [a, b]).unwrap();

        let chain = Find::new(u, p(0.5, 0.0, 0.0)).execute(&store).unwrap();
        assert_eq!(chain, [Located::Universe(u), Located::Cell(a)]);
        let chain = Find::new(u, p(1.5, 0.0, 0.0)).execute(&store).unwrap();
        assert_eq!(chain, [Located::Universe(u), Located::Cell(b)]);
        assert!(Find::new(u, p(5.0, 5.0, 5.0)).execute(&store).unwrap().is_empty());
    }

    #[test]
    fn first_inserted_cell_wins_on_overlap() {
        let mut store = GeometryStore::new();
        let first = store.insert_cell(CellData::new(None));
        let second = store.insert_cell(CellData::new(None));
        let u = store.insert_universe(UniverseData::csg(None));
        store.add_cells(u, [first, second]).unwrap();
        let chain = Find::new(u, p(0.0, 0.0, 0.0)).execute(&store).unwrap();
        assert_eq!(chain[1], Located::Cell(first));
    }

    #[test]
    fn translation_is_subtracted_before_descent() {
        let mut store = GeometryStore::new();
        // Child universe: only the slab around the origin is filled.
        let child_region = x_slab(&mut store, -0.1, 0.1);
        let inner = store.insert_cell(CellData::new(None).with_region(child_region));
        let child = store.insert_universe(UniverseData::csg(None));
        store.add_cell(child, inner).unwrap();

        let outer = store.insert_cell(
            CellData::new(None)
                .with_fill(Fill::Universe(child))
                .with_translation(Vector3::new(1.0, 0.0, 0.0)),
        );
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, outer).unwrap();

        let chain = Find::new(root, p(1.0, 0.0, 0.0)).execute(&store).unwrap();
        assert_eq!(
            chain,
            [
                Located::Universe(root),
                Located::Cell(outer),
                Located::Universe(child),
                Located::Cell(inner),
            ]
        );
        // The outer cell still matches; nothing below it does.
        let chain = Find::new(root, p(0.0, 0.0, 0.0)).execute(&store).unwrap();
        assert_eq!(chain, [Located::Universe(root), Located::Cell(outer)]);
    }

    #[test]
    fn rotation_applies_after_translation() {
        let mut store = GeometryStore::new();
        let region = x_slab(&mut store, 1.5, 2.5);
        let inner = store.insert_cell(CellData::new(None).with_region(region));
        let child = store.insert_universe(UniverseData::csg(None));
        store.add_cell(child, inner).unwrap();

        // Point (0, 3, 0) -> translate -> (0, 2, 0) -> rotate by psi = 90 deg -> (2, 0, 0).
        let outer = store.insert_cell(
            CellData::new(None)
                .with_fill(Fill::Universe(child))
                .with_translation(Vector3::new(0.0, 1.0, 0.0))
                .with_rotation(Rotation::Angles(Vector3::new(0.0, 0.0, 90.0))),
        );
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, outer).unwrap();

        let chain = Find::new(root, p(0.0, 3.0, 0.0)).execute(&store).unwrap();
        assert_eq!(chain.last(), Some(&Located::Cell(inner)));
    }

    #[test]
    fn lattice_elements_use_local_coordinates() {
        let mut store = GeometryStore::new();
        let (pin, pin_cell) = leaf_universe(&mut store);
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![pin; 3]; 2]).unwrap(),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, holder).unwrap();

        let chain = Find::new(root, p(2.5, 0.5, 0.0)).execute(&store).unwrap();
        assert_eq!(
            chain,
            [
                Located::Universe(root),
                Located::Cell(holder),
                Located::Lattice {
                    lattice,
                    index: LatticeIndex::new_2d(2, 0),
                },
                Located::Universe(pin),
                Located::Cell(pin_cell),
            ]
        );
        // Outside the lattice and no outer universe.
        let chain = Find::new(root, p(-0.5, 0.5, 0.0)).execute(&store).unwrap();
        assert_eq!(chain, [Located::Universe(root), Located::Cell(holder)]);
    }

    #[test]
    fn outer_universe_catches_points_outside_the_lattice() {
        let mut store = GeometryStore::new();
        let (pin, _) = leaf_universe(&mut store);
        let (water, water_cell) = leaf_universe(&mut store);
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![pin]])
                .unwrap()
                .with_outer(water),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, holder).unwrap();

        let chain = Find::new(root, p(4.0, 0.5, 0.0)).execute(&store).unwrap();
        assert_eq!(chain.last(), Some(&Located::Cell(water_cell)));
    }

    #[test]
    fn self_containing_universe_is_reported() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        let c = store.insert_cell(CellData::new(None).with_fill(Fill::Universe(u)));
        store.add_cell(u, c).unwrap();
        let err = Find::new(u, p(0.0, 0.0, 0.0)).execute(&store).unwrap_err();
        assert!(matches!(err, CsgError::Model(ModelError::CyclicGeometry(_))));
    }

    #[test]
    fn cycle_through_a_lattice_is_reported() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![u]]).unwrap(),
        );
        let c = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        store.add_cell(u, c).unwrap();
        let err = Find::new(u, p(0.5, 0.5, 0.0)).execute(&store).unwrap_err();
        assert!(matches!(err, CsgError::Model(ModelError::CyclicGeometry(_))));
    }

    #[test]
    fn shared_universe_on_sibling_branches_is_not_a_cycle() {
        let mut store = GeometryStore::new();
        let (pin, pin_cell) = leaf_universe(&mut store);
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![pin, pin]]).unwrap(),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, holder).unwrap();
        let chain = Find::new(root, p(1.5, 0.5, 0.0)).execute(&store).unwrap();
        assert_eq!(chain.last(), Some(&Located::Cell(pin_cell)));
    }
}
