use std::collections::HashSet;

use crate::error::Result;
use crate::model::{
    CellId, CellMap, Fill, GeometryStore, IdMap, MaterialId, UniverseId,
};

/// Collects every cell contained in a universe, at any depth.
///
/// Cells of the universe itself come first, followed by the cells of each
/// fill in order. Each universe is visited once however many parents
/// reference it. Mesh-backed universes contribute nothing.
pub struct GetAllCells {
    universe: UniverseId,
}

impl GetAllCells {
    /// Creates a new `GetAllCells` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query, returning cells keyed by user-facing ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn execute(&self, store: &GeometryStore) -> Result<CellMap> {
        let mut visited = HashSet::new();
        let mut out = CellMap::new();
        collect_cells(store, self.universe, &mut visited, &mut out)?;
        Ok(out)
    }
}

fn collect_cells(
    store: &GeometryStore,
    universe: UniverseId,
    visited: &mut HashSet<UniverseId>,
    out: &mut CellMap,
) -> Result<()> {
    if !visited.insert(universe) {
        return Ok(());
    }
    let Some(cells) = store.universe(universe)?.cells() else {
        return Ok(());
    };
    for (id, cell) in cells.iter() {
        out.upsert(id, cell);
    }
    for cell in cells.values() {
        for child in fill_universes(store, cell)? {
            collect_cells(store, child, visited, out)?;
        }
    }
    Ok(())
}

/// Universes directly below `cell`: its universe fill, or the distinct
/// universes of its lattice fill.
fn fill_universes(store: &GeometryStore, cell: CellId) -> Result<Vec<UniverseId>> {
    Ok(match &store.cell(cell)?.fill {
        Fill::Universe(u) => vec![*u],
        Fill::Lattice(l) => store.lattice(*l)?.unique_universes(),
        _ => Vec::new(),
    })
}

/// Collects every material contained in a universe, at any depth.
pub struct GetAllMaterials {
    universe: UniverseId,
}

impl GetAllMaterials {
    /// Creates a new `GetAllMaterials` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query, returning materials keyed by user-facing ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn execute(&self, store: &GeometryStore) -> Result<IdMap<MaterialId>> {
        let mut out = IdMap::new();
        for cell in GetAllCells::new(self.universe).execute(store)?.values() {
            for material in store.cell(cell)?.fill.materials() {
                out.upsert(store.material(material)?.id, material);
            }
        }
        Ok(out)
    }
}

/// Collects every universe nested below a universe, excluding itself.
pub struct GetAllUniverses {
    universe: UniverseId,
}

impl GetAllUniverses {
    /// Creates a new `GetAllUniverses` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query, returning universes keyed by user-facing ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn execute(&self, store: &GeometryStore) -> Result<IdMap<UniverseId>> {
        let mut out = IdMap::new();
        for cell in GetAllCells::new(self.universe).execute(store)?.values() {
            for universe in fill_universes(store, cell)? {
                out.upsert(store.universe(universe)?.id, universe);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CellData, LatticeData, MaterialData, MeshUniverse, UniverseData};

    struct Model {
        store: GeometryStore,
        root: UniverseId,
        pin: UniverseId,
        fuel_cell: CellId,
        fuel: MaterialId,
        water: MaterialId,
    }

    /// Root -> lattice of one pin universe (fuel) plus a water cell.
    fn model() -> Model {
        let mut store = GeometryStore::new();
        let fuel = store.insert_material(MaterialData::new(None));
        let water = store.insert_material(MaterialData::new(None));
        let fuel_cell = store.insert_cell(CellData::new(None).with_fill(Fill::Material(fuel)));
        let pin = store.insert_universe(UniverseData::csg(None));
        store.add_cell(pin, fuel_cell).unwrap();

        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![pin; 2]; 2]).unwrap(),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let moderator =
            store.insert_cell(CellData::new(None).with_fill(Fill::Distributed(vec![
                Some(water),
                None,
                Some(water),
            ])));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cells(root, [holder, moderator]).unwrap();
        Model {
            store,
            root,
            pin,
            fuel_cell,
            fuel,
            water,
        }
    }

    #[test]
    fn shared_universe_cells_appear_once() {
        let m = model();
        let cells = GetAllCells::new(m.root).execute(&m.store).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells.values().last(), Some(m.fuel_cell));
    }

    #[test]
    fn materials_skip_void_entries() {
        let m = model();
        let materials = GetAllMaterials::new(m.root).execute(&m.store).unwrap();
        let found: Vec<_> = materials.values().collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&m.fuel));
        assert!(found.contains(&m.water));
    }

    #[test]
    fn nested_universes_exclude_root() {
        let m = model();
        let universes = GetAllUniverses::new(m.root).execute(&m.store).unwrap();
        assert_eq!(universes.values().collect::<Vec<_>>(), [m.pin]);
    }

    #[test]
    fn mesh_universes_are_opaque() {
        let mut store = GeometryStore::new();
        let mesh = store.insert_universe(UniverseData::mesh(
            None,
            MeshUniverse::new("part.h5m").unwrap(),
        ));
        assert!(GetAllCells::new(mesh).execute(&store).unwrap().is_empty());
        assert!(GetAllMaterials::new(mesh).execute(&store).unwrap().is_empty());
    }
}
