use crate::error::{ModelError, Result};
use crate::model::{Fill, GeometryStore, MaterialId, UniverseId};
use crate::operations::descent::Descent;

use super::InstanceMap;

/// Counts every occurrence of every cell and material below a root
/// universe and records the path leading to it.
///
/// Paths read like `u1->c10->l5(0,1)->u2->c20`, with `->mN` appended for
/// material occurrences. Cells are visited depth first in insertion order,
/// lattice elements in natural order. A distributed fill hands out its
/// `k`-th material to the `k`-th occurrence of the cell in that order.
/// Mesh-backed universes contribute nothing below the cell they fill.
pub struct DeterminePaths {
    root: UniverseId,
    instances_only: bool,
}

impl DeterminePaths {
    /// Creates a new `DeterminePaths` operation.
    #[must_use]
    pub fn new(root: UniverseId) -> Self {
        Self {
            root,
            instances_only: false,
        }
    }

    /// Skips building path strings and only counts occurrences.
    #[must_use]
    pub fn instances_only(mut self, instances_only: bool) -> Self {
        self.instances_only = instances_only;
        self
    }

    /// Executes the enumeration.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities, a
    /// distributed fill has fewer entries than occurrences of its cell, or
    /// a universe contains itself.
    pub fn execute(&self, store: &GeometryStore) -> Result<InstanceMap> {
        tracing::debug!(instances_only = self.instances_only, "determining instance paths");
        let mut map = InstanceMap::default();
        let mut descent = Descent::new();
        self.visit_universe(store, self.root, "", &mut descent, &mut map)?;
        Ok(map)
    }

    fn visit_universe(
        &self,
        store: &GeometryStore,
        universe: UniverseId,
        prefix: &str,
        descent: &mut Descent,
        map: &mut InstanceMap,
    ) -> Result<()> {
        descent.enter(store, universe)?;
        let result = self.visit_cells(store, universe, prefix, descent, map);
        descent.leave(universe);
        result
    }

    fn visit_cells(
        &self,
        store: &GeometryStore,
        universe: UniverseId,
        prefix: &str,
        descent: &mut Descent,
        map: &mut InstanceMap,
    ) -> Result<()> {
        let data = store.universe(universe)?;
        let universe_path = format!("{prefix}u{}", data.id);
        let Some(cells) = data.cells() else {
            return Ok(());
        };

        for cell in cells.values() {
            let data = store.cell(cell)?;
            let cell_path = format!("{universe_path}->c{}", data.id);
            match &data.fill {
                Fill::Universe(child) => {
                    self.visit_universe(store, *child, &format!("{cell_path}->"), descent, map)?;
                }
                Fill::Lattice(lattice) => {
                    let lattice = store.lattice(*lattice)?;
                    for index in lattice.natural_indices() {
                        let child = lattice.get_universe(&index).ok_or_else(|| {
                            ModelError::LatticeIndex {
                                lattice: lattice.id,
                                index: index.to_string(),
                            }
                        })?;
                        let prefix = format!("{cell_path}->l{}({index})->", lattice.id);
                        self.visit_universe(store, child, &prefix, descent, map)?;
                    }
                }
                Fill::Material(material) => {
                    self.record_material(store, map, *material, &cell_path)?;
                }
                Fill::Distributed(list) => {
                    let instance = map.cell_count(cell);
                    let entry = list.get(instance).ok_or(ModelError::DistribmatExhausted {
                        cell: data.id,
                        instance,
                        len: list.len(),
                    })?;
                    if let Some(material) = entry {
                        self.record_material(store, map, *material, &cell_path)?;
                    }
                }
                Fill::Void => {}
            }
            map.record_cell(cell, (!self.instances_only).then_some(cell_path));
        }
        Ok(())
    }

    fn record_material(
        &self,
        store: &GeometryStore,
        map: &mut InstanceMap,
        material: MaterialId,
        cell_path: &str,
    ) -> Result<()> {
        let id = store.material(material)?.id;
        let path = (!self.instances_only).then(|| format!("{cell_path}->m{id}"));
        map.record_material(material, path);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::CsgError;
    use crate::model::{CellData, CellId, LatticeData, MaterialData, UniverseData};

    struct PinLattice {
        store: GeometryStore,
        root: UniverseId,
        holder: CellId,
        pin: CellId,
        fuel: MaterialId,
    }

    /// Root holds a 2x2 lattice whose four slots all reference one pin
    /// universe with a single fuel cell.
    fn pin_lattice() -> PinLattice {
        let mut store = GeometryStore::new();
        let fuel = store.insert_material(MaterialData::new(None));
        let pin = store.insert_cell(CellData::new(None).with_fill(Fill::Material(fuel)));
        let w = store.insert_universe(UniverseData::csg(None));
        store.add_cell(w, pin).unwrap();
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [-1.0, -1.0], vec![vec![w; 2]; 2]).unwrap(),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, holder).unwrap();
        PinLattice {
            store,
            root,
            holder,
            pin,
            fuel,
        }
    }

    #[test]
    fn shared_universe_counts_every_slot() {
        let m = pin_lattice();
        let map = DeterminePaths::new(m.root).execute(&m.store).unwrap();

        let fuel = map.material(m.fuel).unwrap();
        assert_eq!(fuel.count, 4);
        assert_eq!(fuel.paths.len(), 4);
        let distinct: HashSet<_> = fuel.paths.iter().collect();
        assert_eq!(distinct.len(), 4);

        assert_eq!(map.cell(m.pin).unwrap().count, 4);
        assert_eq!(map.cell(m.holder).unwrap().count, 1);
    }

    #[test]
    fn paths_name_every_level() {
        let m = pin_lattice();
        let map = DeterminePaths::new(m.root).execute(&m.store).unwrap();
        let s = &m.store;
        let root = s.universe(m.root).unwrap().id;
        let holder = s.cell(m.holder).unwrap();
        let Fill::Lattice(lattice) = holder.fill else {
            panic!("holder is lattice filled");
        };
        let lattice = s.lattice(lattice).unwrap();
        let w = s.universe(lattice.universes()[0]).unwrap().id;
        let pin = s.cell(m.pin).unwrap().id;
        let fuel = s.material(m.fuel).unwrap().id;

        let expected: Vec<String> = ["0,0", "1,0", "0,1", "1,1"]
            .iter()
            .map(|idx| {
                format!(
                    "u{root}->c{}->l{}({idx})->u{w}->c{pin}->m{fuel}",
                    holder.id, lattice.id
                )
            })
            .collect();
        assert_eq!(map.material(m.fuel).unwrap().paths, expected);
        assert_eq!(
            map.cell(m.holder).unwrap().paths,
            [format!("u{root}->c{}", holder.id)]
        );
    }

    #[test]
    fn instances_only_skips_paths() {
        let m = pin_lattice();
        let map = DeterminePaths::new(m.root)
            .instances_only(true)
            .execute(&m.store)
            .unwrap();
        let fuel = map.material(m.fuel).unwrap();
        assert_eq!(fuel.count, 4);
        assert!(fuel.paths.is_empty());
    }

    fn distributed(len: usize) -> (GeometryStore, UniverseId, CellId, Vec<MaterialId>) {
        let mut store = GeometryStore::new();
        let materials: Vec<_> = (0..3)
            .map(|_| store.insert_material(MaterialData::new(None)))
            .collect();
        let fill = Fill::Distributed(materials.iter().take(len).copied().map(Some).collect());
        let cell = store.insert_cell(CellData::new(None).with_fill(fill));
        let w = store.insert_universe(UniverseData::csg(None));
        store.add_cell(w, cell).unwrap();
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![w; 3]]).unwrap(),
        );
        let holder = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        let root = store.insert_universe(UniverseData::csg(None));
        store.add_cell(root, holder).unwrap();
        (store, root, cell, materials)
    }

    #[test]
    fn distributed_fill_follows_traversal_order() {
        let (store, root, cell, materials) = distributed(3);
        let map = DeterminePaths::new(root).execute(&store).unwrap();
        let cell_paths = &map.cell(cell).unwrap().paths;
        for (k, material) in materials.iter().enumerate() {
            let instances = map.material(*material).unwrap();
            assert_eq!(instances.count, 1);
            assert!(instances.paths[0].starts_with(&cell_paths[k]));
        }
    }

    #[test]
    fn short_distributed_fill_is_an_error() {
        let (store, root, _, _) = distributed(2);
        let err = DeterminePaths::new(root).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            CsgError::Model(ModelError::DistribmatExhausted {
                instance: 2,
                len: 2,
                ..
            })
        ));
    }

    #[test]
    fn apply_requires_reset_accumulators() {
        let mut m = pin_lattice();
        let map = DeterminePaths::new(m.root).execute(&m.store).unwrap();
        map.apply(&mut m.store).unwrap();
        assert_eq!(m.store.material(m.fuel).unwrap().num_instances, 4);
        assert_eq!(m.store.cell(m.pin).unwrap().paths.len(), 4);

        assert!(map.apply(&mut m.store).is_err());
        m.store.reset_instances();
        map.apply(&mut m.store).unwrap();
        assert_eq!(m.store.cell(m.pin).unwrap().num_instances, 4);
    }

    #[test]
    fn paths_use_the_current_cell_id() {
        let mut m = pin_lattice();
        m.store.cell_mut(m.pin).unwrap().id = 4321;
        let map = DeterminePaths::new(m.root).execute(&m.store).unwrap();
        for path in &map.cell(m.pin).unwrap().paths {
            assert!(path.ends_with("->c4321"), "{path}");
        }
    }

    #[test]
    fn cyclic_fill_is_an_error() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![u]]).unwrap(),
        );
        let c = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        store.add_cell(u, c).unwrap();
        let err = DeterminePaths::new(u).execute(&store).unwrap_err();
        assert!(matches!(err, CsgError::Model(ModelError::CyclicGeometry(_))));
    }

    #[test]
    fn enumeration_is_repeatable() {
        let m = pin_lattice();
        let first = DeterminePaths::new(m.root).execute(&m.store).unwrap();
        let second = DeterminePaths::new(m.root).execute(&m.store).unwrap();
        assert_eq!(first.material(m.fuel), second.material(m.fuel));
    }
}
