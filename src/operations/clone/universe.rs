use crate::error::Result;
use crate::model::{CellId, GeometryStore, UniverseData, UniverseId, UniverseKind};

use super::cell::clone_cell;
use super::{CloneMemo, CloneOptions};

/// Copies a universe and every cell below it.
///
/// The copy gets a fresh ID and keeps the name, the volume and, for a
/// mesh-backed universe, the file reference and renumbering flags. Cells
/// are copied in insertion order. The copy is recorded in the memo before
/// its cells are visited, so a universe reached again while copying its own
/// content resolves to the same copy.
pub struct CloneUniverse {
    universe: UniverseId,
    options: CloneOptions,
}

impl CloneUniverse {
    /// Creates a new `CloneUniverse` operation.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self {
            universe,
            options: CloneOptions::default(),
        }
    }

    /// Whether material fills are copied. Defaults to `true`.
    #[must_use]
    pub fn clone_materials(mut self, clone_materials: bool) -> Self {
        self.options.clone_materials = clone_materials;
        self
    }

    /// Whether region surfaces are copied. Defaults to `true`.
    #[must_use]
    pub fn clone_regions(mut self, clone_regions: bool) -> Self {
        self.options.clone_regions = clone_regions;
        self
    }

    /// Executes the clone with a fresh memo.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn execute(&self, store: &mut GeometryStore) -> Result<UniverseId> {
        self.execute_with_memo(store, &mut CloneMemo::new())
    }

    /// Executes the clone, sharing copies already recorded in `memo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn execute_with_memo(
        &self,
        store: &mut GeometryStore,
        memo: &mut CloneMemo,
    ) -> Result<UniverseId> {
        tracing::debug!(options = ?self.options, "cloning universe");
        clone_universe(store, self.universe, self.options, memo)
    }
}

pub(super) fn clone_universe(
    store: &mut GeometryStore,
    universe: UniverseId,
    options: CloneOptions,
    memo: &mut CloneMemo,
) -> Result<UniverseId> {
    if let Some(copy) = memo.universe(universe) {
        return Ok(copy);
    }
    let original = store.universe(universe)?;
    let mut skeleton = match &original.kind {
        UniverseKind::Csg { .. } => UniverseData::csg(None),
        UniverseKind::Mesh(mesh) => UniverseData::mesh(None, mesh.clone()),
    }
    .with_name(original.name());
    skeleton.set_volume(original.volume())?;
    let cells: Vec<CellId> = original
        .cells()
        .map(|cells| cells.values().collect())
        .unwrap_or_default();

    let key = store.insert_universe(skeleton);
    memo.universes.insert(universe, key);
    for cell in cells {
        let copy = clone_cell(store, cell, options, memo)?;
        store.add_cell(key, copy)?;
    }
    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CellData, Fill, MeshUniverse};

    #[test]
    fn shared_child_is_cloned_once() {
        let mut store = GeometryStore::new();
        let v = store.insert_universe(UniverseData::csg(None));
        let leaf = store.insert_cell(CellData::new(None));
        store.add_cell(v, leaf).unwrap();

        let a = store.insert_cell(CellData::new(None).with_fill(Fill::Universe(v)));
        let b = store.insert_cell(CellData::new(None).with_fill(Fill::Universe(v)));
        let u = store.insert_universe(UniverseData::csg(None).with_name("core"));
        store.add_cells(u, [a, b]).unwrap();

        let copy = CloneUniverse::new(u).execute(&mut store).unwrap();
        let data = store.universe(copy).unwrap();
        assert_ne!(data.id, store.universe(u).unwrap().id);
        assert_eq!(data.name(), "core");

        let fills: Vec<Fill> = data
            .cells()
            .unwrap()
            .values()
            .map(|c| store.cell(c).unwrap().fill.clone())
            .collect();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0], fills[1]);
        assert_ne!(fills[0], Fill::Universe(v));
    }

    #[test]
    fn memo_is_shared_between_calls() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        let mut memo = CloneMemo::new();
        let first = CloneUniverse::new(u)
            .execute_with_memo(&mut store, &mut memo)
            .unwrap();
        let second = CloneUniverse::new(u)
            .execute_with_memo(&mut store, &mut memo)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(memo.universe(u), Some(first));
    }

    #[test]
    fn mesh_clone_keeps_file_and_flags() {
        let mut store = GeometryStore::new();
        let mut mesh = MeshUniverse::new("model.h5m").unwrap();
        mesh.set_auto_geom_ids(true);
        let mut data = UniverseData::mesh(None, mesh.clone()).with_name("dag");
        data.set_volume(Some(12.0)).unwrap();
        let u = store.insert_universe(data);

        let copy = CloneUniverse::new(u).execute(&mut store).unwrap();
        let cloned = store.universe(copy).unwrap();
        assert_eq!(cloned.as_mesh(), Some(&mesh));
        assert_eq!(cloned.name(), "dag");
        assert_eq!(cloned.volume(), Some(12.0));
        assert_ne!(cloned.id, store.universe(u).unwrap().id);
    }
}
