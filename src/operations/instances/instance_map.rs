use slotmap::{Key, SecondaryMap};

use crate::error::{ModelError, Result};
use crate::model::{CellId, GeometryStore, MaterialId};

/// Occurrences of one cell or material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instances {
    /// Number of occurrences.
    pub count: usize,
    /// One path per occurrence, empty in instances-only mode.
    pub paths: Vec<String>,
}

/// Result of an instance enumeration, keyed by store key.
#[derive(Debug, Clone, Default)]
pub struct InstanceMap {
    cells: SecondaryMap<CellId, Instances>,
    materials: SecondaryMap<MaterialId, Instances>,
}

impl InstanceMap {
    /// Occurrences of `cell`, `None` if it was never reached.
    #[must_use]
    pub fn cell(&self, cell: CellId) -> Option<&Instances> {
        self.cells.get(cell)
    }

    /// Occurrences of `material`, `None` if it was never reached.
    #[must_use]
    pub fn material(&self, material: MaterialId) -> Option<&Instances> {
        self.materials.get(material)
    }

    /// Every reached cell with its occurrences.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Instances)> {
        self.cells.iter()
    }

    /// Every reached material with its occurrences.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Instances)> {
        self.materials.iter()
    }

    pub(super) fn cell_count(&self, cell: CellId) -> usize {
        self.cells.get(cell).map_or(0, |i| i.count)
    }

    pub(super) fn record_cell(&mut self, cell: CellId, path: Option<String>) {
        record(&mut self.cells, cell, path);
    }

    pub(super) fn record_material(&mut self, material: MaterialId, path: Option<String>) {
        record(&mut self.materials, material, path);
    }

    /// Writes the counts and paths into the `num_instances` and `paths`
    /// fields of the cells and materials.
    ///
    /// Every target must have been reset first (see
    /// [`GeometryStore::reset_instances`]); nothing is written otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity is missing from the store or still
    /// carries counts from an earlier enumeration.
    pub fn apply(&self, store: &mut GeometryStore) -> Result<()> {
        for cell in self.cells.keys() {
            let data = store.cell(cell)?;
            if data.num_instances != 0 || !data.paths.is_empty() {
                return Err(ModelError::AccumulatorsNotReset(format!("cell {}", data.id)).into());
            }
        }
        for material in self.materials.keys() {
            let data = store.material(material)?;
            if data.num_instances != 0 || !data.paths.is_empty() {
                return Err(
                    ModelError::AccumulatorsNotReset(format!("material {}", data.id)).into(),
                );
            }
        }

        for (cell, instances) in &self.cells {
            let data = store.cell_mut(cell)?;
            data.num_instances = instances.count;
            data.paths.clone_from(&instances.paths);
        }
        for (material, instances) in &self.materials {
            let data = store.material_mut(material)?;
            data.num_instances = instances.count;
            data.paths.clone_from(&instances.paths);
        }
        Ok(())
    }
}

fn record<K: Key>(map: &mut SecondaryMap<K, Instances>, key: K, path: Option<String>) {
    if let Some(entry) = map.entry(key) {
        let instances = entry.or_default();
        instances.count += 1;
        instances.paths.extend(path);
    }
}
