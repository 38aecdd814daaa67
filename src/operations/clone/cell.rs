use crate::error::Result;
use crate::model::{CellData, CellId, Fill, GeometryStore};

use super::lattice::clone_lattice;
use super::leaf::{clone_material, clone_region};
use super::universe::clone_universe;
use super::{CloneMemo, CloneOptions};

/// Copies a cell together with everything it references.
///
/// Universe and lattice fills are always copied. Material fills and the
/// surfaces of the region are copied or shared depending on the options.
/// Translation, rotation and volume carry over; instance counts start at
/// zero.
pub struct CloneCell {
    cell: CellId,
    options: CloneOptions,
}

impl CloneCell {
    /// Creates a new `CloneCell` operation.
    #[must_use]
    pub fn new(cell: CellId) -> Self {
        Self {
            cell,
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
    pub fn execute(&self, store: &mut GeometryStore) -> Result<CellId> {
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
    ) -> Result<CellId> {
        clone_cell(store, self.cell, self.options, memo)
    }
}

pub(super) fn clone_cell(
    store: &mut GeometryStore,
    cell: CellId,
    options: CloneOptions,
    memo: &mut CloneMemo,
) -> Result<CellId> {
    if let Some(copy) = memo.cell(cell) {
        return Ok(copy);
    }
    let original = store.cell(cell)?.clone();

    let region = match &original.region {
        Some(region) if options.clone_regions => Some(clone_region(store, region, memo)?),
        region => region.clone(),
    };

    let fill = match &original.fill {
        Fill::Material(m) if options.clone_materials => {
            Fill::Material(clone_material(store, *m, memo)?)
        }
        Fill::Distributed(list) if options.clone_materials => Fill::Distributed(
            list.iter()
                .map(|m| m.map(|m| clone_material(store, m, memo)).transpose())
                .collect::<Result<_>>()?,
        ),
        Fill::Universe(u) => Fill::Universe(clone_universe(store, *u, options, memo)?),
        Fill::Lattice(l) => Fill::Lattice(clone_lattice(store, *l, options, memo)?),
        fill => fill.clone(),
    };

    let mut copy = CellData::new(None)
        .with_name(original.name)
        .with_fill(fill);
    copy.region = region;
    copy.translation = original.translation;
    copy.rotation = original.rotation;
    copy.volume = original.volume;

    let key = store.insert_cell(copy);
    memo.cells.insert(cell, key);
    Ok(key)
}
