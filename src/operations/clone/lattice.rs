use crate::error::Result;
use crate::ids::{self, IdSpace};
use crate::model::{GeometryStore, LatticeId};

use super::universe::clone_universe;
use super::{CloneMemo, CloneOptions};

/// Copies a lattice and the universes in its elements.
///
/// A universe repeated across elements is copied once, so the copy repeats
/// it the same way. The outer universe is copied too.
pub struct CloneLattice {
    lattice: LatticeId,
    options: CloneOptions,
}

impl CloneLattice {
    /// Creates a new `CloneLattice` operation.
    #[must_use]
    pub fn new(lattice: LatticeId) -> Self {
        Self {
            lattice,
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
    pub fn execute(&self, store: &mut GeometryStore) -> Result<LatticeId> {
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
    ) -> Result<LatticeId> {
        clone_lattice(store, self.lattice, self.options, memo)
    }
}

pub(super) fn clone_lattice(
    store: &mut GeometryStore,
    lattice: LatticeId,
    options: CloneOptions,
    memo: &mut CloneMemo,
) -> Result<LatticeId> {
    if let Some(copy) = memo.lattice(lattice) {
        return Ok(copy);
    }
    let mut copy = store.lattice(lattice)?.clone();
    copy.id = ids::allocate(IdSpace::Lattice);
    for slot in copy.universes_mut() {
        *slot = clone_universe(store, *slot, options, memo)?;
    }
    if let Some(outer) = copy.outer {
        copy.outer = Some(clone_universe(store, outer, options, memo)?);
    }
    let key = store.insert_lattice(copy);
    memo.lattices.insert(lattice, key);
    Ok(key)
}
