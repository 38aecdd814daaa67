use slotmap::SecondaryMap;

use crate::model::{CellId, LatticeId, MaterialId, SurfaceId, UniverseId};

/// Originals mapped to their copies, one table per entity kind.
///
/// Keyed by store key, so two entities with equal contents are still
/// copied separately.
#[derive(Debug, Clone, Default)]
pub struct CloneMemo {
    pub(super) universes: SecondaryMap<UniverseId, UniverseId>,
    pub(super) cells: SecondaryMap<CellId, CellId>,
    pub(super) lattices: SecondaryMap<LatticeId, LatticeId>,
    pub(super) materials: SecondaryMap<MaterialId, MaterialId>,
    pub(super) surfaces: SecondaryMap<SurfaceId, SurfaceId>,
}

impl CloneMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The copy made of `original`, if any.
    #[must_use]
    pub fn universe(&self, original: UniverseId) -> Option<UniverseId> {
        self.universes.get(original).copied()
    }

    /// The copy made of `original`, if any.
    #[must_use]
    pub fn cell(&self, original: CellId) -> Option<CellId> {
        self.cells.get(original).copied()
    }

    /// The copy made of `original`, if any.
    #[must_use]
    pub fn lattice(&self, original: LatticeId) -> Option<LatticeId> {
        self.lattices.get(original).copied()
    }

    /// The copy made of `original`, if any.
    #[must_use]
    pub fn material(&self, original: MaterialId) -> Option<MaterialId> {
        self.materials.get(original).copied()
    }

    /// The copy made of `original`, if any.
    #[must_use]
    pub fn surface(&self, original: SurfaceId) -> Option<SurfaceId> {
        self.surfaces.get(original).copied()
    }
}
