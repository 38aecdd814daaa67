pub mod cell;
pub mod id_map;
pub mod lattice;
pub mod material;
pub mod region;
pub mod surface;
pub mod universe;

pub use cell::{CellData, CellId, Fill, FillType, Rotation};
pub use id_map::IdMap;
pub use lattice::{LatticeData, LatticeId, LatticeIndex};
pub use material::{MaterialData, MaterialId};
pub use region::Region;
pub use surface::{SurfaceData, SurfaceId};
pub use universe::{CellMap, Measurement, MeshUniverse, UniverseData, UniverseId, UniverseKind};

use slotmap::SlotMap;

use crate::error::{ModelError, Result};
use crate::ids::{self, IdSpace};

/// Central arena that owns every geometry entity.
///
/// Entities reference each other via typed keys (generational indices), so a
/// universe or material shared by several parents is one entry referenced
/// many times. Key equality is object identity; the user-facing `id` fields
/// are labels and may collide.
#[derive(Debug, Default)]
pub struct GeometryStore {
    surfaces: SlotMap<SurfaceId, SurfaceData>,
    materials: SlotMap<MaterialId, MaterialData>,
    cells: SlotMap<CellId, CellData>,
    lattices: SlotMap<LatticeId, LatticeData>,
    universes: SlotMap<UniverseId, UniverseData>,
}

impl GeometryStore {
    /// Creates a new, empty geometry store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Surface operations ---

    /// Inserts a surface and returns its key.
    pub fn insert_surface(&mut self, data: SurfaceData) -> SurfaceId {
        self.surfaces.insert(data)
    }

    /// Returns a reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, id: SurfaceId) -> Result<&SurfaceData> {
        self.surfaces
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("surface".into()).into())
    }

    /// Returns a mutable reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut SurfaceData> {
        self.surfaces
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("surface".into()).into())
    }

    /// Iterates over all surfaces.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &SurfaceData)> {
        self.surfaces.iter()
    }

    // --- Material operations ---

    /// Inserts a material and returns its key.
    pub fn insert_material(&mut self, data: MaterialData) -> MaterialId {
        self.materials.insert(data)
    }

    /// Returns a reference to the material data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material(&self, id: MaterialId) -> Result<&MaterialData> {
        self.materials
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("material".into()).into())
    }

    /// Returns a mutable reference to the material data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut MaterialData> {
        self.materials
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("material".into()).into())
    }

    // --- Cell operations ---

    /// Inserts a cell and returns its key.
    pub fn insert_cell(&mut self, data: CellData) -> CellId {
        self.cells.insert(data)
    }

    /// Returns a reference to the cell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell(&self, id: CellId) -> Result<&CellData> {
        self.cells
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("cell".into()).into())
    }

    /// Returns a mutable reference to the cell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut CellData> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("cell".into()).into())
    }

    // --- Lattice operations ---

    /// Inserts a lattice and returns its key.
    pub fn insert_lattice(&mut self, data: LatticeData) -> LatticeId {
        self.lattices.insert(data)
    }

    /// Returns a reference to the lattice data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn lattice(&self, id: LatticeId) -> Result<&LatticeData> {
        self.lattices
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("lattice".into()).into())
    }

    /// Returns a mutable reference to the lattice data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn lattice_mut(&mut self, id: LatticeId) -> Result<&mut LatticeData> {
        self.lattices
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("lattice".into()).into())
    }

    // --- Universe operations ---

    /// Inserts a universe and returns its key.
    pub fn insert_universe(&mut self, data: UniverseData) -> UniverseId {
        self.universes.insert(data)
    }

    /// Returns a reference to the universe data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn universe(&self, id: UniverseId) -> Result<&UniverseData> {
        self.universes
            .get(id)
            .ok_or_else(|| ModelError::EntityNotFound("universe".into()).into())
    }

    /// Returns a mutable reference to the universe data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn universe_mut(&mut self, id: UniverseId) -> Result<&mut UniverseData> {
        self.universes
            .get_mut(id)
            .ok_or_else(|| ModelError::EntityNotFound("universe".into()).into())
    }

    /// Removes a universe from the store and releases its user-facing ID.
    ///
    /// Cells and lattices that still reference it are left dangling.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_universe(&mut self, id: UniverseId) -> Result<UniverseData> {
        let data = self
            .universes
            .remove(id)
            .ok_or_else(|| ModelError::EntityNotFound("universe".into()))?;
        ids::release(IdSpace::Universe, data.id);
        Ok(data)
    }

    // --- Universe membership ---

    fn csg_cells_mut(&mut self, universe: UniverseId) -> Result<&mut CellMap> {
        let data = self.universe_mut(universe)?;
        let id = data.id;
        match &mut data.kind {
            UniverseKind::Csg { cells } => Ok(cells),
            UniverseKind::Mesh(_) => Err(ModelError::NotCsg(id).into()),
        }
    }

    /// Adds `cell` to a CSG universe.
    ///
    /// Adding a cell whose user-facing ID is already present is a no-op; the
    /// original entry stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the universe is
    /// mesh-backed.
    pub fn add_cell(&mut self, universe: UniverseId, cell: CellId) -> Result<()> {
        let cell_id = self.cell(cell)?.id;
        self.csg_cells_mut(universe)?.insert(cell_id, cell);
        Ok(())
    }

    /// Adds several cells to a CSG universe, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any entity is missing or the universe is
    /// mesh-backed.
    pub fn add_cells<I>(&mut self, universe: UniverseId, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = CellId>,
    {
        for cell in cells {
            self.add_cell(universe, cell)?;
        }
        Ok(())
    }

    /// Removes the entry with `cell`'s user-facing ID from a CSG universe.
    /// Removing a cell that is not present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the universe is
    /// mesh-backed.
    pub fn remove_cell(&mut self, universe: UniverseId, cell: CellId) -> Result<()> {
        let cell_id = self.cell(cell)?.id;
        self.csg_cells_mut(universe)?.remove(cell_id);
        Ok(())
    }

    /// Removes every cell from a CSG universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is missing or mesh-backed.
    pub fn clear_cells(&mut self, universe: UniverseId) -> Result<()> {
        self.csg_cells_mut(universe)?.clear();
        Ok(())
    }

    /// Zeroes the instance accumulators of every cell and material.
    pub fn reset_instances(&mut self) {
        for (_, cell) in &mut self.cells {
            cell.num_instances = 0;
            cell.paths.clear();
        }
        for (_, material) in &mut self.materials {
            material.num_instances = 0;
            material.paths.clear();
        }
    }
}
