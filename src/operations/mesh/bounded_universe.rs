use crate::error::Result;
use crate::geometry::BoundaryType;
use crate::io::MeshFileReader;
use crate::model::{CellData, Fill, GeometryStore, UniverseData, UniverseId};

use super::{BoundedType, BoundingRegion};

/// Wraps a mesh-backed universe in a new CSG universe with a single cell,
/// filled by the mesh universe and bounded by a [`BoundingRegion`].
pub struct BoundedUniverse {
    universe: UniverseId,
    bounding_cell_id: u32,
    region: BoundingRegion,
}

impl BoundedUniverse {
    /// Creates the operation with bounding cell ID 10000 and a vacuum box.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self {
            universe,
            bounding_cell_id: 10000,
            region: BoundingRegion::new(universe),
        }
    }

    /// Sets the ID of the bounding cell.
    #[must_use]
    pub fn bounding_cell_id(mut self, id: u32) -> Self {
        self.bounding_cell_id = id;
        self
    }

    /// Sets the shape of the bounding region.
    #[must_use]
    pub fn bounded_type(mut self, bounded_type: BoundedType) -> Self {
        self.region = self.region.bounded_type(bounded_type);
        self
    }

    /// Sets the boundary condition of the bounding surfaces.
    #[must_use]
    pub fn boundary_type(mut self, boundary_type: BoundaryType) -> Self {
        self.region = self.region.boundary_type(boundary_type);
        self
    }

    /// Sets the ID of the first bounding surface.
    #[must_use]
    pub fn starting_id(mut self, starting_id: u32) -> Self {
        self.region = self.region.starting_id(starting_id);
        self
    }

    /// Executes the construction and returns the new universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not mesh-backed or its file
    /// cannot be read.
    pub fn execute(
        &self,
        store: &mut GeometryStore,
        reader: &dyn MeshFileReader,
    ) -> Result<UniverseId> {
        let region = self.region.execute(store, reader)?;
        let cell = store.insert_cell(
            CellData::new(Some(self.bounding_cell_id))
                .with_fill(Fill::Universe(self.universe))
                .with_region(region),
        );
        let bounded = store.insert_universe(UniverseData::csg(None));
        store.add_cell(bounded, cell)?;
        Ok(bounded)
    }
}
