use crate::error::Result;
use crate::model::{GeometryStore, MaterialData, MaterialId, Region, SurfaceData, SurfaceId};

use super::CloneMemo;

/// Copies a material under a fresh ID.
pub struct CloneMaterial {
    material: MaterialId,
}

impl CloneMaterial {
    /// Creates a new `CloneMaterial` operation.
    #[must_use]
    pub fn new(material: MaterialId) -> Self {
        Self { material }
    }

    /// Executes the clone, reusing an earlier copy recorded in `memo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is missing from the store.
    pub fn execute(&self, store: &mut GeometryStore, memo: &mut CloneMemo) -> Result<MaterialId> {
        clone_material(store, self.material, memo)
    }
}

pub(super) fn clone_material(
    store: &mut GeometryStore,
    material: MaterialId,
    memo: &mut CloneMemo,
) -> Result<MaterialId> {
    if let Some(copy) = memo.material(material) {
        return Ok(copy);
    }
    let original = store.material(material)?;
    let mut copy = MaterialData::new(None).with_name(original.name.clone());
    copy.nuclides.clone_from(&original.nuclides);
    let key = store.insert_material(copy);
    memo.materials.insert(material, key);
    Ok(key)
}

/// Copies a surface under a fresh ID, keeping its boundary condition.
pub struct CloneSurface {
    surface: SurfaceId,
}

impl CloneSurface {
    /// Creates a new `CloneSurface` operation.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the clone, reusing an earlier copy recorded in `memo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is missing from the store.
    pub fn execute(&self, store: &mut GeometryStore, memo: &mut CloneMemo) -> Result<SurfaceId> {
        clone_surface(store, self.surface, memo)
    }
}

pub(super) fn clone_surface(
    store: &mut GeometryStore,
    surface: SurfaceId,
    memo: &mut CloneMemo,
) -> Result<SurfaceId> {
    if let Some(copy) = memo.surface(surface) {
        return Ok(copy);
    }
    let original = store.surface(surface)?;
    let mut copy =
        SurfaceData::new(None, original.quadric.clone()).with_boundary(original.boundary);
    copy.name.clone_from(&original.name);
    let key = store.insert_surface(copy);
    memo.surfaces.insert(surface, key);
    Ok(key)
}

/// Rebuilds `region` over copies of its surfaces.
pub(super) fn clone_region(
    store: &mut GeometryStore,
    region: &Region,
    memo: &mut CloneMemo,
) -> Result<Region> {
    region.try_map_surfaces(&mut |surface| clone_surface(store, surface, memo))
}
