//! Queries and constructions specific to mesh-backed universes.
//!
//! Everything here reads the mesh file through a [`MeshFileReader`] on every
//! call. Nothing is cached on the universe.
//!
//! [`MeshFileReader`]: crate::io::MeshFileReader

mod bounded_universe;
mod bounding_box;
mod bounding_region;
mod tags;

pub use bounded_universe::BoundedUniverse;
pub use bounding_box::MeshBoundingBox;
pub use bounding_region::{BoundedType, BoundingRegion, DEFAULT_STARTING_ID};
pub use tags::{GeomElementCount, GeomType, MaterialNames};

use crate::error::{ModelError, Result};
use crate::model::{GeometryStore, MeshUniverse, UniverseId};

fn mesh_of(store: &GeometryStore, universe: UniverseId) -> Result<&MeshUniverse> {
    let data = store.universe(universe)?;
    data.as_mesh()
        .ok_or_else(|| ModelError::NotMesh(data.id).into())
}
