use crate::error::{IoError, Result};
use crate::geometry::Aabb;
use crate::io::MeshFileReader;
use crate::model::{GeometryStore, UniverseId};

use super::mesh_of;

/// Bounding box of a mesh-backed universe, taken from the extremes of the
/// file's node coordinates.
pub struct MeshBoundingBox {
    universe: UniverseId,
}

impl MeshBoundingBox {
    /// Creates a new `MeshBoundingBox` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not mesh-backed, or the file
    /// cannot be read or holds no nodes.
    pub fn execute(&self, store: &GeometryStore, reader: &dyn MeshFileReader) -> Result<Aabb> {
        let mesh = mesh_of(store, self.universe)?;
        let path = mesh.filename();
        let nodes = reader.node_coordinates(path)?;
        Aabb::from_points(&nodes).ok_or_else(|| {
            IoError::MeshFile {
                path: path.to_path_buf(),
                reason: "node coordinate dataset is empty".into(),
            }
            .into()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::{MemoryMeshReader, MeshFileContents};
    use crate::math::Point3;
    use crate::model::{MeshUniverse, UniverseData};

    #[test]
    fn empty_node_set_is_an_error() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::mesh(
            None,
            MeshUniverse::new("empty.h5m").unwrap(),
        ));
        let mut reader = MemoryMeshReader::new();
        reader.insert("empty.h5m", MeshFileContents::default());
        assert!(MeshBoundingBox::new(u).execute(&store, &reader).is_err());
    }

    #[test]
    fn reflects_current_file_contents() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::mesh(
            None,
            MeshUniverse::new("part.h5m").unwrap(),
        ));
        let mut reader = MemoryMeshReader::new();
        reader.insert("part.h5m", MeshFileContents::new(vec![Point3::origin()]));
        let before = MeshBoundingBox::new(u).execute(&store, &reader).unwrap();
        assert_eq!(before.max, Point3::origin());

        reader.insert(
            "part.h5m",
            MeshFileContents::new(vec![Point3::origin(), Point3::new(2.0, 2.0, 2.0)]),
        );
        let after = MeshBoundingBox::new(u).execute(&store, &reader).unwrap();
        assert_eq!(after.max, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn csg_universes_are_rejected() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        assert!(MeshBoundingBox::new(u)
            .execute(&store, &MemoryMeshReader::new())
            .is_err());
    }
}
