use crate::error::{IoError, Result};
use crate::geometry::Aabb;
use crate::io::MeshFileReader;
use crate::model::{GeometryStore, UniverseId, UniverseKind};
use crate::operations::mesh::MeshBoundingBox;

/// Computes the axis-aligned bounding box of a universe.
///
/// For a CSG universe this is the union of its cells' region bounds, or an
/// infinite box when no cell has a region. Mesh-backed universes need a
/// [`MeshFileReader`] and take their bounds from the node coordinates.
pub struct BoundingBox<'a> {
    universe: UniverseId,
    reader: Option<&'a dyn MeshFileReader>,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self {
            universe,
            reader: None,
        }
    }

    /// Supplies the reader used for mesh-backed universes.
    #[must_use]
    pub fn with_reader(mut self, reader: &'a dyn MeshFileReader) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity is missing, or for a mesh-backed
    /// universe if no reader was supplied or the file cannot be read.
    pub fn execute(&self, store: &GeometryStore) -> Result<Aabb> {
        let universe = store.universe(self.universe)?;
        match &universe.kind {
            UniverseKind::Csg { cells } => {
                let mut bounds: Option<Aabb> = None;
                for cell_id in cells.values() {
                    if let Some(region) = &store.cell(cell_id)?.region {
                        let b = region.bounding_box(store)?;
                        bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
                    }
                }
                Ok(bounds.unwrap_or_else(Aabb::infinite))
            }
            UniverseKind::Mesh(mesh) => {
                let reader = self.reader.ok_or_else(|| IoError::MeshFile {
                    path: mesh.filename().to_path_buf(),
                    reason: "no mesh reader supplied".into(),
                })?;
                MeshBoundingBox::new(self.universe).execute(store, reader)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Quadric;
    use crate::io::{MemoryMeshReader, MeshFileContents};
    use crate::math::Point3;
    use crate::model::{CellData, MeshUniverse, Region, SurfaceData, UniverseData};

    #[test]
    fn union_of_cell_regions() {
        let mut store = GeometryStore::new();
        let s1 = store.insert_surface(SurfaceData::new(
            None,
            Quadric::Sphere {
                center: Point3::origin(),
                r: 1.0,
            },
        ));
        let s2 = store.insert_surface(SurfaceData::new(
            None,
            Quadric::Sphere {
                center: Point3::new(3.0, 0.0, 0.0),
                r: 1.0,
            },
        ));
        let a = store.insert_cell(CellData::new(None).with_region(Region::below(s1)));
        let b = store.insert_cell(CellData::new(None).with_region(Region::below(s2)));
        let u = store.insert_universe(UniverseData::csg(None));
        store.add_cells(u, [a, b]).unwrap();

        let bounds = BoundingBox::new(u).execute(&store).unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Point3::new(4.0, 1.0, 1.0));
    }

    #[test]
    fn cells_without_regions_give_infinite_bounds() {
        let mut store = GeometryStore::new();
        let c = store.insert_cell(CellData::new(None));
        let u = store.insert_universe(UniverseData::csg(None));
        store.add_cell(u, c).unwrap();
        assert!(!BoundingBox::new(u).execute(&store).unwrap().is_finite());
    }

    #[test]
    fn mesh_bounds_need_a_reader() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::mesh(
            None,
            MeshUniverse::new("part.h5m").unwrap(),
        ));
        assert!(BoundingBox::new(u).execute(&store).is_err());

        let mut reader = MemoryMeshReader::new();
        reader.insert(
            "part.h5m",
            MeshFileContents::new(vec![Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, -1.0, 5.0)]),
        );
        let bounds = BoundingBox::new(u).with_reader(&reader).execute(&store).unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, -1.0, 2.0));
        assert_eq!(bounds.max, Point3::new(3.0, 1.0, 5.0));
    }
}
