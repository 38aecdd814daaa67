use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValidationError};
use crate::geometry::{BoundaryType, Quadric};
use crate::io::MeshFileReader;
use crate::model::{GeometryStore, Region, SurfaceData, SurfaceId, UniverseId};

use super::MeshBoundingBox;

/// First surface ID used for bounding surfaces, high enough to stay clear of
/// the IDs inside typical mesh files.
pub const DEFAULT_STARTING_ID: u32 = 10000;

/// Shape of a bounding region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundedType {
    /// Six axis-aligned planes.
    #[default]
    Box,
    /// One sphere around the bounding box.
    Sphere,
}

impl BoundedType {
    const NAMES: &'static [&'static str] = &["box", "sphere"];
}

impl fmt::Display for BoundedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
        })
    }
}

impl FromStr for BoundedType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "sphere" => Ok(Self::Sphere),
            other => Err(ValidationError::UnknownOption {
                parameter: "bounded type",
                value: other.to_owned(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Builds a region enclosing a mesh-backed universe.
///
/// A box region is `+x0 -x1 +y0 -y1 +z0 -z1` over six planes at the faces
/// of the bounding box, numbered `starting_id` to `starting_id + 5` in that
/// order. A sphere region is the inside of one sphere centred on the box,
/// with radius `sqrt(|lower_left|^2 + |upper_right|^2)`, numbered
/// `starting_id`. The boundary type is applied to every new surface.
#[derive(Debug, Clone)]
pub struct BoundingRegion {
    universe: UniverseId,
    bounded_type: BoundedType,
    boundary_type: BoundaryType,
    starting_id: u32,
}

impl BoundingRegion {
    /// Creates a vacuum box region starting at [`DEFAULT_STARTING_ID`].
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self {
            universe,
            bounded_type: BoundedType::Box,
            boundary_type: BoundaryType::Vacuum,
            starting_id: DEFAULT_STARTING_ID,
        }
    }

    /// Sets the region shape.
    #[must_use]
    pub fn bounded_type(mut self, bounded_type: BoundedType) -> Self {
        self.bounded_type = bounded_type;
        self
    }

    /// Sets the boundary condition of the new surfaces.
    #[must_use]
    pub fn boundary_type(mut self, boundary_type: BoundaryType) -> Self {
        self.boundary_type = boundary_type;
        self
    }

    /// Sets the ID of the first new surface.
    #[must_use]
    pub fn starting_id(mut self, starting_id: u32) -> Self {
        self.starting_id = starting_id;
        self
    }

    /// Executes the construction, inserting the new surfaces into `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not mesh-backed or its file
    /// cannot be read.
    pub fn execute(
        &self,
        store: &mut GeometryStore,
        reader: &dyn MeshFileReader,
    ) -> Result<Region> {
        let bbox = MeshBoundingBox::new(self.universe).execute(store, reader)?;
        let (ll, ur) = (bbox.min, bbox.max);
        tracing::debug!(
            bounded_type = %self.bounded_type,
            starting_id = self.starting_id,
            "building bounding region"
        );

        match self.bounded_type {
            BoundedType::Sphere => {
                let r = (ll.coords.norm_squared() + ur.coords.norm_squared()).sqrt();
                let sphere = self.insert(
                    store,
                    0,
                    Quadric::Sphere {
                        center: bbox.center(),
                        r,
                    },
                );
                Ok(Region::below(sphere))
            }
            BoundedType::Box => {
                let planes = [
                    Quadric::XPlane { x0: ll.x },
                    Quadric::XPlane { x0: ur.x },
                    Quadric::YPlane { y0: ll.y },
                    Quadric::YPlane { y0: ur.y },
                    Quadric::ZPlane { z0: ll.z },
                    Quadric::ZPlane { z0: ur.z },
                ];
                let mut halves = Vec::with_capacity(planes.len());
                for (offset, quadric) in (0..).zip(planes) {
                    let surface = self.insert(store, offset, quadric);
                    halves.push(if offset % 2 == 0 {
                        Region::above(surface)
                    } else {
                        Region::below(surface)
                    });
                }
                Ok(Region::Intersection(halves))
            }
        }
    }

    fn insert(
        &self,
        store: &mut GeometryStore,
        offset: u32,
        quadric: Quadric,
    ) -> SurfaceId {
        let id = self.starting_id.saturating_add(offset);
        store.insert_surface(SurfaceData::new(Some(id), quadric).with_boundary(self.boundary_type))
    }
}
