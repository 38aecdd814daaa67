use crate::geometry::{BoundaryType, Quadric};
use crate::ids::{self, IdSpace};

slotmap::new_key_type! {
    /// Unique identifier for a surface in the geometry store.
    pub struct SurfaceId;
}

/// Data associated with a bounding surface.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    /// User-facing ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// The implicit surface equation.
    pub quadric: Quadric,
    /// Boundary condition applied to particles crossing the surface.
    pub boundary: BoundaryType,
}

impl SurfaceData {
    /// Creates a transmissive surface, allocating an ID if none is given.
    #[must_use]
    pub fn new(id: Option<u32>, quadric: Quadric) -> Self {
        Self {
            id: ids::assign(IdSpace::Surface, id),
            name: String::new(),
            quadric,
            boundary: BoundaryType::default(),
        }
    }

    /// Sets the boundary condition.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryType) -> Self {
        self.boundary = boundary;
        self
    }
}
