use crate::ids::{self, IdSpace};
use crate::math::{rotation_from_angles, Matrix3, Vector3};

use super::lattice::LatticeId;
use super::material::MaterialId;
use super::region::Region;
use super::universe::UniverseId;

slotmap::new_key_type! {
    /// Unique identifier for a cell in the geometry store.
    pub struct CellId;
}

/// What occupies the space of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fill {
    /// Empty space.
    #[default]
    Void,
    /// A single material.
    Material(MaterialId),
    /// One material (or void) per instance, consumed in traversal order.
    Distributed(Vec<Option<MaterialId>>),
    /// A nested universe.
    Universe(UniverseId),
    /// A lattice of universes.
    Lattice(LatticeId),
}

/// Discriminant of [`Fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillType {
    Void,
    Material,
    Distributed,
    Universe,
    Lattice,
}

impl Fill {
    /// Returns the kind of fill.
    #[must_use]
    pub fn fill_type(&self) -> FillType {
        match self {
            Self::Void => FillType::Void,
            Self::Material(_) => FillType::Material,
            Self::Distributed(_) => FillType::Distributed,
            Self::Universe(_) => FillType::Universe,
            Self::Lattice(_) => FillType::Lattice,
        }
    }

    /// Returns `true` if the fill terminates point location.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Void | Self::Material(_) | Self::Distributed(_))
    }

    /// Materials directly referenced by the fill, skipping void entries.
    #[must_use]
    pub fn materials(&self) -> Vec<MaterialId> {
        match self {
            Self::Material(m) => vec![*m],
            Self::Distributed(list) => list.iter().flatten().copied().collect(),
            _ => Vec::new(),
        }
    }
}

/// Orientation of a universe fill relative to its parent cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Euler angles `(phi, theta, psi)` in degrees.
    Angles(Vector3),
    /// An explicit rotation matrix.
    Matrix(Matrix3),
}

impl Rotation {
    /// The matrix applied to points entering the fill universe.
    #[must_use]
    pub fn matrix(&self) -> Matrix3 {
        match self {
            Self::Angles(angles) => rotation_from_angles(angles),
            Self::Matrix(m) => *m,
        }
    }
}

/// Data associated with a cell.
#[derive(Debug, Clone)]
pub struct CellData {
    /// User-facing ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Content of the cell.
    pub fill: Fill,
    /// Bounding region. `None` means all of space.
    pub region: Option<Region>,
    /// Offset of a universe fill, subtracted from points entering it.
    pub translation: Option<Vector3>,
    /// Orientation of a universe fill, applied after the translation.
    pub rotation: Option<Rotation>,
    /// Volume in cm^3, if known.
    pub volume: Option<f64>,
    /// Number of physical occurrences, written by [`InstanceMap::apply`].
    ///
    /// [`InstanceMap::apply`]: crate::operations::instances::InstanceMap::apply
    pub num_instances: usize,
    /// Instance paths, written alongside `num_instances`.
    pub paths: Vec<String>,
}

impl CellData {
    /// Creates a void cell without a region, allocating an ID if none is given.
    #[must_use]
    pub fn new(id: Option<u32>) -> Self {
        Self {
            id: ids::assign(IdSpace::Cell, id),
            name: String::new(),
            fill: Fill::Void,
            region: None,
            translation: None,
            rotation: None,
            volume: None,
            num_instances: 0,
            paths: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the fill.
    #[must_use]
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Sets the bounding region.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the translation applied to a universe fill.
    #[must_use]
    pub fn with_translation(mut self, translation: Vector3) -> Self {
        self.translation = Some(translation);
        self
    }

    /// Sets the rotation applied to a universe fill.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }
}
