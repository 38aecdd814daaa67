use std::path::{Path, PathBuf};

use crate::error::{Result, ValidationError};
use crate::ids::{self, IdSpace};

use super::cell::CellId;
use super::id_map::IdMap;

/// Cells of a universe keyed by their user-facing ID, in insertion order.
pub type CellMap = IdMap<CellId>;

slotmap::new_key_type! {
    /// Unique identifier for a universe in the geometry store.
    pub struct UniverseId;
}

/// A value with its one-sigma uncertainty, as produced by stochastic
/// volume calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Nominal value.
    pub value: f64,
    /// Standard deviation.
    pub std_dev: f64,
}

impl Measurement {
    /// Creates a measurement.
    #[must_use]
    pub fn new(value: f64, std_dev: f64) -> Self {
        Self { value, std_dev }
    }
}

/// A universe whose content lives in an external tessellated-geometry file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshUniverse {
    filename: PathBuf,
    auto_geom_ids: bool,
    auto_mat_ids: bool,
}

impl MeshUniverse {
    /// Creates a reference to `filename` with both renumbering flags off.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is empty.
    pub fn new(filename: impl Into<PathBuf>) -> Result<Self> {
        let mut mesh = Self {
            filename: PathBuf::new(),
            auto_geom_ids: false,
            auto_mat_ids: false,
        };
        mesh.set_filename(filename)?;
        Ok(mesh)
    }

    /// Path to the mesh file.
    #[must_use]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Replaces the mesh file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is empty.
    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) -> Result<()> {
        let filename = filename.into();
        if filename.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                parameter: "mesh filename",
                reason: "must not be empty".into(),
            }
            .into());
        }
        self.filename = filename;
        Ok(())
    }

    /// Whether volume and surface IDs inside the file are renumbered to avoid
    /// collisions with the CSG model.
    #[must_use]
    pub fn auto_geom_ids(&self) -> bool {
        self.auto_geom_ids
    }

    /// Sets the geometry-ID renumbering flag.
    pub fn set_auto_geom_ids(&mut self, value: bool) {
        self.auto_geom_ids = value;
    }

    /// Whether material IDs inside the file are renumbered.
    #[must_use]
    pub fn auto_mat_ids(&self) -> bool {
        self.auto_mat_ids
    }

    /// Sets the material-ID renumbering flag.
    pub fn set_auto_mat_ids(&mut self, value: bool) {
        self.auto_mat_ids = value;
    }
}

/// The two flavours of universe.
#[derive(Debug, Clone, PartialEq)]
pub enum UniverseKind {
    /// A container of CSG cells.
    Csg {
        /// Cells keyed by user-facing ID.
        cells: CellMap,
    },
    /// An opaque reference to a mesh file.
    Mesh(MeshUniverse),
}

/// Data associated with a universe.
#[derive(Debug, Clone)]
pub struct UniverseData {
    /// User-facing ID.
    pub id: u32,
    name: String,
    volume: Option<f64>,
    pub(crate) atoms: Vec<(String, Measurement)>,
    /// Variant-specific content.
    pub kind: UniverseKind,
}

impl UniverseData {
    /// Creates an empty CSG universe, allocating an ID if none is given.
    #[must_use]
    pub fn csg(id: Option<u32>) -> Self {
        Self::with_kind(
            id,
            UniverseKind::Csg {
                cells: CellMap::new(),
            },
        )
    }

    /// Creates a mesh-backed universe, allocating an ID if none is given.
    #[must_use]
    pub fn mesh(id: Option<u32>, mesh: MeshUniverse) -> Self {
        Self::with_kind(id, UniverseKind::Mesh(mesh))
    }

    fn with_kind(id: Option<u32>, kind: UniverseKind) -> Self {
        Self {
            id: ids::assign(IdSpace::Universe, id),
            name: String::new(),
            volume: None,
            atoms: Vec::new(),
            kind,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Display name, empty by default.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the display name. `None` resets it to the empty string.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.unwrap_or_default().to_owned();
    }

    /// Volume in cm^3, if known.
    #[must_use]
    pub fn volume(&self) -> Option<f64> {
        self.volume
    }

    /// Sets the volume manually.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is negative or not finite.
    pub fn set_volume(&mut self, volume: Option<f64>) -> Result<()> {
        if let Some(v) = volume {
            if !v.is_finite() || v < 0.0 {
                return Err(ValidationError::InvalidValue {
                    parameter: "universe volume",
                    reason: format!("expected a finite non-negative number, got {v}"),
                }
                .into());
            }
        }
        self.volume = volume;
        Ok(())
    }

    /// Atom counts per nuclide from the last volume calculation.
    #[must_use]
    pub fn atoms(&self) -> &[(String, Measurement)] {
        &self.atoms
    }

    /// The cell map of a CSG universe, `None` for mesh-backed ones.
    #[must_use]
    pub fn cells(&self) -> Option<&CellMap> {
        match &self.kind {
            UniverseKind::Csg { cells } => Some(cells),
            UniverseKind::Mesh(_) => None,
        }
    }

    /// The mesh reference of a mesh-backed universe.
    #[must_use]
    pub fn as_mesh(&self) -> Option<&MeshUniverse> {
        match &self.kind {
            UniverseKind::Mesh(mesh) => Some(mesh),
            UniverseKind::Csg { .. } => None,
        }
    }

    /// Mutable access to the mesh reference of a mesh-backed universe.
    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshUniverse> {
        match &mut self.kind {
            UniverseKind::Mesh(mesh) => Some(mesh),
            UniverseKind::Csg { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn cell_map_keeps_first_insert() {
        let mut arena: SlotMap<CellId, ()> = SlotMap::with_key();
        let (a, b) = (arena.insert(()), arena.insert(()));
        let mut map = CellMap::new();
        assert!(map.insert(10, a));
        assert!(!map.insert(10, b));
        assert!(map.insert(3, b));
        assert_eq!(map.get(10), Some(a));
        assert_eq!(map.keys().collect::<Vec<_>>(), [10, 3]);
        assert_eq!(map.remove(10), Some(a));
        assert_eq!(map.remove(10), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn volume_must_be_finite_and_non_negative() {
        let mut u = UniverseData::csg(None);
        assert!(u.set_volume(Some(-1.0)).is_err());
        assert!(u.set_volume(Some(f64::NAN)).is_err());
        u.set_volume(Some(2.5)).unwrap();
        assert_eq!(u.volume(), Some(2.5));
    }

    #[test]
    fn name_defaults_to_empty() {
        let mut u = UniverseData::csg(None).with_name("core");
        assert_eq!(u.name(), "core");
        u.set_name(None);
        assert_eq!(u.name(), "");
    }

    #[test]
    fn mesh_filename_is_validated() {
        assert!(MeshUniverse::new("").is_err());
        let mut mesh = MeshUniverse::new("model.h5m").unwrap();
        assert!(mesh.set_filename("").is_err());
        assert_eq!(mesh.filename(), Path::new("model.h5m"));
    }
}
