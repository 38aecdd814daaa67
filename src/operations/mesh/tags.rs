use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValidationError};
use crate::io::{decode_tag, MeshFileReader};
use crate::model::{GeometryStore, UniverseId};

use super::mesh_of;

const MATERIAL_PREFIX: &str = "mat:";
const IMPLICIT_COMPLEMENT: &str = "impl_complement";

/// Sorted, deduplicated material names assigned inside a mesh file.
///
/// Names come from `NAME` tags of the form `mat:<name>`. Other tags, such
/// as temperatures or reflective surface markers, are ignored.
pub struct MaterialNames {
    universe: UniverseId,
}

impl MaterialNames {
    /// Creates a new `MaterialNames` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not mesh-backed, or the file
    /// cannot be read or holds malformed tags.
    pub fn execute(
        &self,
        store: &GeometryStore,
        reader: &dyn MeshFileReader,
    ) -> Result<Vec<String>> {
        let path = mesh_of(store, self.universe)?.filename();
        let mut names = BTreeSet::new();
        for record in reader.name_tags(path)? {
            let tag = decode_tag(path, &record)?;
            if let Some(name) = tag.strip_prefix(MATERIAL_PREFIX) {
                names.insert(name.to_owned());
            }
        }
        Ok(names.into_iter().collect())
    }
}

/// Kind of geometric entity counted by [`GeomElementCount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomType {
    Volume,
    Surface,
}

impl GeomType {
    const NAMES: &'static [&'static str] = &["volume", "surface"];

    /// Value of the `CATEGORY` tag marking entities of this kind.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::Surface => "Surface",
        }
    }
}

impl fmt::Display for GeomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Volume => "volume",
            Self::Surface => "surface",
        })
    }
}

impl FromStr for GeomType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "volume" => Ok(Self::Volume),
            "surface" => Ok(Self::Surface),
            other => Err(ValidationError::UnknownOption {
                parameter: "geometry type",
                value: other.to_owned(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Number of volumes or surfaces in a mesh file as seen at run time.
///
/// The volume count includes the implicit complement, which is added when
/// the file does not already name one.
pub struct GeomElementCount {
    universe: UniverseId,
    geom_type: GeomType,
}

impl GeomElementCount {
    /// Creates a new `GeomElementCount` query.
    #[must_use]
    pub fn new(universe: UniverseId, geom_type: GeomType) -> Self {
        Self {
            universe,
            geom_type,
        }
    }

    /// Counts the cells (volumes) of the universe.
    #[must_use]
    pub fn cells(universe: UniverseId) -> Self {
        Self::new(universe, GeomType::Volume)
    }

    /// Counts the surfaces of the universe.
    #[must_use]
    pub fn surfaces(universe: UniverseId) -> Self {
        Self::new(universe, GeomType::Surface)
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not mesh-backed, or the file
    /// cannot be read or holds malformed tags.
    pub fn execute(&self, store: &GeometryStore, reader: &dyn MeshFileReader) -> Result<usize> {
        let path = mesh_of(store, self.universe)?.filename();
        let category = self.geom_type.category();
        let mut count = 0;
        for record in reader.category_tags(path)? {
            if decode_tag(path, &record)? == category {
                count += 1;
            }
        }

        if self.geom_type == GeomType::Volume {
            let mut has_complement = false;
            for record in reader.name_tags(path)? {
                if decode_tag(path, &record)?.contains(IMPLICIT_COMPLEMENT) {
                    has_complement = true;
                    break;
                }
            }
            if !has_complement {
                count += 1;
            }
        }
        Ok(count)
    }
}
