//! Results of stochastic volume calculations and their transfer onto
//! universes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, Result, ValidationError};
use crate::model::{GeometryStore, Measurement, UniverseId};

/// Kind of domain a volume calculation was run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainType {
    Cell,
    Material,
    Universe,
}

impl DomainType {
    const NAMES: &'static [&'static str] = &["cell", "material", "universe"];

    /// Lower-case name used in persisted results.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Material => "material",
            Self::Universe => "universe",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cell" => Ok(Self::Cell),
            "material" => Ok(Self::Material),
            "universe" => Ok(Self::Universe),
            other => Err(ValidationError::UnknownOption {
                parameter: "domain type",
                value: other.to_owned(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Volumes and atom counts keyed by domain ID.
#[derive(Debug, Clone)]
pub struct VolumeCalculation {
    /// What the IDs refer to.
    pub domain_type: DomainType,
    /// Volume of each domain, in cm^3.
    pub volumes: HashMap<u32, Measurement>,
    /// Atom count of each nuclide in each domain.
    pub atoms: HashMap<u32, Vec<(String, Measurement)>>,
}

impl VolumeCalculation {
    /// Creates an empty result for `domain_type`.
    #[must_use]
    pub fn new(domain_type: DomainType) -> Self {
        Self {
            domain_type,
            volumes: HashMap::new(),
            atoms: HashMap::new(),
        }
    }

    /// Records the volume and atom counts of one domain.
    #[must_use]
    pub fn with_domain(
        mut self,
        id: u32,
        volume: Measurement,
        atoms: Vec<(String, Measurement)>,
    ) -> Self {
        self.volumes.insert(id, volume);
        self.atoms.insert(id, atoms);
        self
    }
}

/// Copies the volume and atom counts computed for a universe onto it.
pub struct AddVolumeInformation<'a> {
    universe: UniverseId,
    calculation: &'a VolumeCalculation,
}

impl<'a> AddVolumeInformation<'a> {
    /// Creates a new `AddVolumeInformation` operation.
    #[must_use]
    pub fn new(universe: UniverseId, calculation: &'a VolumeCalculation) -> Self {
        Self {
            universe,
            calculation,
        }
    }

    /// Executes the transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the calculation was not run over universes, has
    /// no entry for this universe, or reports an invalid volume.
    pub fn execute(&self, store: &mut GeometryStore) -> Result<()> {
        let calc = self.calculation;
        if calc.domain_type != DomainType::Universe {
            return Err(DomainError::DomainTypeMismatch {
                found: calc.domain_type.as_str(),
            }
            .into());
        }
        let data = store.universe_mut(self.universe)?;
        let id = data.id;
        let volume = calc
            .volumes
            .get(&id)
            .ok_or(DomainError::NoVolumeInformation { universe: id })?;
        data.set_volume(Some(volume.value))?;
        data.atoms = calc.atoms.get(&id).cloned().unwrap_or_default();
        tracing::debug!(universe = id, volume = volume.value, "added volume information");
        Ok(())
    }
}
