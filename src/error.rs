use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the universe model.
#[derive(Debug, Error)]
pub enum CsgError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Rejected values at the point of assignment.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("{parameter} must be one of {allowed:?}, got \"{value}\"")]
    UnknownOption {
        parameter: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

/// Structural problems in the geometry graph.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("universe {0} is mesh-backed and has no cells")]
    NotCsg(u32),

    #[error("universe {0} is not backed by a mesh file")]
    NotMesh(u32),

    #[error("lattice {lattice} has no universe at index ({index})")]
    LatticeIndex { lattice: u32, index: String },

    #[error("universe {0} contains itself")]
    CyclicGeometry(u32),

    #[error("malformed region expression \"{expression}\": {reason}")]
    RegionSyntax { expression: String, reason: String },

    #[error(
        "cell {cell} reached instance {instance} but its distributed fill only has {len} entries"
    )]
    DistribmatExhausted {
        cell: u32,
        instance: usize,
        len: usize,
    },

    #[error("instance accumulators of {0} are not reset")]
    AccumulatorsNotReset(String),
}

/// Failures of domain queries that lack prerequisite data.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(
        "volume information is needed to calculate microscopic cross sections for universe \
         {universe}; run a stochastic volume calculation first"
    )]
    MissingVolume { universe: u32 },

    #[error("no volume information found for universe {universe}")]
    NoVolumeInformation { universe: u32 },

    #[error("volume calculation covers {found} domains, not universes")]
    DomainTypeMismatch { found: &'static str },
}

/// Errors raised while reading or writing persisted geometry.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error("failed to format XML output")]
    Format(#[from] std::fmt::Error),

    #[error("<{element}> is missing \"{name}\"")]
    MissingAttribute {
        element: &'static str,
        name: &'static str,
    },

    #[error("<{element}> has invalid \"{name}\" value \"{value}\"")]
    InvalidAttribute {
        element: &'static str,
        name: &'static str,
        value: String,
    },

    #[error("unexpected element <{found}>, expected <{expected}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    #[error("mesh file {} not available: {reason}", .path.display())]
    MeshFile { path: PathBuf, reason: String },
}

impl From<std::fmt::Error> for CsgError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Io(IoError::Format(err))
    }
}

impl From<roxmltree::Error> for CsgError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Io(IoError::Xml(err))
    }
}

/// Convenience type alias for results using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;
