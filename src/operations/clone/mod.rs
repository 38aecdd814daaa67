//! Deep copies that keep the sharing structure of the geometry graph.
//!
//! Every clone operation threads one [`CloneMemo`] through the whole walk.
//! An entity reached twice is copied once and the copy is referenced twice.
//! Copies always receive fresh user-facing IDs.

mod cell;
mod lattice;
mod leaf;
mod memo;
mod universe;

pub use cell::CloneCell;
pub use lattice::CloneLattice;
pub use leaf::{CloneMaterial, CloneSurface};
pub use memo::CloneMemo;
pub use universe::CloneUniverse;

/// Which referenced entities a clone copies rather than shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    /// Copy materials filling cells. Otherwise the copies share them.
    pub clone_materials: bool,
    /// Copy the surfaces bounding cells. Otherwise the copies share them.
    pub clone_regions: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            clone_materials: true,
            clone_regions: true,
        }
    }
}
