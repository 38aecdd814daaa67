//! Enumeration of physical cell and material occurrences.
//!
//! A shared universe is one object in the store but many occurrences in
//! space. [`DeterminePaths`] walks every occurrence from a root universe and
//! returns an [`InstanceMap`] with one count and one path string per
//! occurrence.

mod determine_paths;
mod instance_map;

pub use determine_paths::DeterminePaths;
pub use instance_map::{InstanceMap, Instances};
