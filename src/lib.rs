pub mod error;
pub mod geometry;
pub mod ids;
pub mod io;
pub mod math;
pub mod model;
pub mod operations;

pub use error::{CsgError, Result};
