mod bounding_box;
mod collect;
mod find;
mod nuclides;

pub use bounding_box::BoundingBox;
pub use collect::{GetAllCells, GetAllMaterials, GetAllUniverses};
pub use find::{Find, Located};
pub use nuclides::{GetNuclides, NuclideDensities};
