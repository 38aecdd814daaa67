pub mod clone;
mod descent;
pub mod instances;
pub mod mesh;
pub mod query;
pub mod volume;
