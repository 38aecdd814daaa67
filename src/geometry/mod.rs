mod aabb;
mod quadric;

pub use aabb::Aabb;
pub use quadric::{BoundaryType, Quadric, Side};
