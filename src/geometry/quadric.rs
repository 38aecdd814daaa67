use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::math::{Point3, Vector3};

use super::Aabb;

/// Which side of a surface a half-space lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `f(p) > 0`.
    Positive,
    /// `f(p) <= 0`.
    Negative,
}

/// Particle behaviour when crossing a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryType {
    #[default]
    Transmission,
    Vacuum,
    Reflective,
    Periodic,
    White,
}

impl BoundaryType {
    const NAMES: &'static [&'static str] =
        &["transmission", "vacuum", "reflective", "periodic", "white"];

    /// Name used in persisted geometry.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transmission => "transmission",
            Self::Vacuum => "vacuum",
            Self::Reflective => "reflective",
            Self::Periodic => "periodic",
            Self::White => "white",
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transmission" => Ok(Self::Transmission),
            "vacuum" => Ok(Self::Vacuum),
            "reflective" => Ok(Self::Reflective),
            "periodic" => Ok(Self::Periodic),
            "white" => Ok(Self::White),
            other => Err(ValidationError::UnknownOption {
                parameter: "boundary type",
                value: other.to_owned(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Implicit quadric surfaces `f(x, y, z) = 0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Quadric {
    /// `x - x0`.
    XPlane { x0: f64 },
    /// `y - y0`.
    YPlane { y0: f64 },
    /// `z - z0`.
    ZPlane { z0: f64 },
    /// `a*x + b*y + c*z - d`.
    Plane { a: f64, b: f64, c: f64, d: f64 },
    /// `|p - center|^2 - r^2`.
    Sphere { center: Point3, r: f64 },
    /// `(x - x0)^2 + (y - y0)^2 - r^2`, infinite along z.
    ZCylinder { x0: f64, y0: f64, r: f64 },
}

impl Quadric {
    /// Name of the surface kind in persisted geometry.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::XPlane { .. } => "x-plane",
            Self::YPlane { .. } => "y-plane",
            Self::ZPlane { .. } => "z-plane",
            Self::Plane { .. } => "plane",
            Self::Sphere { .. } => "sphere",
            Self::ZCylinder { .. } => "z-cylinder",
        }
    }

    /// Coefficients in persisted order.
    #[must_use]
    pub fn coefficients(&self) -> Vec<f64> {
        match *self {
            Self::XPlane { x0 } => vec![x0],
            Self::YPlane { y0 } => vec![y0],
            Self::ZPlane { z0 } => vec![z0],
            Self::Plane { a, b, c, d } => vec![a, b, c, d],
            Self::Sphere { center, r } => vec![center.x, center.y, center.z, r],
            Self::ZCylinder { x0, y0, r } => vec![x0, y0, r],
        }
    }

    /// Rebuilds a quadric from its type name and coefficients.
    ///
    /// Returns `None` for an unknown type or a wrong coefficient count.
    #[must_use]
    pub fn from_coefficients(type_name: &str, coeffs: &[f64]) -> Option<Self> {
        Some(match (type_name, coeffs) {
            ("x-plane", &[x0]) => Self::XPlane { x0 },
            ("y-plane", &[y0]) => Self::YPlane { y0 },
            ("z-plane", &[z0]) => Self::ZPlane { z0 },
            ("plane", &[a, b, c, d]) => Self::Plane { a, b, c, d },
            ("sphere", &[x0, y0, z0, r]) => Self::Sphere {
                center: Point3::new(x0, y0, z0),
                r,
            },
            ("z-cylinder", &[x0, y0, r]) => Self::ZCylinder { x0, y0, r },
            _ => return None,
        })
    }

    /// Evaluates `f` at `p`.
    #[must_use]
    pub fn evaluate(&self, p: &Point3) -> f64 {
        match *self {
            Self::XPlane { x0 } => p.x - x0,
            Self::YPlane { y0 } => p.y - y0,
            Self::ZPlane { z0 } => p.z - z0,
            Self::Plane { a, b, c, d } => a * p.x + b * p.y + c * p.z - d,
            Self::Sphere { center, r } => (*p - center).norm_squared() - r * r,
            Self::ZCylinder { x0, y0, r } => {
                let dx = p.x - x0;
                let dy = p.y - y0;
                dx * dx + dy * dy - r * r
            }
        }
    }

    /// Returns `true` if `p` lies in the half-space on `side`.
    #[must_use]
    pub fn half_space_contains(&self, side: Side, p: &Point3) -> bool {
        (self.evaluate(p) > 0.0) == (side == Side::Positive)
    }

    /// Bounding box of the half-space on `side`.
    #[must_use]
    pub fn half_space_bounds(&self, side: Side) -> Aabb {
        let mut aabb = Aabb::infinite();
        match (self, side) {
            (Self::XPlane { x0 }, Side::Positive) => aabb.min.x = *x0,
            (Self::XPlane { x0 }, Side::Negative) => aabb.max.x = *x0,
            (Self::YPlane { y0 }, Side::Positive) => aabb.min.y = *y0,
            (Self::YPlane { y0 }, Side::Negative) => aabb.max.y = *y0,
            (Self::ZPlane { z0 }, Side::Positive) => aabb.min.z = *z0,
            (Self::ZPlane { z0 }, Side::Negative) => aabb.max.z = *z0,
            (Self::Sphere { center, r }, Side::Negative) => {
                let half = Vector3::repeat(*r);
                aabb = Aabb::new(*center - half, *center + half);
            }
            (Self::ZCylinder { x0, y0, r }, Side::Negative) => {
                aabb.min.x = x0 - r;
                aabb.max.x = x0 + r;
                aabb.min.y = y0 - r;
                aabb.max.y = y0 + r;
            }
            _ => {}
        }
        aabb
    }
}
