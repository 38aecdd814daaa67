/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 rotation matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Builds the rotation matrix for Euler angles `(phi, theta, psi)` in degrees.
///
/// The angles are negated before evaluation so that the matrix maps a point
/// in the parent frame onto the rotated child frame.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_from_angles(angles: &Vector3) -> Matrix3 {
    let scale = -std::f64::consts::PI / 180.0;
    let (phi, theta, psi) = (angles.x * scale, angles.y * scale, angles.z * scale);
    let (s3, c3) = phi.sin_cos();
    let (s2, c2) = theta.sin_cos();
    let (s1, c1) = psi.sin_cos();

    #[rustfmt::skip]
    let m = Matrix3::new(
        c1 * c2, c1 * s2 * s3 - c3 * s1, s1 * s3 + c1 * c3 * s2,
        c2 * s1, c1 * c3 + s1 * s2 * s3, c3 * s1 * s2 - c1 * s3,
        -s2,     c2 * s3,                c2 * c3,
    );
    m
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn zero_angles_give_identity() {
        let m = rotation_from_angles(&Vector3::zeros());
        assert_relative_eq!(m, Matrix3::identity(), epsilon = TOLERANCE);
    }

    #[test]
    fn quarter_turn_about_z() {
        let m = rotation_from_angles(&Vector3::new(0.0, 0.0, 90.0));
        let p = m * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn matrix_is_orthonormal() {
        let m = rotation_from_angles(&Vector3::new(12.0, -40.0, 73.0));
        assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-12);
    }
}
