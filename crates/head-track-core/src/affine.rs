use std::ops::Mul;

use nalgebra::{Matrix3, Vector3};

/// Rigid transform: orthonormal 3x3 rotation plus translation in
/// millimetres.
///
/// The rotation is stored as a matrix rather than Euler angles so that
/// repeated composition does not accumulate gimbal error; angles are
/// derived only at the consumer boundary (see [`crate::pose_data`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub r: Matrix3<f64>,
    pub t: Vector3<f64>,
}

impl Affine {
    pub fn new(r: Matrix3<f64>, t: Vector3<f64>) -> Self {
        Self { r, t }
    }

    pub fn identity() -> Self {
        Self {
            r: Matrix3::identity(),
            t: Vector3::zeros(),
        }
    }

    /// Pure translation, identity rotation.
    pub fn translation(t: Vector3<f64>) -> Self {
        Self {
            r: Matrix3::identity(),
            t,
        }
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            r: self.r * rhs.r,
            t: self.r * rhs.t + self.t,
        }
    }
}

impl Mul<Vector3<f64>> for Affine {
    type Output = Vector3<f64>;

    fn mul(self, rhs: Vector3<f64>) -> Vector3<f64> {
        self.r * rhs + self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn composition_matches_point_mapping() {
        let a = Affine::new(
            Rotation3::from_euler_angles(0.1, -0.2, 0.3).into_inner(),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let b = Affine::new(
            Rotation3::from_euler_angles(-0.3, 0.1, 0.0).into_inner(),
            Vector3::new(-5.0, 0.0, 10.0),
        );
        let p = Vector3::new(0.5, -1.5, 2.0);

        assert_relative_eq!((a * b) * p, a * (b * p), epsilon = 1e-12);
    }

    #[test]
    fn identity_is_neutral() {
        let a = Affine::new(
            Rotation3::from_euler_angles(0.4, 0.0, -0.1).into_inner(),
            Vector3::new(7.0, -2.0, 100.0),
        );
        let i = Affine::identity();
        assert_relative_eq!((a * i).t, a.t);
        assert_relative_eq!((i * a).r, a.r);
    }
}
