use nalgebra::{Matrix2, Point3, Vector3};

/// Errors raised when constructing a [`PointModel`].
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("model reference points are collinear")]
    Collinear,
}

/// Immutable 3-point rigid geometry of the tracked object.
///
/// The model is stored relative to its first reference point: `m01` and
/// `m02` are the positions of points 1 and 2 in object-local coordinates
/// (millimetres). The inverse Gram matrix of `(m01, m02)` and the unit
/// normal of the model plane are precomputed for the pose solver.
#[derive(Clone, Copy, Debug)]
pub struct PointModel {
    m01: Vector3<f64>,
    m02: Vector3<f64>,
    gram_inv: Matrix2<f64>,
    normal: Vector3<f64>,
}

impl PointModel {
    /// Build a model from its three reference points.
    ///
    /// Fails when the points are collinear (or coincident); every other
    /// geometry is accepted.
    pub fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> Result<Self, ModelError> {
        let m01 = p1 - p0;
        let m02 = p2 - p0;

        let cross = m01.cross(&m02);
        let area = cross.norm();
        if area <= f64::EPSILON * m01.norm() * m02.norm() || area == 0.0 {
            return Err(ModelError::Collinear);
        }
        let normal = cross / area;

        let s11 = m01.dot(&m01);
        let s12 = m01.dot(&m02);
        let s22 = m02.dot(&m02);
        let gram_inv = Matrix2::new(s11, s12, s12, s22)
            .try_inverse()
            .ok_or(ModelError::Collinear)?;

        Ok(Self {
            m01,
            m02,
            gram_inv,
            normal,
        })
    }

    /// Position of reference point 1 relative to point 0.
    pub fn m01(&self) -> Vector3<f64> {
        self.m01
    }

    /// Position of reference point 2 relative to point 0.
    pub fn m02(&self) -> Vector3<f64> {
        self.m02
    }

    /// Inverse Gram matrix of `(m01, m02)`; maps scalar products against
    /// the basis vectors to in-plane coordinates.
    pub fn gram_inv(&self) -> Matrix2<f64> {
        self.gram_inv
    }

    /// Unit normal of the model plane.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }
}
