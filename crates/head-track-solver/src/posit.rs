use nalgebra::{Matrix3, Vector2, Vector3};

use head_track_core::PointModel;

use crate::PointOrder;

/// Convergence threshold on the perspective correction terms.
const EPSILON: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;

/// One accepted rigid solution of the 3-point problem.
#[derive(Clone, Copy, Debug)]
pub struct PositSolution {
    /// Orthonormal rotation, object to camera.
    pub r: Matrix3<f64>,
    /// Translation of the model origin in camera space, millimetres.
    pub t: Vector3<f64>,
    /// Iterations spent until the correction terms converged.
    pub iterations: usize,
}

fn rotation_from_rows(i: Vector3<f64>, j: Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_rows(&[i.transpose(), j.transpose(), i.cross(&j).transpose()])
}

/// Deviation of `r` from `expected` under `|| I - expected * r^T ||`.
fn deviation(expected: &Matrix3<f64>, r: &Matrix3<f64>) -> f64 {
    (Matrix3::identity() - expected * r.transpose()).norm()
}

/// Iterative pose from three coplanar point correspondences.
///
/// Scaled-orthographic iteration with perspective correction, after
/// Oberkampf, DeMenthon and Davis ("Iterative Pose Estimation Using
/// Coplanar Feature Points"). Every iteration yields two candidate
/// rotations, mirror images through the model plane; the candidate with
/// the smaller deviation from `expected_r` is carried forward. Passing the
/// previously accepted rotation enforces temporal continuity, passing the
/// identity favors a near-frontal interpretation.
///
/// `z0_seed` primes the depth of the model origin (millimetres) and is
/// normally the previous solve's depth.
///
/// Returns `None` when the correspondence is degenerate and the iteration
/// produces no finite solution; the caller treats that as "no update".
pub fn posit(
    model: &PointModel,
    order: &PointOrder,
    focal_length: f64,
    expected_r: &Matrix3<f64>,
    z0_seed: f64,
) -> Option<PositSolution> {
    let m01 = model.m01();
    let m02 = model.m02();
    let normal = model.normal();

    let mut k: Vector3<f64> = expected_r.row(2).transpose();
    let mut z0 = z0_seed;
    let mut rotation = *expected_r;

    let mut old_e1 = 0.0;
    let mut old_e2 = 0.0;
    let mut iterations = 0;

    for iter in 1..=MAX_ITERATIONS {
        iterations = iter;

        // Perspective correction terms for points 1 and 2.
        let e1 = k.dot(&m01) / z0;
        let e2 = k.dot(&m02) / z0;

        // Scalar products <I, m0i> and <J, m0i> of the scaled rotation
        // rows against the model basis.
        let i_rhs = Vector2::new(
            order[1].x * (1.0 + e1) - order[0].x,
            order[2].x * (1.0 + e2) - order[0].x,
        );
        let j_rhs = Vector2::new(
            order[1].y * (1.0 + e1) - order[0].y,
            order[2].y * (1.0 + e2) - order[0].y,
        );

        // In-plane components of I and J.
        let ic = model.gram_inv() * i_rhs;
        let jc = model.gram_inv() * j_rhs;
        let i0 = ic.x * m01 + ic.y * m02;
        let j0 = jc.x * m01 + jc.y * m02;

        // Out-of-plane components from || I || = || J ||, I . J = 0.
        let ii = i0.dot(&i0);
        let ij = i0.dot(&j0);
        let jj = j0.dot(&j0);

        let (rho, theta) = if jj == ii {
            let theta = if ij < 0.0 {
                std::f64::consts::FRAC_PI_4
            } else {
                -std::f64::consts::FRAC_PI_4
            };
            ((2.0 * ij.abs()).sqrt(), theta)
        } else {
            let rho = ((jj - ii).powi(2) + 4.0 * ij * ij).sqrt().sqrt();
            let mut theta = (-2.0 * ij / (jj - ii)).atan();
            if jj - ii < 0.0 {
                theta += std::f64::consts::PI;
            }
            (rho, theta / 2.0)
        };

        let (sin_t, cos_t) = theta.sin_cos();
        let i_a = i0 + rho * cos_t * normal;
        let j_a = j0 + rho * sin_t * normal;
        let i_b = i0 - rho * cos_t * normal;
        let j_b = j0 - rho * sin_t * normal;

        let scale = i_a.norm();
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let inv_scale = 1.0 / scale;

        let r_a = rotation_from_rows(i_a * inv_scale, j_a * inv_scale);
        let r_b = rotation_from_rows(i_b * inv_scale, j_b * inv_scale);

        // Mirror disambiguation: keep the branch closer to the expected
        // rotation.
        rotation = if deviation(expected_r, &r_a) < deviation(expected_r, &r_b) {
            r_a
        } else {
            r_b
        };
        k = rotation.row(2).transpose();
        z0 = focal_length * inv_scale;

        if (e1 - old_e1).abs() + (e2 - old_e2).abs() < EPSILON {
            break;
        }
        old_e1 = e1;
        old_e2 = e2;
    }

    if !z0.is_finite() || z0 <= 0.0 {
        return None;
    }

    let t = Vector3::new(
        order[0].x * z0 / focal_length,
        order[0].y * z0 / focal_length,
        z0,
    );

    Some(PositSolution {
        r: rotation,
        t,
        iterations,
    })
}
