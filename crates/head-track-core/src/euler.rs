use nalgebra::Matrix3;

use crate::Affine;

/// Consumer-facing pose sample: `[yaw, pitch, roll, x, y, z]` in degrees
/// and centimetres.
pub type PoseData = [f64; 6];

/// Convert a camera-space pose to the consumer output convention.
///
/// Camera-space axes are remapped into a roll-pitch-yaw frame
/// (`-z -> x`, `y -> z`, `x -> -y`) before Euler extraction, and the
/// millimetre translation is reported in centimetres.
pub fn pose_data(pose: &Affine) -> PoseData {
    #[rustfmt::skip]
    let r_eg = Matrix3::new(
         0.0, 0.0, -1.0,
        -1.0, 0.0,  0.0,
         0.0, 1.0,  0.0,
    );
    let r = r_eg * pose.r * r_eg.transpose();

    let (r00, r10) = (r[(0, 0)], r[(1, 0)]);
    let (r20, r21, r22) = (r[(2, 0)], r[(2, 1)], r[(2, 2)]);

    let yaw = r10.atan2(r00);
    let pitch = -(-r20).atan2(r21.hypot(r22));
    let roll = r21.atan2(r22);

    [
        yaw.to_degrees(),
        pitch.to_degrees(),
        roll.to_degrees(),
        pose.t.x / 10.0,
        pose.t.y / 10.0,
        pose.t.z / 10.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn rot_x(deg: f64) -> Matrix3<f64> {
        let (s, c) = deg.to_radians().sin_cos();
        #[rustfmt::skip]
        let m = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0,   c,  -s,
            0.0,   s,   c,
        );
        m
    }

    fn rot_y(deg: f64) -> Matrix3<f64> {
        let (s, c) = deg.to_radians().sin_cos();
        #[rustfmt::skip]
        let m = Matrix3::new(
              c, 0.0,   s,
            0.0, 1.0, 0.0,
             -s, 0.0,   c,
        );
        m
    }

    #[test]
    fn identity_pose_is_all_zero() {
        let data = pose_data(&Affine::identity());
        for v in data {
            assert_relative_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn camera_y_rotation_maps_to_yaw() {
        // Rotating the head about the camera's vertical axis is yaw in
        // the consumer frame.
        let pose = Affine::new(rot_y(15.0), Vector3::zeros());
        let data = pose_data(&pose);
        assert_relative_eq!(data[0].abs(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(data[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(data[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn camera_x_rotation_maps_to_pitch() {
        let pose = Affine::new(rot_x(10.0), Vector3::zeros());
        let data = pose_data(&pose);
        assert_relative_eq!(data[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(data[1].abs(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(data[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn translation_is_reported_in_centimetres() {
        let pose = Affine::translation(Vector3::new(100.0, -250.0, 1000.0));
        let data = pose_data(&pose);
        assert_relative_eq!(data[3], 10.0);
        assert_relative_eq!(data[4], -25.0);
        assert_relative_eq!(data[5], 100.0);
    }
}
