use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::Point2D;

/// Per-frame camera parameters.
///
/// Recomputed whenever the camera is (re)opened or reconfigured; the
/// capture loop receives a fresh copy with every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Diagonal field of view in degrees.
    pub fov: f64,
    /// Horizontal resolution in pixels.
    pub res_x: u32,
    /// Vertical resolution in pixels.
    pub res_y: u32,
    /// Nominal frame rate.
    pub fps: u32,
}

impl Default for CameraInfo {
    fn default() -> Self {
        Self {
            fov: 56.0,
            res_x: 640,
            res_y: 480,
            fps: 30,
        }
    }
}

impl CameraInfo {
    /// Focal length in width-normalized units.
    ///
    /// Image coordinates produced by [`CameraInfo::normalize`] span
    /// `[-0.5, 0.5]` horizontally, so a camera-space point `p` projects to
    /// `(p.x, p.y) * focal_length / p.z` in the same units.
    pub fn focal_length(&self) -> f64 {
        let w = f64::from(self.res_x);
        let h = f64::from(self.res_y);
        let diag = (w * w + h * h).sqrt();
        let aspect_x = w / diag;
        0.5 * aspect_x / (0.5 * self.fov.to_radians()).tan()
    }

    /// Convert a pixel position to centered, width-normalized coordinates.
    pub fn normalize(&self, p: Point2D) -> Vector2<f64> {
        let w = f64::from(self.res_x);
        let h = f64::from(self.res_y);
        Vector2::new(
            (f64::from(p.x) - 0.5 * w) / w,
            (f64::from(p.y) - 0.5 * h) / w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    #[test]
    fn focal_length_narrows_with_wider_fov() {
        let narrow = CameraInfo {
            fov: 40.0,
            ..CameraInfo::default()
        };
        let wide = CameraInfo {
            fov: 75.0,
            ..CameraInfo::default()
        };
        assert!(narrow.focal_length() > wide.focal_length());
    }

    #[test]
    fn normalize_centers_the_principal_point() {
        let info = CameraInfo::default();
        let c = info.normalize(Point2::new(320.0, 240.0));
        assert_relative_eq!(c, Vector2::zeros(), epsilon = 1e-12);

        let corner = info.normalize(Point2::new(640.0, 480.0));
        assert_relative_eq!(corner.x, 0.5, epsilon = 1e-12);
        // vertical axis shares the horizontal scale
        assert_relative_eq!(corner.y, 240.0 / 640.0, epsilon = 1e-12);
    }

    #[test]
    fn serde_round_trip() {
        let info = CameraInfo {
            fov: 65.0,
            res_x: 1280,
            res_y: 720,
            fps: 60,
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: CameraInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
