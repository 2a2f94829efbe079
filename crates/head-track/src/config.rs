use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use head_track_core::{ModelError, PointModel};

/// Tracking session configuration.
///
/// The runtime takes an immutable snapshot at construction; changing a
/// setting means building a new tracker (the camera field of view is the
/// one exception, adjustable live through `Tracker::set_fov`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub camera_name: String,
    pub fps: u32,
    pub res_x: u32,
    pub res_y: u32,

    /// Diagonal field of view, degrees.
    pub fov: u32,

    /// When disabled the solver never enters its dynamic initialization
    /// phase and branch selection is continuity-only from the first
    /// frame.
    pub dynamic_pose: bool,

    /// Length of the dynamic initialization phase, milliseconds.
    pub init_phase_timeout_ms: u32,

    /// Object-local coordinates of the three tracked reference points,
    /// millimetres.
    pub model_points: [[f64; 3]; 3],

    /// Offset from the model origin to the head center, millimetres.
    pub head_offset: [f64; 3],
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            camera_name: String::new(),
            fps: 30,
            res_x: 640,
            res_y: 480,
            fov: 56,
            dynamic_pose: true,
            init_phase_timeout_ms: 500,
            // side-mounted clip geometry
            model_points: [[0.0, 0.0, 0.0], [0.0, 40.0, -30.0], [0.0, -70.0, -80.0]],
            head_offset: [0.0, 0.0, 0.0],
        }
    }
}

impl TrackerConfig {
    /// Build the rigid model described by `model_points`.
    pub fn model(&self) -> Result<PointModel, ModelError> {
        let [p0, p1, p2] = self.model_points;
        PointModel::new(
            Point3::new(p0[0], p0[1], p0[2]),
            Point3::new(p1[0], p1[1], p1[2]),
            Point3::new(p2[0], p2[1], p2[2]),
        )
    }

    pub fn head_offset_vector(&self) -> Vector3<f64> {
        Vector3::new(self.head_offset[0], self.head_offset[1], self.head_offset[2])
    }
}
