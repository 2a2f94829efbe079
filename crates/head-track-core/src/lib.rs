//! Core types for point-based head tracking.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete camera driver or point extractor.

mod affine;
mod camera;
mod euler;
mod logger;
mod model;

pub use affine::Affine;
pub use camera::CameraInfo;
pub use euler::{pose_data, PoseData};
pub use logger::init_with_level;
pub use model::{ModelError, PointModel};

/// A detected marker position in image pixel coordinates.
///
/// Ephemeral: produced fresh each frame, with no persistent identity
/// across frames.
pub type Point2D = nalgebra::Point2<f32>;
