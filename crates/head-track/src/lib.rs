//! Capture-track runtime for point-based head tracking.
//!
//! This crate wires a camera, a point extractor and the pose solver into a
//! single dedicated worker loop and publishes the most recent stable pose
//! to concurrent consumers:
//!
//! - [`FrameSource`], [`PointExtractor`] and [`PreviewSink`] are the
//!   boundaries to the outside world; implementations are composed
//!   explicitly at startup via [`Tracker::new`].
//! - [`Tracker`] owns the worker thread and exposes the thread-safe
//!   operations (pose reads, re-centering, camera reconfiguration).
//! - [`PoseStore`] is the single-slot holder behind the pose reads.
//!
//! ## Quickstart
//!
//! ```no_run
//! use head_track::{Tracker, TrackerConfig};
//! use head_track::synth::{sweep_script, SyntheticCamera, SyntheticExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::default();
//! let camera = SyntheticCamera::new(&config.model()?, sweep_script(120, 0.3, 900.0));
//!
//! let mut tracker = Tracker::new(
//!     config,
//!     Box::new(camera),
//!     Box::new(SyntheticExtractor::default()),
//!     None,
//! )?;
//! tracker.start_tracking()?;
//! // ... consume tracker.pose_data() from any thread ...
//! tracker.stop_tracking();
//! # Ok(())
//! # }
//! ```

mod api;
mod buffer;
mod config;
mod runtime;
mod store;
pub mod synth;

pub use api::{FrameSource, PointExtractor, PreviewSink};
pub use buffer::{Frame, PixelBuffer};
pub use config::TrackerConfig;
pub use runtime::{StartError, Tracker};
pub use store::PoseStore;

pub use head_track_core as core;
pub use head_track_core::{pose_data, Affine, CameraInfo, ModelError, Point2D, PointModel, PoseData};
pub use head_track_solver as solver;
pub use head_track_solver::PointTracker;
