//! Pose-from-3-points solver for head tracking.
//!
//! Given three detected image points and a known rigid 3-point geometry,
//! the solver recovers the rotation and translation of the tracked object
//! relative to the camera. Recovering a pose from exactly three
//! correspondences under a single camera is inherently two-fold ambiguous
//! (the mirror solution through the model plane is equally consistent);
//! [`PointTracker`] carries the minimal temporal state needed to pick a
//! branch deterministically from frame to frame.

mod correspondence;
mod posit;
mod tracker;

pub use correspondence::{order_by_axis, order_from_previous, PointOrder};
pub use posit::{posit, PositSolution};
pub use tracker::PointTracker;
