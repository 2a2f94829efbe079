use std::time::Instant;

use nalgebra::{Matrix3, Vector2};

use head_track_core::{Affine, CameraInfo, Point2D, PointModel};

use crate::correspondence::{order_by_axis, order_from_previous};
use crate::posit::posit;

/// Depth seed used when no trustworthy previous depth exists, millimetres.
const DEFAULT_DEPTH: f64 = 1000.0;
/// Previous depths closer than this are treated as untrustworthy.
const MIN_SEED_DEPTH: f64 = 50.0;

/// Stateful 3-point pose tracker.
///
/// Owns the authoritative pose and the minimal temporal state used to
/// resolve the mirror ambiguity: whether the tracker is in its dynamic
/// initialization phase and when the last successful solve happened.
///
/// During the initialization phase the solver prefers the solution branch
/// closest to a frontal orientation; afterwards it prefers the branch
/// closest to the previously accepted pose. A successful solve ends the
/// initialization phase; staying without a solve for longer than the
/// configured budget re-enters it.
pub struct PointTracker {
    pose: Affine,
    init_phase: bool,
    last_success: Instant,
}

impl Default for PointTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointTracker {
    pub fn new() -> Self {
        Self {
            pose: Affine::identity(),
            init_phase: true,
            last_success: Instant::now(),
        }
    }

    /// Current pose snapshot. Cheap copy; callers serialize access against
    /// [`PointTracker::track`] externally.
    pub fn pose(&self) -> Affine {
        self.pose
    }

    /// Forget the continuity reference without altering the current pose.
    ///
    /// The next successful solve re-initializes branch selection, so a
    /// mirror-ambiguous point set may legitimately resolve to the other
    /// branch afterwards.
    pub fn reset_state(&mut self) {
        self.init_phase = true;
        self.last_success = Instant::now();
    }

    /// Solve for the pose of `model` given the detected `points`.
    ///
    /// With fewer than three points the call is a no-op and returns
    /// `false`; the previous pose is retained. `init_budget_ms` bounds the
    /// dynamic initialization phase: zero forces continuity-only branch
    /// selection from the first frame, a positive budget re-enters the
    /// initialization phase whenever no solve succeeded for that long.
    pub fn track(
        &mut self,
        points: &[Point2D],
        model: &PointModel,
        info: &CameraInfo,
        init_budget_ms: u32,
    ) -> bool {
        if points.len() < 3 {
            return false;
        }

        let focal_length = info.focal_length();
        let detected: [Vector2<f64>; 3] = [
            info.normalize(points[0]),
            info.normalize(points[1]),
            info.normalize(points[2]),
        ];

        let dynamic = init_budget_ms > 0;
        if dynamic && self.last_success.elapsed().as_millis() > u128::from(init_budget_ms) {
            if !self.init_phase {
                log::debug!("no solve for over {init_budget_ms} ms, re-initializing");
            }
            self.last_success = Instant::now();
            self.init_phase = true;
        }

        let order = if dynamic && !self.init_phase {
            order_from_previous(&detected, model, &self.pose, focal_length)
                .unwrap_or_else(|| order_by_axis(&detected, model))
        } else {
            order_by_axis(&detected, model)
        };

        let expected_r = if self.init_phase {
            Matrix3::identity()
        } else {
            self.pose.r
        };
        let z0_seed = if self.init_phase || self.pose.t.z < MIN_SEED_DEPTH {
            DEFAULT_DEPTH
        } else {
            self.pose.t.z
        };

        match posit(model, &order, focal_length, &expected_r, z0_seed) {
            Some(solution) => {
                self.pose = Affine::new(solution.r, solution.t);
                self.init_phase = false;
                self.last_success = Instant::now();
                true
            }
            None => false,
        }
    }
}
