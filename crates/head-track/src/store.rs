use parking_lot::Mutex;

use head_track_core::Affine;

/// Thread-safe single-slot holder of the most recent stable pose.
///
/// The lock is held only for the duration of a value copy, so readers
/// never observe a torn rotation/translation pair and never block the
/// capture loop for longer than that copy.
#[derive(Debug, Default)]
pub struct PoseStore {
    slot: Mutex<Affine>,
}

impl PoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current pose out.
    pub fn get(&self) -> Affine {
        *self.slot.lock()
    }

    /// Copy a new pose in. Only the capture loop publishes.
    pub(crate) fn set(&self, pose: Affine) {
        *self.slot.lock() = pose;
    }
}
