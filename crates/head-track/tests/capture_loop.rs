//! End-to-end behavior of the capture-track loop against the synthetic
//! capture stack.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use head_track::synth::{sweep_script, SyntheticCamera, SyntheticExtractor};
use head_track::{Affine, PixelBuffer, PreviewSink, StartError, Tracker, TrackerConfig};

fn config() -> TrackerConfig {
    TrackerConfig {
        camera_name: "synthetic".into(),
        ..TrackerConfig::default()
    }
}

fn tracker_over(script: Vec<Affine>, preview: Option<Arc<dyn PreviewSink>>) -> Tracker {
    let cfg = config();
    let camera = SyntheticCamera::new(&cfg.model().unwrap(), script);
    Tracker::new(
        cfg,
        Box::new(camera),
        Box::new(SyntheticExtractor::default()),
        preview,
    )
    .unwrap()
}

/// Poll until `probe` returns true or the timeout elapses.
fn wait_for(timeout: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if probe() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn open_failure_keeps_the_tracker_stopped() {
    let mut tracker = Tracker::new(
        config(),
        Box::new(SyntheticCamera::unavailable()),
        Box::new(SyntheticExtractor::default()),
        None,
    )
    .unwrap();

    match tracker.start_tracking() {
        Err(StartError::CameraOpenFailed { name }) => assert_eq!(name, "synthetic"),
        other => panic!("expected open failure, got {other:?}"),
    }
    assert!(!tracker.is_running());
    assert!(tracker.pose_data().is_none());
    assert_eq!(tracker.point_count(), 0);
}

#[test]
fn tracks_a_scripted_rig_and_survives_stop() {
    // Constant frontal pose at 900 mm.
    let script = vec![Affine::translation(nalgebra::Vector3::new(0.0, 0.0, 900.0)); 40];
    let mut tracker = tracker_over(script, None);

    tracker.start_tracking().unwrap();
    assert!(tracker.is_running());
    assert!(
        wait_for(Duration::from_secs(2), || tracker.pose_data().is_some()),
        "no pose published within the timeout"
    );

    tracker.stop_tracking();
    assert!(!tracker.is_running());

    // The last solved pose outlives the loop.
    let data = tracker.pose_data().unwrap();
    // z is reported in centimetres
    assert!((data[5] - 90.0).abs() < 2.0, "z = {} cm", data[5]);
    assert!(data[0].abs() < 2.0, "yaw = {} deg", data[0]);

    // Nothing mutates the published pose while stopped.
    assert_eq!(tracker.pose_data().unwrap(), data);
}

#[test]
fn device_loss_keeps_the_loop_polling() {
    let script = sweep_script(5, 0.05, 900.0);
    let mut tracker = tracker_over(script, None);

    tracker.start_tracking().unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        tracker.pose_data().is_some()
    }));

    // Let the script run out: the camera now answers "no new frame"
    // forever, and the loop must keep running rather than terminate.
    std::thread::sleep(Duration::from_millis(100));
    assert!(tracker.is_running());
    assert!(tracker.pose_data().is_some());

    tracker.stop_tracking();
}

#[test]
fn restarts_after_a_stop() {
    let script = sweep_script(2000, 0.1, 900.0);
    let mut tracker = tracker_over(script, None);

    tracker.start_tracking().unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        tracker.pose_data().is_some()
    }));
    tracker.stop_tracking();

    // The same tracker can run a second session; the script resumes
    // where the first session left off.
    tracker.start_tracking().unwrap();
    assert!(tracker.is_running());
    assert!(wait_for(Duration::from_secs(2), || tracker.point_count() > 0));
    tracker.stop_tracking();
}

#[test]
fn second_start_while_running_is_rejected() {
    let script = sweep_script(2000, 0.1, 900.0);
    let mut tracker = tracker_over(script, None);

    tracker.start_tracking().unwrap();
    assert!(matches!(
        tracker.start_tracking(),
        Err(StartError::AlreadyRunning)
    ));
    tracker.stop_tracking();
}

#[derive(Default)]
struct RecordingSink {
    wanted: Mutex<(usize, usize)>,
    received: Mutex<Vec<(usize, usize)>>,
    updates: AtomicUsize,
}

impl RecordingSink {
    fn new(w: usize, h: usize) -> Self {
        Self {
            wanted: Mutex::new((w, h)),
            received: Mutex::new(Vec::new()),
            updates: AtomicUsize::new(0),
        }
    }
}

impl PreviewSink for RecordingSink {
    fn update_image(&self, image: &PixelBuffer) {
        self.received.lock().push(image.dims());
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn preview_size(&self) -> (usize, usize) {
        *self.wanted.lock()
    }
}

#[test]
fn preview_follows_the_requested_viewport_size() {
    let sink = Arc::new(RecordingSink::new(320, 240));
    let script = sweep_script(2000, 0.1, 900.0);
    let mut tracker = tracker_over(script, Some(sink.clone()));

    tracker.start_tracking().unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        sink.updates.load(Ordering::SeqCst) >= 3
    }));
    assert!(sink.received.lock().iter().all(|&d| d == (320, 240)));

    // The consumer asks for a different viewport; the next published
    // bitmap must match it exactly.
    *sink.wanted.lock() = (200, 150);
    let seen = sink.updates.load(Ordering::SeqCst);
    assert!(wait_for(Duration::from_secs(2), || {
        sink.updates.load(Ordering::SeqCst) > seen + 1
    }));
    tracker.stop_tracking();

    let received = sink.received.lock();
    assert_eq!(*received.last().unwrap(), (200, 150));
}
