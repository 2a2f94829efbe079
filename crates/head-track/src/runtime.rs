//! The capture-track worker loop and its thread-safe front end.
//!
//! Exactly one dedicated worker thread runs the loop; every other
//! operation ([`Tracker::pose`], [`Tracker::center`], [`Tracker::set_fov`],
//! ...) may be invoked concurrently from caller threads.
//!
//! Three independent lock domains, never nested into a cycle:
//!
//! - the **camera** lock serializes every call into the [`FrameSource`]
//!   and is released before the solve step;
//! - the **solver** lock wraps `track`/`reset_state`, so a re-center
//!   cannot interleave with an in-progress solve;
//! - the pose store's lock is the innermost and only ever held for a
//!   value copy.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use nalgebra::Vector3;
use parking_lot::Mutex;

use head_track_core::{pose_data, Affine, CameraInfo, Point2D, PointModel, PoseData};
use head_track_solver::PointTracker;

use crate::api::{FrameSource, PointExtractor, PreviewSink};
use crate::buffer::{Frame, PixelBuffer};
use crate::config::TrackerConfig;
use crate::store::PoseStore;

const HEAD_MARKER: [u8; 4] = [255, 0, 0, 255];
/// Head positions closer than this to the image plane are not drawn, mm.
const MIN_DRAW_DEPTH: f64 = 0.1;

/// Errors reported synchronously by [`Tracker::start_tracking`].
#[derive(thiserror::Error, Debug)]
pub enum StartError {
    #[error("camera {name:?} failed to open")]
    CameraOpenFailed { name: String },
    #[error("tracker is already running")]
    AlreadyRunning,
    #[error("failed to spawn the capture thread")]
    Spawn(#[from] std::io::Error),
}

/// State shared between the worker loop and caller threads.
struct Shared {
    camera: Mutex<Box<dyn FrameSource>>,
    solver: Mutex<PointTracker>,
    store: PoseStore,
    interrupt: AtomicBool,
    point_count: AtomicUsize,
    ever_tracked: AtomicBool,

    config: TrackerConfig,
    model: PointModel,
    head_offset: Vector3<f64>,

    /// Worker-exclusive resources, parked here between sessions.
    kit: Mutex<Option<WorkerKit>>,
}

/// Resources owned by the worker thread while the loop runs.
struct WorkerKit {
    extractor: Box<dyn PointExtractor>,
    preview: Option<Arc<dyn PreviewSink>>,
    frame: Frame,
    preview_image: PixelBuffer,
    points: Vec<Point2D>,
}

/// Front end of the capture-track loop.
///
/// Owns the worker thread. All accessors take `&self` and are safe to
/// call from any thread while the loop runs; starting and stopping take
/// `&mut self`.
pub struct Tracker {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Compose a tracker from its collaborators.
    ///
    /// Fails when the configured model geometry is degenerate.
    pub fn new(
        config: TrackerConfig,
        camera: Box<dyn FrameSource>,
        extractor: Box<dyn PointExtractor>,
        preview: Option<Arc<dyn PreviewSink>>,
    ) -> Result<Self, head_track_core::ModelError> {
        let model = config.model()?;
        let head_offset = config.head_offset_vector();

        let (pw, ph) = preview
            .as_ref()
            .map(|sink| sink.preview_size())
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or((320, 240));

        let kit = WorkerKit {
            extractor,
            preview,
            frame: Frame::new(),
            preview_image: PixelBuffer::new(pw, ph),
            points: Vec::new(),
        };

        Ok(Self {
            shared: Arc::new(Shared {
                camera: Mutex::new(camera),
                solver: Mutex::new(PointTracker::new()),
                store: PoseStore::new(),
                interrupt: AtomicBool::new(false),
                point_count: AtomicUsize::new(0),
                ever_tracked: AtomicBool::new(false),
                config,
                model,
                head_offset,
                kit: Mutex::new(Some(kit)),
            }),
            worker: None,
        })
    }

    /// Open the camera and enter the running state.
    ///
    /// Device-open failure is reported synchronously and leaves the
    /// tracker stopped.
    pub fn start_tracking(&mut self) -> Result<(), StartError> {
        if self.worker.is_some() {
            return Err(StartError::AlreadyRunning);
        }
        let Some(kit) = self.shared.kit.lock().take() else {
            return Err(StartError::AlreadyRunning);
        };

        let config = &self.shared.config;
        let opened = {
            let mut camera = self.shared.camera.lock();
            let opened = camera.start(
                &config.camera_name,
                config.fps,
                config.res_x,
                config.res_y,
            );
            if opened {
                camera.set_fov(config.fov as i32);
            }
            opened
        };
        if !opened {
            *self.shared.kit.lock() = Some(kit);
            log::warn!("camera {:?} failed to open", config.camera_name);
            return Err(StartError::CameraOpenFailed {
                name: config.camera_name.clone(),
            });
        }

        self.shared.interrupt.store(false, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("head-track".into())
            .spawn(move || run_loop(&shared, kit))?;
        self.worker = Some(handle);
        Ok(())
    }

    /// Request interruption, wait for the worker to exit and release the
    /// camera. The last successfully solved pose stays readable.
    pub fn stop_tracking(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        self.shared.interrupt.store(true, Ordering::Relaxed);
        if handle.join().is_err() {
            log::warn!("capture thread terminated abnormally");
            // the worker did not get to release the camera
            self.shared.camera.lock().stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Snapshot of the most recent stable pose.
    pub fn pose(&self) -> Affine {
        self.shared.store.get()
    }

    /// Consumer output `[yaw, pitch, roll, x, y, z]` (degrees /
    /// centimetres) for the head center, or `None` before the first
    /// successful solve.
    pub fn pose_data(&self) -> Option<PoseData> {
        if !self.shared.ever_tracked.load(Ordering::Relaxed) {
            return None;
        }
        let head = self.shared.store.get() * Affine::translation(self.shared.head_offset);
        Some(pose_data(&head))
    }

    /// Number of points detected in the most recent frame.
    pub fn point_count(&self) -> usize {
        self.shared.point_count.load(Ordering::Relaxed)
    }

    /// Re-center: forget the solver's continuity reference. The published
    /// pose is untouched.
    pub fn center(&self) {
        self.shared.solver.lock().reset_state();
    }

    /// Live adjustment of the camera field of view, degrees.
    pub fn set_fov(&self, degrees: i32) {
        self.shared.camera.lock().set_fov(degrees);
    }

    /// Camera parameters as reported by the device, if open.
    pub fn camera_info(&self) -> Option<CameraInfo> {
        self.shared.camera.lock().get_info()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}

fn run_loop(shared: &Shared, mut kit: WorkerKit) {
    log::debug!("capture loop started");

    loop {
        if shared.interrupt.load(Ordering::Relaxed) {
            break;
        }

        // Camera lock: held for the device call only, released before the
        // solve step.
        let (new_frame, info) = shared.camera.lock().get_frame(&mut kit.frame);
        if !new_frame {
            // Transient or permanent device silence looks the same from
            // here; keep polling either way.
            continue;
        }

        // Snapshot the raw frame before extraction annotates anything.
        let previewing = kit.preview.is_some();
        if previewing {
            kit.preview_image.upload_gray(&kit.frame);
        }

        kit.points.clear();
        let preview = if previewing {
            Some(&mut kit.preview_image)
        } else {
            None
        };
        kit.extractor.extract_points(&kit.frame, preview, &mut kit.points);
        shared.point_count.store(kit.points.len(), Ordering::Relaxed);

        // Solver lock wraps the solve; the store's lock nests innermost
        // for the publish copy.
        let pose = {
            let mut solver = shared.solver.lock();
            if kit.points.len() >= 3 {
                let budget = if shared.config.dynamic_pose {
                    shared.config.init_phase_timeout_ms
                } else {
                    0
                };
                if solver.track(&kit.points, &shared.model, &info, budget) {
                    shared.ever_tracked.store(true, Ordering::Relaxed);
                    shared.store.set(solver.pose());
                }
            }
            solver.pose()
        };

        if let Some(sink) = &kit.preview {
            let head = pose * Affine::translation(shared.head_offset);
            if head.t.z > MIN_DRAW_DEPTH {
                let focal = info.focal_length();
                let (w, h) = kit.preview_image.dims();
                let x = (head.t.x * focal / head.t.z + 0.5) * w as f64;
                let y = head.t.y * focal / head.t.z * w as f64 + 0.5 * h as f64;
                kit.preview_image.draw_cross(x as f32, y as f32, HEAD_MARKER);
            }
            sink.update_image(&kit.preview_image);

            let wanted = sink.preview_size();
            if wanted != kit.preview_image.dims() && wanted.0 > 0 && wanted.1 > 0 {
                log::debug!("preview resized to {}x{}", wanted.0, wanted.1);
                kit.preview_image = PixelBuffer::new(wanted.0, wanted.1);
            }
        }
    }

    shared.camera.lock().stop();
    log::debug!("capture loop stopped");
    *shared.kit.lock() = Some(kit);
}
