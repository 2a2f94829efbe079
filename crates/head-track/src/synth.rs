//! Synthetic capture stack: a scripted camera and a centroid extractor.
//!
//! Renders a 3-point rig through a scripted pose sequence so the whole
//! capture loop can run without hardware. Used by the integration tests
//! and the demo binary; also a template for real [`FrameSource`] /
//! [`PointExtractor`] implementations.

use std::time::Duration;

use nalgebra::{Point2, Rotation3, Vector2, Vector3};

use head_track_core::{Affine, CameraInfo, Point2D, PointModel};

use crate::api::{FrameSource, PointExtractor};
use crate::buffer::{Frame, PixelBuffer};

const POINT_MARKER: [u8; 4] = [0, 255, 0, 255];

/// A yaw sweep at constant depth, `frames` poses from `-max_yaw` to
/// `+max_yaw` radians.
pub fn sweep_script(frames: usize, max_yaw: f64, depth: f64) -> Vec<Affine> {
    (0..frames)
        .map(|i| {
            let s = if frames > 1 {
                i as f64 / (frames - 1) as f64
            } else {
                0.5
            };
            let yaw = max_yaw * (2.0 * s - 1.0);
            Affine::new(
                Rotation3::from_euler_angles(0.0, yaw, 0.0).into_inner(),
                Vector3::new(0.0, 0.0, depth),
            )
        })
        .collect()
}

/// Scripted camera: renders the model through a pose sequence, one pose
/// per frame, then reports "no new frame" forever (a vanished device).
pub struct SyntheticCamera {
    info: CameraInfo,
    model_points: [Vector3<f64>; 3],
    script: Vec<Affine>,
    cursor: usize,
    started: bool,
    refuse_start: bool,
    frame_delay: Duration,
}

impl SyntheticCamera {
    pub fn new(model: &PointModel, script: Vec<Affine>) -> Self {
        Self {
            info: CameraInfo::default(),
            model_points: [Vector3::zeros(), model.m01(), model.m02()],
            script,
            cursor: 0,
            started: false,
            refuse_start: false,
            frame_delay: Duration::from_millis(1),
        }
    }

    /// A camera whose device cannot be opened; `start` always fails.
    pub fn unavailable() -> Self {
        Self {
            info: CameraInfo::default(),
            model_points: [Vector3::zeros(); 3],
            script: Vec::new(),
            cursor: 0,
            started: false,
            refuse_start: true,
            frame_delay: Duration::ZERO,
        }
    }

    /// Poses not yet delivered.
    pub fn remaining(&self) -> usize {
        self.script.len() - self.cursor
    }

    fn render(&self, pose: &Affine, frame: &mut Frame) {
        frame.resize(self.info.res_x as usize, self.info.res_y as usize);
        frame.data.fill(0);

        let focal = self.info.focal_length();
        let w = frame.width as f64;
        let h = frame.height as f64;

        for m in &self.model_points {
            let p = *pose * *m;
            if p.z <= 0.0 {
                continue;
            }
            let n = Vector2::new(p.x, p.y) * (focal / p.z);
            let cx = (n.x * w + 0.5 * w).round() as i64;
            let cy = (n.y * w + 0.5 * h).round() as i64;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let (x, y) = (cx + dx, cy + dy);
                    if x >= 0 && y >= 0 && (x as usize) < frame.width && (y as usize) < frame.height
                    {
                        frame.data[y as usize * frame.width + x as usize] = 255;
                    }
                }
            }
        }
    }
}

impl FrameSource for SyntheticCamera {
    fn start(&mut self, _name: &str, fps: u32, res_x: u32, res_y: u32) -> bool {
        if self.refuse_start {
            return false;
        }
        self.info.fps = fps;
        self.info.res_x = res_x;
        self.info.res_y = res_y;
        self.started = true;
        true
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn get_frame(&mut self, frame: &mut Frame) -> (bool, CameraInfo) {
        // models the blocking device read
        std::thread::sleep(self.frame_delay);

        if !self.started || self.cursor >= self.script.len() {
            return (false, self.info);
        }
        let pose = self.script[self.cursor];
        self.cursor += 1;
        self.render(&pose, frame);
        (true, self.info)
    }

    fn get_info(&self) -> Option<CameraInfo> {
        self.started.then_some(self.info)
    }

    fn set_fov(&mut self, degrees: i32) {
        self.info.fov = f64::from(degrees);
    }
}

/// Brightness-threshold centroid extractor.
///
/// Groups bright pixels into clusters by distance to the running cluster
/// centroid and reports one point per cluster, in scan order.
#[derive(Clone, Debug)]
pub struct SyntheticExtractor {
    pub threshold: u8,
    /// Pixels farther than this from a cluster centroid open a new
    /// cluster.
    pub cluster_radius: f32,
}

impl Default for SyntheticExtractor {
    fn default() -> Self {
        Self {
            threshold: 128,
            cluster_radius: 6.0,
        }
    }
}

struct Cluster {
    sum_x: f64,
    sum_y: f64,
    count: usize,
}

impl Cluster {
    fn centroid(&self) -> (f32, f32) {
        (
            (self.sum_x / self.count as f64) as f32,
            (self.sum_y / self.count as f64) as f32,
        )
    }
}

impl PointExtractor for SyntheticExtractor {
    fn extract_points(
        &mut self,
        frame: &Frame,
        preview: Option<&mut PixelBuffer>,
        points: &mut Vec<Point2D>,
    ) {
        let mut clusters: Vec<Cluster> = Vec::new();
        let r2 = f64::from(self.cluster_radius) * f64::from(self.cluster_radius);

        for y in 0..frame.height {
            for x in 0..frame.width {
                if frame.data[y * frame.width + x] < self.threshold {
                    continue;
                }
                let (fx, fy) = (x as f64, y as f64);
                match clusters.iter_mut().find(|c| {
                    let (cx, cy) = c.centroid();
                    let (dx, dy) = (fx - f64::from(cx), fy - f64::from(cy));
                    dx * dx + dy * dy <= r2
                }) {
                    Some(c) => {
                        c.sum_x += fx;
                        c.sum_y += fy;
                        c.count += 1;
                    }
                    None => clusters.push(Cluster {
                        sum_x: fx,
                        sum_y: fy,
                        count: 1,
                    }),
                }
            }
        }

        for c in &clusters {
            let (cx, cy) = c.centroid();
            points.push(Point2::new(cx, cy));
        }

        if let Some(preview) = preview {
            let (pw, ph) = preview.dims();
            if frame.width > 0 && frame.height > 0 {
                for p in points.iter() {
                    let x = p.x * pw as f32 / frame.width as f32;
                    let y = p.y * ph as f32 / frame.height as f32;
                    preview.draw_cross(x, y, POINT_MARKER);
                }
            }
        }
    }
}
