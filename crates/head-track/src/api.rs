//! Boundary traits to the camera driver, the point extractor and the
//! preview renderer.
//!
//! Implementations are selected and composed explicitly at startup
//! (constructor injection); there is no runtime plugin registry.

use head_track_core::{CameraInfo, Point2D};

use crate::buffer::{Frame, PixelBuffer};

/// A camera driver delivering timestamped frames on demand.
pub trait FrameSource: Send {
    /// Open the device. Returns `false` when the device cannot be opened;
    /// the tracker then stays stopped.
    fn start(&mut self, name: &str, fps: u32, res_x: u32, res_y: u32) -> bool;

    /// Release the device. Idempotent.
    fn stop(&mut self);

    /// Fill `frame` with the next capture. May block on device I/O.
    ///
    /// Returns whether a new frame was produced, plus the camera
    /// parameters in effect for that frame. A device that has gone away
    /// keeps answering `false`; the capture loop keeps polling.
    fn get_frame(&mut self, frame: &mut Frame) -> (bool, CameraInfo);

    /// Current camera parameters, if the device is open.
    fn get_info(&self) -> Option<CameraInfo>;

    /// Reconfigure the diagonal field of view, degrees.
    fn set_fov(&mut self, degrees: i32);
}

/// Detects marker points in a frame.
pub trait PointExtractor: Send {
    /// Append the detected points (pixel coordinates) to `points`.
    ///
    /// When `preview` is given it already holds a snapshot of the raw
    /// frame; the extractor may annotate it with its detections.
    fn extract_points(
        &mut self,
        frame: &Frame,
        preview: Option<&mut PixelBuffer>,
        points: &mut Vec<Point2D>,
    );
}

/// Consumer of the annotated preview stream.
pub trait PreviewSink: Send + Sync {
    /// Publish the annotated preview image.
    fn update_image(&self, image: &PixelBuffer);

    /// Viewport size the consumer currently wants, polled once per
    /// iteration. The next published image matches a changed size.
    fn preview_size(&self) -> (usize, usize);
}
