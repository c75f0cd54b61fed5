//! Render backends and the capture pass
//!
//! A capture repositions the shared camera for each planned view, submits a
//! render, blocks until the backend confirms that exact frame is complete and
//! reads it back. Views are processed strictly one after another, and the
//! camera and orbit controller are put back afterwards whether or not the
//! pass succeeded.

use std::io::Cursor;
use std::time::Duration;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info, warn};

use crate::camera::{OrbitController, ViewCamera};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::framing::{CapturePlan, ViewLabel, ViewPose, plan_default, plan_focused};
use crate::surface::SurfaceRegistry;
use crate::touched::TouchedVertexSet;

/// Handle for one submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTicket(pub u64);

/// A renderer that can draw the scene and hand back the pixels.
pub trait RenderBackend {
    /// False when the framebuffer is not preserved after presenting, so
    /// nothing can be read back.
    fn supports_read_back(&self) -> bool;

    /// Render the scene from `camera`.
    fn submit(
        &mut self,
        scene: &SurfaceRegistry,
        camera: &ViewCamera,
    ) -> Result<FrameTicket, CaptureError>;

    /// Block until the frame behind `ticket` is confirmed complete.
    fn wait_for_frame(&mut self, ticket: FrameTicket, timeout: Duration)
    -> Result<(), CaptureError>;

    /// Pixels of a completed frame. Only the most recent frame is readable.
    fn read_back(&mut self, ticket: FrameTicket) -> Result<RgbaImage, CaptureError>;
}

/// One captured view
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub label: ViewLabel,
    pub image: RgbaImage,
}

impl CaptureFrame {
    /// PNG-encode the image.
    pub fn encode_png(&self) -> Result<Vec<u8>, CaptureError> {
        let mut bytes = Cursor::new(Vec::new());
        self.image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

/// Result of a capture pass: the plan that was used and one frame per view,
/// in plan order.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub plan: CapturePlan,
    pub frames: Vec<CaptureFrame>,
}

impl CaptureSession {
    pub fn encode_png(&self) -> Result<Vec<Vec<u8>>, CaptureError> {
        self.frames.iter().map(CaptureFrame::encode_png).collect()
    }
}

/// Plans and runs capture passes.
#[derive(Debug, Clone, Default)]
pub struct CaptureService {
    pub config: CaptureConfig,
}

impl CaptureService {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Choose between focused and default framing.
    ///
    /// Focused framing needs a paintable surface, at least one touched vertex
    /// and a bounding box with usable extent; anything else falls back to the
    /// default views around the camera target.
    pub fn plan(
        &self,
        registry: &SurfaceRegistry,
        touched: &TouchedVertexSet,
        camera: &ViewCamera,
    ) -> CapturePlan {
        let state = camera.state();
        let Some(surface) = registry.paintable() else {
            info!("No paintable surface, capturing default views");
            return CapturePlan::Default(plan_default(&state));
        };
        if touched.is_empty() {
            info!("Nothing painted, capturing default views");
            return CapturePlan::Default(plan_default(&state));
        }

        let points = touched.world_points(surface);
        match plan_focused(&points, camera.fov_y, self.config.padding) {
            Ok(frame) => {
                debug!(
                    "Focused capture on {} points, centre {:?}, distance {:.3}",
                    points.len(),
                    frame.center,
                    frame.distance
                );
                if frame.inside_near_plane(camera.near) {
                    debug!(
                        "Focused distance {:.3} is inside the near plane {:.3}, views will be clipped",
                        frame.distance, camera.near
                    );
                }
                CapturePlan::Focused(frame)
            }
            Err(err) => {
                warn!("{}, capturing default views", err);
                CapturePlan::Default(plan_default(&state))
            }
        }
    }

    /// Run a full capture pass.
    ///
    /// Fails with [`CaptureError::Unavailable`] before touching the camera if
    /// the backend cannot read back.
    pub fn capture<R: RenderBackend>(
        &self,
        renderer: &mut R,
        registry: &SurfaceRegistry,
        touched: &TouchedVertexSet,
        camera: &mut ViewCamera,
        orbit: &mut OrbitController,
    ) -> Result<CaptureSession, CaptureError> {
        if !renderer.supports_read_back() {
            return Err(CaptureError::Unavailable(
                "renderer does not preserve its framebuffer for read-back".to_string(),
            ));
        }

        let original = camera.state();
        let plan = self.plan(registry, touched, camera);

        let frames = self.render_views(renderer, registry, camera, orbit, plan.views());

        camera.restore(&original);
        orbit.sync_from(camera);

        let frames = frames?;
        info!(
            "Captured {} {} views",
            frames.len(),
            if plan.is_focused() { "focused" } else { "default" }
        );
        Ok(CaptureSession { plan, frames })
    }

    fn render_views<R: RenderBackend>(
        &self,
        renderer: &mut R,
        registry: &SurfaceRegistry,
        camera: &mut ViewCamera,
        orbit: &mut OrbitController,
        views: &[ViewPose],
    ) -> Result<Vec<CaptureFrame>, CaptureError> {
        let timeout = Duration::from_millis(self.config.frame_timeout_ms);
        // Framing assumes the unzoomed field of view
        camera.zoom = 1.0;

        let mut frames = Vec::with_capacity(views.len());
        for view in views {
            camera.look_from(view.position, view.target);
            orbit.sync_from(camera);

            let ticket = renderer.submit(registry, camera)?;
            renderer.wait_for_frame(ticket, timeout)?;
            let image = renderer.read_back(ticket)?;
            debug!("Captured {} view ({:?})", view.label.as_str(), ticket);

            frames.push(CaptureFrame {
                label: view.label,
                image,
            });
        }
        Ok(frames)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::camera::CameraState;

    /// Backend that records the camera of every submitted frame.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub read_back_supported: bool,
        pub fail_on_submit: Option<usize>,
        pub submitted: Vec<CameraState>,
        pub waited: Vec<FrameTicket>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self {
                read_back_supported: true,
                ..Default::default()
            }
        }
    }

    impl RenderBackend for RecordingBackend {
        fn supports_read_back(&self) -> bool {
            self.read_back_supported
        }

        fn submit(
            &mut self,
            _scene: &SurfaceRegistry,
            camera: &ViewCamera,
        ) -> Result<FrameTicket, CaptureError> {
            if self.fail_on_submit == Some(self.submitted.len()) {
                return Err(CaptureError::RenderTimeout {
                    ticket: self.submitted.len() as u64,
                    timeout_ms: 0,
                });
            }
            self.submitted.push(camera.state());
            Ok(FrameTicket(self.submitted.len() as u64))
        }

        fn wait_for_frame(
            &mut self,
            ticket: FrameTicket,
            _timeout: Duration,
        ) -> Result<(), CaptureError> {
            self.waited.push(ticket);
            Ok(())
        }

        fn read_back(&mut self, ticket: FrameTicket) -> Result<RgbaImage, CaptureError> {
            Ok(RgbaImage::from_pixel(2, 2, image::Rgba([ticket.0 as u8, 0, 0, 255])))
        }
    }
}
