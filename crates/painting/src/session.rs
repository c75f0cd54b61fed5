//! The paint session
//!
//! [`PaintSession`] owns everything a viewer needs: the surfaces, the paint
//! engine, the one camera with its orbit controller, and the renderer used
//! for captures. Every user-facing operation goes through it, so painting,
//! navigation and capture never share state behind each other's backs.

use std::path::{Path, PathBuf};

use glam::Vec2;
use tracing::{debug, info, warn};

use crate::camera::{OrbitController, ViewCamera, pointer_to_ndc};
use crate::capture::{CaptureService, CaptureSession, RenderBackend};
use crate::config::SessionConfig;
use crate::error::{AssetLoadError, CaptureError, NormalizeError};
use crate::loader::{LoadedModel, load_model};
use crate::normalize::{NormalizeReport, normalize_surfaces};
use crate::pipeline::PaintEngine;
use crate::raster::SoftwareRenderer;
use crate::surface::{MainMesh, Surface, SurfaceRegistry};
use crate::types::{PaintOutcome, SurfaceId};

/// Whether a model was rescaled on install.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    Applied(NormalizeReport),
    /// The model is used as-is
    Skipped(NormalizeError),
}

/// Summary of an installed model.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: PathBuf,
    pub meshes: Vec<String>,
    pub paintable: SurfaceId,
    pub normalization: Normalization,
}

/// One viewer session.
pub struct PaintSession<R: RenderBackend> {
    config: SessionConfig,
    registry: SurfaceRegistry,
    engine: PaintEngine,
    camera: ViewCamera,
    orbit: OrbitController,
    renderer: R,
    capture: CaptureService,
}

impl PaintSession<SoftwareRenderer> {
    /// Session that captures with the CPU renderer.
    pub fn with_software_renderer(config: SessionConfig) -> Self {
        let renderer = SoftwareRenderer::from_config(&config.capture, config.display.background);
        Self::new(config, renderer)
    }
}

impl<R: RenderBackend> PaintSession<R> {
    pub fn new(config: SessionConfig, renderer: R) -> Self {
        let camera = ViewCamera::from_config(&config.camera, config.display.aspect_ratio());
        let orbit = OrbitController::from_config(&config.camera);
        let engine = PaintEngine::new(&config.brush, &config.history);
        let capture = CaptureService::new(config.capture.clone());

        Self {
            config,
            registry: SurfaceRegistry::new(),
            engine,
            camera,
            orbit,
            renderer,
            capture,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &PaintEngine {
        &self.engine
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub fn orbit_controller(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    // ---- Models ----

    /// Main mesh designation from the config.
    pub fn main_mesh(&self) -> MainMesh {
        MainMesh::from(self.config.main_mesh.clone())
    }

    /// Load a model from disk and make it the painted model.
    ///
    /// Blocks on file I/O. Viewers should run [`load_model`] on a worker and
    /// pass the result to [`PaintSession::install_model`].
    pub fn load_model(&mut self, path: &Path) -> Result<LoadReport, AssetLoadError> {
        let model = load_model(path)?;
        let designation = self.main_mesh();
        self.install_model(model, &designation)
    }

    /// Install a decoded model.
    ///
    /// On error the previous model, its paint, touched vertices and history
    /// are all kept. On success they are discarded.
    pub fn install_model(
        &mut self,
        model: LoadedModel,
        designation: &MainMesh,
    ) -> Result<LoadReport, AssetLoadError> {
        let source = model.source.clone();
        let mut surfaces = model.into_surfaces()?;

        let normalization = match normalize_surfaces(&mut surfaces, &self.config.normalize) {
            Ok(report) => Normalization::Applied(report),
            Err(err) => {
                warn!("{}, skipping normalization of {:?}", err, source);
                Normalization::Skipped(err)
            }
        };
        let meshes: Vec<String> = surfaces.iter().map(|s| s.name.clone()).collect();

        let paintable =
            self.registry
                .replace_model(&source.display().to_string(), surfaces, designation)?;
        self.engine.reset();

        Ok(LoadReport {
            source,
            meshes,
            paintable,
            normalization,
        })
    }

    /// Add non-paintable geometry such as a ground plane.
    pub fn add_scenery(&mut self, surface: Surface) -> SurfaceId {
        self.registry.add_scenery(surface)
    }

    // ---- Painting ----

    pub fn paint_mode(&self) -> bool {
        self.engine.paint_mode()
    }

    pub fn set_paint_mode(&mut self, enabled: bool) {
        self.engine.set_paint_mode(enabled);
        info!("Paint mode {}", if enabled { "on" } else { "off" });
    }

    /// Set the brush from a UI slider value and return the new world radius.
    pub fn set_brush_radius(&mut self, ui_value: i32) -> f32 {
        let brush = self.engine.brush_mut();
        brush.set_ui_value(ui_value);
        debug!("Brush UI value {} -> radius {:.4}", brush.ui_value(), brush.radius);
        brush.radius
    }

    pub fn begin_stroke(&mut self) -> bool {
        self.engine.begin_stroke()
    }

    /// Paint at a pointer position in normalized device coordinates.
    pub fn paint_at(&mut self, ndc: Vec2) -> PaintOutcome {
        self.engine.paint_at(&mut self.registry, &self.camera, ndc)
    }

    /// Paint at a cursor position in window pixels.
    pub fn paint_pointer(&mut self, cursor: Vec2, viewport: Vec2) -> PaintOutcome {
        self.paint_at(pointer_to_ndc(cursor, viewport))
    }

    pub fn end_stroke(&mut self) -> bool {
        self.engine.end_stroke()
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo(&mut self.registry)
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    // ---- Navigation ----

    /// Orbit the camera by a mouse drag. Ignored in paint mode.
    pub fn orbit(&mut self, delta: Vec2) -> bool {
        if self.engine.paint_mode() {
            return false;
        }
        self.orbit.orbit(delta);
        self.orbit.apply(&mut self.camera);
        true
    }

    /// Dolly towards the target by scroll lines. Ignored in paint mode.
    pub fn dolly(&mut self, lines: f32) -> bool {
        if self.engine.paint_mode() {
            return false;
        }
        self.orbit.dolly(lines);
        self.orbit.apply(&mut self.camera);
        true
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.camera.zoom * self.config.camera.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.camera.zoom / self.config.camera.zoom_step)
    }

    fn set_zoom(&mut self, zoom: f32) -> f32 {
        let camera = &self.config.camera;
        self.camera.zoom = zoom.clamp(camera.min_zoom, camera.max_zoom.max(camera.min_zoom));
        self.camera.zoom
    }

    /// Track the viewport size so pointer rays match what is on screen.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.camera.aspect = width / height;
        }
    }

    // ---- Capture ----

    /// Capture the annotated region, or the default views when nothing is
    /// painted. An active stroke is closed first.
    pub fn capture(&mut self) -> Result<CaptureSession, CaptureError> {
        if self.engine.is_stroke_active() {
            info!("Capture requested mid-stroke, ending the stroke");
            self.engine.end_stroke();
        }
        self.capture.capture(
            &mut self.renderer,
            &self.registry,
            self.engine.touched(),
            &mut self.camera,
            &mut self.orbit,
        )
    }

    /// Capture and PNG-encode every frame, in capture order.
    pub fn capture_png(&mut self) -> Result<Vec<Vec<u8>>, CaptureError> {
        self.capture()?.encode_png()
    }
}
