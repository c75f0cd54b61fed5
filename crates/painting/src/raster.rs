//! Deterministic CPU renderer for captures
//!
//! Z-buffered, edge-function rasterization of vertex-coloured triangles with
//! one ambient and one directional light. Rendering is synchronous, so a
//! frame is complete as soon as `submit` returns; only the most recent frame
//! is kept for read-back.

use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::camera::ViewCamera;
use crate::capture::{FrameTicket, RenderBackend};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::surface::{Surface, SurfaceRegistry};
use crate::types::Rgb;

/// Clip-space w below which a vertex is treated as behind the camera
const MIN_CLIP_W: f32 = 1e-5;

/// CPU render backend.
#[derive(Debug)]
pub struct SoftwareRenderer {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub ambient: f32,
    pub directional: f32,
    /// Direction towards the light
    pub light_direction: Vec3,
    /// When false, frames are discarded after presenting and cannot be read back
    pub preserve_buffer: bool,
    latest: u64,
    frame: Option<(FrameTicket, RgbaImage)>,
}

struct Target {
    width: usize,
    height: usize,
    color: Vec<Rgb>,
    depth: Vec<f32>,
}

/// A triangle vertex after projection
#[derive(Clone, Copy)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
    color: Rgb,
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(
            &CaptureConfig {
                width,
                height,
                ..Default::default()
            },
            crate::config::DEFAULT_BACKGROUND,
        )
    }

    pub fn from_config(config: &CaptureConfig, background: Rgb) -> Self {
        Self {
            width: config.width.max(1),
            height: config.height.max(1),
            background,
            ambient: config.ambient,
            directional: config.directional,
            light_direction: Vec3::from(config.light_direction).normalize_or(Vec3::Y),
            preserve_buffer: true,
            latest: 0,
            frame: None,
        }
    }

    pub fn with_preserve_buffer(mut self, preserve: bool) -> Self {
        self.preserve_buffer = preserve;
        self
    }

    /// Render the scene from `camera` at this renderer's resolution.
    ///
    /// The camera's own aspect ratio is ignored in favour of the output size.
    pub fn render(&self, scene: &SurfaceRegistry, camera: &ViewCamera) -> RgbaImage {
        let aspect = self.width as f32 / self.height as f32;
        let view_projection = camera.projection_for_aspect(aspect) * camera.view_matrix();

        let mut target = Target {
            width: self.width as usize,
            height: self.height as usize,
            color: vec![self.background; (self.width * self.height) as usize],
            depth: vec![f32::INFINITY; (self.width * self.height) as usize],
        };

        for surface in scene.iter() {
            self.draw_surface(&mut target, surface, &view_projection, camera.position);
        }

        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = target.color[y as usize * target.width + x as usize];
            Rgba([to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), 255])
        })
    }

    fn draw_surface(
        &self,
        target: &mut Target,
        surface: &Surface,
        view_projection: &Mat4,
        eye: Vec3,
    ) {
        let model = surface.transform.matrix();
        let world: Vec<Vec3> = surface.world_positions().collect();
        let clip_from_local = *view_projection * Mat4::from(model);
        let colors = surface.colors();

        for tri in surface.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];

            let mut normal = (world[b] - world[a]).cross(world[c] - world[a]);
            if normal.length_squared() == 0.0 {
                continue;
            }
            normal = normal.normalize();
            // Two-sided lighting: face the normal towards the eye
            if normal.dot(eye - world[a]) < 0.0 {
                normal = -normal;
            }
            let intensity =
                self.ambient + self.directional * normal.dot(self.light_direction).max(0.0);

            let mut projected = [ScreenVertex {
                pos: Vec2::ZERO,
                depth: 0.0,
                color: [0.0; 3],
            }; 3];
            let mut visible = true;
            for (slot, &index) in projected.iter_mut().zip([a, b, c].iter()) {
                let clip = clip_from_local * surface.positions[index].extend(1.0);
                if clip.w <= MIN_CLIP_W {
                    visible = false;
                    break;
                }
                let ndc = clip.truncate() / clip.w;
                let color = colors[index];
                *slot = ScreenVertex {
                    pos: Vec2::new(
                        (ndc.x + 1.0) * 0.5 * target.width as f32,
                        (1.0 - ndc.y) * 0.5 * target.height as f32,
                    ),
                    depth: ndc.z,
                    color: [
                        color[0] * intensity,
                        color[1] * intensity,
                        color[2] * intensity,
                    ],
                };
            }
            if visible {
                rasterize(target, &projected);
            }
        }
    }
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn rasterize(target: &mut Target, v: &[ScreenVertex; 3]) {
    let area = edge(v[0].pos, v[1].pos, v[2].pos);
    if area.abs() < 1e-12 {
        return;
    }

    let min = v[0].pos.min(v[1].pos).min(v[2].pos).floor().max(Vec2::ZERO);
    let max = v[0]
        .pos
        .max(v[1].pos)
        .max(v[2].pos)
        .ceil()
        .min(Vec2::new(target.width as f32, target.height as f32));
    if min.x >= max.x || min.y >= max.y {
        return;
    }

    for y in min.y as usize..max.y as usize {
        for x in min.x as usize..max.x as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(v[1].pos, v[2].pos, p) / area;
            let w1 = edge(v[2].pos, v[0].pos, p) / area;
            let w2 = edge(v[0].pos, v[1].pos, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
            let slot = y * target.width + x;
            if !(0.0..=1.0).contains(&depth) || depth >= target.depth[slot] {
                continue;
            }
            target.depth[slot] = depth;
            target.color[slot] = [
                w0 * v[0].color[0] + w1 * v[1].color[0] + w2 * v[2].color[0],
                w0 * v[0].color[1] + w1 * v[1].color[1] + w2 * v[2].color[1],
                w0 * v[0].color[2] + w1 * v[1].color[2] + w2 * v[2].color[2],
            ];
        }
    }
}

impl RenderBackend for SoftwareRenderer {
    fn supports_read_back(&self) -> bool {
        self.preserve_buffer
    }

    fn submit(
        &mut self,
        scene: &SurfaceRegistry,
        camera: &ViewCamera,
    ) -> Result<FrameTicket, CaptureError> {
        self.latest += 1;
        let ticket = FrameTicket(self.latest);
        let image = self.render(scene, camera);
        self.frame = self.preserve_buffer.then_some((ticket, image));
        debug!("Rendered frame {}", ticket.0);
        Ok(ticket)
    }

    fn wait_for_frame(
        &mut self,
        ticket: FrameTicket,
        timeout: Duration,
    ) -> Result<(), CaptureError> {
        if ticket.0 > self.latest {
            return Err(CaptureError::RenderTimeout {
                ticket: ticket.0,
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    fn read_back(&mut self, ticket: FrameTicket) -> Result<RgbaImage, CaptureError> {
        if !self.preserve_buffer {
            return Err(CaptureError::Unavailable(
                "framebuffer was not preserved".to_string(),
            ));
        }
        match &self.frame {
            Some((held, image)) if *held == ticket => Ok(image.clone()),
            _ => Err(CaptureError::StaleFrame {
                requested: ticket.0,
                latest: self.latest,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::surface::{MainMesh, SurfaceTransform};

    fn quad(color: Rgb, z: f32, half: f32) -> Surface {
        Surface::new(
            "quad",
            vec![
                Vec3::new(-half, -half, 0.0),
                Vec3::new(half, -half, 0.0),
                Vec3::new(half, half, 0.0),
                Vec3::new(-half, half, 0.0),
            ],
            Some(vec![color; 4]),
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
        .with_transform(SurfaceTransform {
            translation: Vec3::new(0.0, 1.5, z),
            ..Default::default()
        })
    }

    fn camera() -> ViewCamera {
        ViewCamera::from_config(&CameraConfig::default(), 1.0)
    }

    fn centre(image: &RgbaImage) -> [u8; 4] {
        image.get_pixel(image.width() / 2, image.height() / 2).0
    }

    #[test]
    fn test_empty_scene_is_background() {
        let renderer = SoftwareRenderer::new(16, 12);
        let image = renderer.render(&SurfaceRegistry::new(), &camera());
        assert_eq!(image.dimensions(), (16, 12));
        assert!(image.pixels().all(|p| p.0 == [240, 240, 240, 255]));
    }

    #[test]
    fn test_lit_quad_covers_centre() {
        let mut scene = SurfaceRegistry::new();
        scene
            .replace_model("q", vec![quad([1.0, 0.0, 0.0], 0.0, 1.0)], &MainMesh::First)
            .unwrap();
        let image = SoftwareRenderer::new(32, 32).render(&scene, &camera());
        // Ambient 0.6 plus a lit face saturates the red channel
        assert_eq!(centre(&image), [255, 0, 0, 255]);
        // Corners stay background
        assert_eq!(image.get_pixel(0, 0).0, [240, 240, 240, 255]);
    }

    #[test]
    fn test_nearer_surface_occludes() {
        let mut scene = SurfaceRegistry::new();
        scene
            .replace_model("q", vec![quad([1.0, 0.0, 0.0], 0.0, 1.0)], &MainMesh::First)
            .unwrap();
        scene.add_scenery(quad([0.0, 0.0, 1.0], 2.0, 0.5));
        let image = SoftwareRenderer::new(32, 32).render(&scene, &camera());
        assert_eq!(centre(&image), [0, 0, 255, 255]);
    }

    #[test]
    fn test_back_face_is_lit() {
        let mut scene = SurfaceRegistry::new();
        scene
            .replace_model("q", vec![quad([0.0, 1.0, 0.0], 0.0, 1.0)], &MainMesh::First)
            .unwrap();
        let mut behind = camera();
        behind.look_from(Vec3::new(0.0, 1.5, -8.0), Vec3::new(0.0, 1.5, 0.0));
        let image = SoftwareRenderer::new(32, 32).render(&scene, &behind);
        let [r, g, b, _] = centre(&image);
        assert_eq!((r, b), (0, 0));
        assert!(g >= 150);
    }

    #[test]
    fn test_top_view_renders() {
        let mut scene = SurfaceRegistry::new();
        scene
            .replace_model("q", vec![quad([1.0, 1.0, 1.0], 0.0, 1.0)], &MainMesh::First)
            .unwrap();
        let mut top = camera();
        top.look_from(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 1.5, 0.0));
        let image = SoftwareRenderer::new(8, 8).render(&scene, &top);
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn test_read_back_latest_only() {
        let scene = SurfaceRegistry::new();
        let mut renderer = SoftwareRenderer::new(4, 4);
        let first = renderer.submit(&scene, &camera()).unwrap();
        let second = renderer.submit(&scene, &camera()).unwrap();

        renderer
            .wait_for_frame(second, Duration::from_millis(100))
            .unwrap();
        assert!(renderer.read_back(second).is_ok());
        assert!(matches!(
            renderer.read_back(first),
            Err(CaptureError::StaleFrame {
                requested: 1,
                latest: 2
            })
        ));
        assert!(matches!(
            renderer.wait_for_frame(FrameTicket(9), Duration::from_millis(100)),
            Err(CaptureError::RenderTimeout { ticket: 9, .. })
        ));
    }

    #[test]
    fn test_without_preserved_buffer_read_back_fails() {
        let scene = SurfaceRegistry::new();
        let mut renderer = SoftwareRenderer::new(4, 4).with_preserve_buffer(false);
        assert!(!renderer.supports_read_back());
        let ticket = renderer.submit(&scene, &camera()).unwrap();
        assert!(matches!(
            renderer.read_back(ticket),
            Err(CaptureError::Unavailable(_))
        ));
    }
}
