//! Stroke handling for the paint engine

use glam::Vec2;
use tracing::debug;

use crate::brush::{blend, falloff_weight};
use crate::camera::ViewCamera;
use crate::raycast::Ray;
use crate::surface::SurfaceRegistry;
use crate::types::PaintOutcome;

use super::{PaintEngine, StrokeState};

impl PaintEngine {
    /// Begin a stroke
    ///
    /// Returns false (and does nothing) when paint mode is off. No snapshot is
    /// taken here; see [`PaintEngine::paint_ray`].
    pub fn begin_stroke(&mut self) -> bool {
        if !self.paint_mode {
            debug!("begin_stroke: paint mode is off, ignoring");
            return false;
        }
        if self.stroke.is_some() {
            self.end_stroke();
        }

        let stroke_id = self.next_stroke_id;
        self.next_stroke_id += 1;
        self.stroke = Some(StrokeState {
            stroke_id,
            snapshot_taken: false,
        });
        true
    }

    /// Paint at a pointer position given in normalized device coordinates.
    pub fn paint_at(
        &mut self,
        registry: &mut SurfaceRegistry,
        camera: &ViewCamera,
        ndc: Vec2,
    ) -> PaintOutcome {
        if self.stroke.is_none() {
            return PaintOutcome::Inactive;
        }
        let ray = camera.ray_from_ndc(ndc);
        self.paint_ray(registry, &ray)
    }

    /// Paint where a world-space ray first hits the scene.
    ///
    /// Hits on anything other than the paintable surface are no-ops. The
    /// stroke's history snapshot is pushed right before the first vertex is
    /// changed, so strokes that never paint leave no undo entry.
    pub fn paint_ray(&mut self, registry: &mut SurfaceRegistry, ray: &Ray) -> PaintOutcome {
        let Some(stroke) = self.stroke.as_mut() else {
            return PaintOutcome::Inactive;
        };

        let Some(hit) = registry.raycast(ray) else {
            debug!("paint: no intersection");
            return PaintOutcome::NoIntersection;
        };

        if registry.paintable_id() != Some(hit.surface) {
            debug!("paint: nearest hit is {}, not the paintable surface", hit.surface);
            return PaintOutcome::Occluded {
                surface: hit.surface,
            };
        }
        let Some(surface) = registry.paintable_mut() else {
            return PaintOutcome::NoIntersection;
        };

        self.grid.ensure_built(surface);
        let within = self.grid.query_radius(hit.world_pos, self.brush.radius);
        if within.is_empty() {
            return PaintOutcome::Painted { hit, vertices: 0 };
        }

        if !stroke.snapshot_taken {
            self.history
                .snapshot(surface.id, stroke.stroke_id, surface.colors());
            stroke.snapshot_taken = true;
        }

        let colors = surface.colors_mut();
        for &(index, distance) in &within {
            let weight = falloff_weight(self.brush.falloff, distance, self.brush.radius);
            let slot = &mut colors[index as usize];
            *slot = blend(*slot, self.brush.color, weight);

            if self.touched.insert(index) {
                self.history.record_touched(index);
            }
        }

        PaintOutcome::Painted {
            hit,
            vertices: within.len(),
        }
    }

    /// End the current stroke.
    ///
    /// Returns true if the stroke changed any colours.
    pub fn end_stroke(&mut self) -> bool {
        let Some(stroke) = self.stroke.take() else {
            return false;
        };
        debug!(
            "Ended stroke {} ({})",
            stroke.stroke_id,
            if stroke.snapshot_taken { "painted" } else { "no-op" }
        );
        stroke.snapshot_taken
    }
}
