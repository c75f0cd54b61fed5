//! The paint engine
//!
//! This module connects:
//! - Pointer input (NDC position + camera) turned into a world-space ray
//! - Hit-testing against every surface in the registry
//! - Falloff blending of the brush colour into nearby vertices
//! - Touched-vertex bookkeeping for framing
//! - Lazy per-stroke colour snapshots for undo
//!
//! The engine does not own the surfaces; operations take the registry so the
//! session decides what is painted.

mod stroke;
mod undo;

use crate::brush::BrushState;
use crate::config::{BrushConfig, HistoryConfig};
use crate::history::HistoryStack;
use crate::spatial::VertexGrid;
use crate::touched::TouchedVertexSet;

/// Bookkeeping for the gesture in progress.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StrokeState {
    pub(crate) stroke_id: u64,
    /// Whether this stroke already pushed its history snapshot
    pub(crate) snapshot_taken: bool,
}

/// Paint engine for the paintable surface of a registry
///
/// Workflow:
/// 1. `begin_stroke` opens a gesture (only in paint mode)
/// 2. `paint_at` blends colour at the pointer; the first call that changes
///    anything snapshots the colours for undo
/// 3. `end_stroke` closes the gesture
/// 4. `undo` restores the colours of the last gesture that painted
#[derive(Debug)]
pub struct PaintEngine {
    pub(crate) brush: BrushState,
    pub(crate) paint_mode: bool,
    pub(crate) stroke: Option<StrokeState>,
    pub(crate) touched: TouchedVertexSet,
    pub(crate) history: HistoryStack,
    pub(crate) grid: VertexGrid,
    pub(crate) next_stroke_id: u64,
}

impl PaintEngine {
    pub fn new(brush: &BrushConfig, history: &HistoryConfig) -> Self {
        let brush = BrushState::from_config(brush);
        Self {
            grid: VertexGrid::new(brush.max_radius()),
            brush,
            paint_mode: false,
            stroke: None,
            touched: TouchedVertexSet::new(),
            history: HistoryStack::new(history.max_levels),
            next_stroke_id: 1,
        }
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushState {
        &mut self.brush
    }

    pub fn paint_mode(&self) -> bool {
        self.paint_mode
    }

    /// Toggle paint mode. Leaving paint mode ends any active stroke.
    pub fn set_paint_mode(&mut self, enabled: bool) {
        if !enabled && self.stroke.is_some() {
            self.end_stroke();
        }
        self.paint_mode = enabled;
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn touched(&self) -> &TouchedVertexSet {
        &self.touched
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Forget everything tied to the current paintable surface.
    ///
    /// Called when a different model is installed.
    pub fn reset(&mut self) {
        self.stroke = None;
        self.touched.clear();
        self.history.clear();
        self.grid.invalidate();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;

    use crate::surface::{MainMesh, Surface, SurfaceRegistry};

    /// A flat grid of `n x n` vertices in the XY plane at z=0, spacing `step`,
    /// centred on the origin.
    pub fn plane(n: u32, step: f32) -> Surface {
        let half = (n - 1) as f32 * step * 0.5;
        let mut positions = Vec::new();
        for y in 0..n {
            for x in 0..n {
                positions.push(Vec3::new(x as f32 * step - half, y as f32 * step - half, 0.0));
            }
        }
        let mut indices = Vec::new();
        for y in 0..n - 1 {
            for x in 0..n - 1 {
                let i = y * n + x;
                indices.extend_from_slice(&[i, i + 1, i + n + 1, i, i + n + 1, i + n]);
            }
        }
        Surface::new("body", positions, None, indices).unwrap()
    }

    pub fn registry_with_plane() -> SurfaceRegistry {
        let mut registry = SurfaceRegistry::new();
        registry
            .replace_model("test", vec![plane(21, 0.02)], &MainMesh::First)
            .unwrap();
        registry
    }
}
