//! Undo for the paint engine

use tracing::{debug, warn};

use crate::surface::SurfaceRegistry;

use super::PaintEngine;

impl PaintEngine {
    /// Undo the last stroke that changed colours.
    ///
    /// Restores the paintable surface's colours to the snapshot and retracts
    /// the vertices that stroke first touched. Returns true if an undo was
    /// performed, false if the history is empty.
    pub fn undo(&mut self, registry: &mut SurfaceRegistry) -> bool {
        if self.stroke.is_some() {
            self.end_stroke();
        }

        let Some(entry) = self.history.pop() else {
            debug!("Undo: no entries available");
            return false;
        };

        let Some(surface) = registry.paintable_mut() else {
            warn!("Undo: no paintable surface, dropping stroke {}", entry.stroke_id);
            return false;
        };
        if surface.id != entry.surface {
            warn!(
                "Undo: stroke {} belongs to {}, paintable surface is {}",
                entry.stroke_id, entry.surface, surface.id
            );
            return false;
        }
        if !surface.restore_colors(&entry.colors) {
            warn!(
                "Undo: snapshot of stroke {} has {} colours, surface has {}",
                entry.stroke_id,
                entry.colors.len(),
                surface.vertex_count()
            );
            return false;
        }

        for index in &entry.newly_touched {
            self.touched.remove(*index);
        }

        debug!(
            "Undid stroke {} ({} vertices retracted)",
            entry.stroke_id,
            entry.newly_touched.len()
        );
        true
    }
}
