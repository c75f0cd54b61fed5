//! Commands sent to the viewer by the form/submission side.

use serde::{Deserialize, Serialize};

/// Requests the viewer acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewerCommand {
    /// Replace the current model
    LoadModel {
        path: String,
        /// Mesh to paint on; falls back to the configured one
        #[serde(default)]
        main_mesh: Option<String>,
    },

    /// Switch between painting and camera navigation
    SetPaintMode { enabled: bool },

    /// Brush size as a slider value
    SetBrushRadius { ui_value: i32 },

    /// Undo the last painting gesture
    Undo,

    /// Capture the annotated views for submission
    Capture,

    ZoomIn,
    ZoomOut,
}
