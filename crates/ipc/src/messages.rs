//! Events the viewer reports back.

use serde::{Deserialize, Serialize};

/// MIME type of captured frames
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// A file handed to the external multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn png(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PNG_CONTENT_TYPE.to_string(),
            data,
        }
    }
}

/// File name of the `index`-th (0-based) captured frame.
pub fn screenshot_filename(index: usize) -> String {
    format!("screenshot_{}.png", index + 1)
}

/// Wrap PNG-encoded frames as `screenshot_1.png`, `screenshot_2.png`, ...
/// in capture order.
pub fn screenshot_attachments(frames: Vec<Vec<u8>>) -> Vec<Attachment> {
    frames
        .into_iter()
        .enumerate()
        .map(|(i, data)| Attachment::png(screenshot_filename(i), data))
        .collect()
}

/// Events from the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewerEvent {
    /// A model was installed
    ModelLoaded {
        source: String,
        meshes: Vec<String>,
        paintable: String,
        /// False when the model could not be rescaled and is shown as-is
        normalized: bool,
    },

    /// Loading failed; the previous model is still shown
    ModelLoadFailed { source: String, message: String },

    PaintModeChanged { enabled: bool },

    BrushRadiusChanged { ui_value: i32, radius: f32 },

    /// Undo availability changed
    HistoryChanged { can_undo: bool },

    ZoomChanged { zoom: f32 },

    /// Captured frames, ready for submission
    CaptureReady {
        focused: bool,
        attachments: Vec<Attachment>,
    },

    /// Capture produced no frames
    CaptureFailed { message: String },
}
