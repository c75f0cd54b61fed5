//! Error types for the painting engine.
//!
//! Only asset loading and capture failures are surfaced to callers of the
//! session; the rest are absorbed locally with a fallback path and logged.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid buffers handed to [`crate::Surface::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("Colour buffer has {colors} entries but the mesh has {positions} vertices")]
    ColorCountMismatch { positions: usize, colors: usize },
    #[error("Index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),
    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Vertex {0} has a non-finite coordinate")]
    NonFinitePosition(usize),
}

/// Model fetch or decode failure.
///
/// The previously loaded model stays active when this is returned.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}: {details}")]
    Parse { path: PathBuf, details: String },
    #[error("Unsupported model format: {extension:?}")]
    UnsupportedFormat { extension: Option<String> },
    #[error("Model {model} contains no triangle meshes")]
    Empty { model: String },
    #[error("No mesh named {name:?} in model (available: {available:?})")]
    MainMeshNotFound { name: String, available: Vec<String> },
    #[error("Mesh {mesh:?} has invalid data: {source}")]
    InvalidMesh {
        mesh: String,
        #[source]
        source: SurfaceError,
    },
}

/// Normalization was skipped; the surface is used as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Degenerate bounding volume (extent {extent:?}), normalization skipped")]
    DegenerateBoundingVolume { extent: [f32; 3] },
}

/// The annotated region cannot be framed; callers fall back to default views.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FramingError {
    #[error("No annotated points to frame")]
    NoPoints,
    #[error("Degenerate bounding volume (extent {extent:?}), cannot frame")]
    DegenerateBoundingVolume { extent: [f32; 3] },
}

/// The capture pass could not produce its images.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The renderer cannot read back its framebuffer
    #[error("Capture unavailable: {0}")]
    Unavailable(String),
    #[error("Frame {ticket} was not confirmed complete within {timeout_ms} ms")]
    RenderTimeout { ticket: u64, timeout_ms: u64 },
    #[error("Frame {requested} can no longer be read back (latest frame is {latest})")]
    StaleFrame { requested: u64, latest: u64 },
    #[error("Failed to encode capture: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors surfaced by [`crate::PaintSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
