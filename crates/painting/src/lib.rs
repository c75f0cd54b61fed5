//! inkmark painting engine - vertex-paint annotation and viewpoint capture
//!
//! This crate provides the framework-free core of the viewer:
//! - [`surface`] - Paintable meshes, world transforms and the surface registry
//! - [`loader`] - glTF/GLB and OBJ import into surfaces
//! - [`normalize`] - Rescaling loaded models into the canonical frame
//! - [`raycast`] - Ray-triangle hit testing
//! - [`brush`] - Brush radius/colour state and falloff blending
//! - [`pipeline`] - The paint engine (strokes, touched vertices, undo)
//! - [`history`] - Colour snapshots for gesture-granular undo
//! - [`camera`] - Perspective camera and orbit controller
//! - [`framing`] - Camera placement that frames the annotated region
//! - [`capture`] - Render backends and the capture service
//! - [`raster`] - Deterministic CPU renderer used for captures
//! - [`session`] - The session object owning all of the above

pub mod bounds;
pub mod brush;
pub mod camera;
pub mod capture;
pub mod constants;
pub mod error;
pub mod framing;
pub mod history;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod raster;
pub mod raycast;
pub mod session;
pub mod spatial;
pub mod surface;
pub mod touched;
pub mod types;
pub mod validation;

pub use bounds::*;
pub use brush::*;
pub use camera::*;
pub use capture::*;
pub use constants::*;
pub use error::*;
pub use framing::*;
pub use history::*;
pub use loader::*;
pub use normalize::*;
pub use pipeline::*;
pub use raster::*;
pub use raycast::*;
pub use session::*;
pub use spatial::*;
pub use surface::*;
pub use touched::*;
pub use types::*;
pub use validation::*;

pub use inkmark_config as config;
