//! Small shared types: vertex colours, surface ids and paint results.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear RGB colour, one per vertex
pub type Rgb = [f32; 3];

/// Identifier of a surface inside a [`crate::SurfaceRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Result of a ray hitting a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Surface that was hit
    pub surface: SurfaceId,
    /// Hit point in world space
    pub world_pos: Vec3,
    /// Triangle index within the surface
    pub face_id: u32,
    /// Barycentric coordinates (w, u, v)
    pub barycentric: Vec3,
    /// World-space distance from the ray origin
    pub distance: f32,
}

/// What a single `paint_at` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintOutcome {
    /// Paint mode is off or no stroke is active
    Inactive,
    /// The ray hit nothing
    NoIntersection,
    /// The nearest hit belongs to geometry that is not paintable
    Occluded { surface: SurfaceId },
    /// Vertices within the brush radius were blended
    Painted { hit: MeshHit, vertices: usize },
}

impl PaintOutcome {
    /// Whether any vertex colour was changed
    pub fn painted(&self) -> bool {
        matches!(self, Self::Painted { vertices, .. } if *vertices > 0)
    }
}
