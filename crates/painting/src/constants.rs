//! Engine-wide constants.

/// Colour given to every vertex of an asset that ships without vertex colours.
pub const DEFAULT_VERTEX_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Extents at or below this are treated as zero when checking bounding volumes.
pub const DEGENERATE_EXTENT: f32 = 1e-6;

/// Epsilon for floating point comparisons in ray intersection.
pub const RAY_EPSILON: f32 = 1e-6;

/// Smallest grid cell the vertex index will use.
pub const MIN_GRID_CELL: f32 = 1e-3;
