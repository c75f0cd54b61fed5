//! The set of painted vertices that focused capture frames.

use std::collections::HashSet;

use glam::Vec3;

use crate::surface::Surface;

/// Indices of paintable-surface vertices that received paint.
///
/// Set semantics: painting a vertex twice records it once.
#[derive(Debug, Clone, Default)]
pub struct TouchedVertexSet {
    indices: HashSet<u32>,
}

impl TouchedVertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the index was not yet present.
    pub fn insert(&mut self, index: u32) -> bool {
        self.indices.insert(index)
    }

    pub fn remove(&mut self, index: u32) -> bool {
        self.indices.remove(&index)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Indices in ascending order.
    pub fn sorted(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self.indices.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// World-space positions of the touched vertices on `surface`.
    pub fn world_points(&self, surface: &Surface) -> Vec<Vec3> {
        let matrix = surface.transform.matrix();
        self.sorted()
            .into_iter()
            .filter_map(|i| surface.positions.get(i as usize))
            .map(|p| matrix.transform_point3(*p))
            .collect()
    }
}
