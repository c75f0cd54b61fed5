//! Uniform grid over world-space vertex positions.
//!
//! Replaces the per-vertex scan of every paint call with a lookup of the
//! cells overlapping the brush sphere. Results are identical to a brute-force
//! distance test.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::constants::MIN_GRID_CELL;
use crate::surface::{Surface, SurfaceTransform};
use crate::types::SurfaceId;

#[derive(Debug, Clone, PartialEq)]
struct GridKey {
    surface: SurfaceId,
    transform: SurfaceTransform,
    vertex_count: usize,
}

/// Spatial hash of one surface's vertices in world space.
#[derive(Debug)]
pub struct VertexGrid {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<u32>>,
    world_positions: Vec<Vec3>,
    key: Option<GridKey>,
}

impl VertexGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(MIN_GRID_CELL),
            cells: HashMap::new(),
            world_positions: Vec::new(),
            key: None,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    /// Whether the grid reflects the surface's current geometry and placement.
    pub fn is_built_for(&self, surface: &Surface) -> bool {
        self.key.as_ref().is_some_and(|key| {
            key.surface == surface.id
                && key.transform == surface.transform
                && key.vertex_count == surface.vertex_count()
        })
    }

    /// Rebuild if the surface or its transform changed since the last build.
    pub fn ensure_built(&mut self, surface: &Surface) {
        if !self.is_built_for(surface) {
            self.rebuild(surface);
        }
    }

    pub fn rebuild(&mut self, surface: &Surface) {
        self.cells.clear();
        self.world_positions = surface.world_positions().collect();

        for (i, p) in self.world_positions.iter().enumerate() {
            let cell = self.cell_of(*p);
            self.cells.entry(cell).or_default().push(i as u32);
        }

        self.key = Some(GridKey {
            surface: surface.id,
            transform: surface.transform,
            vertex_count: surface.vertex_count(),
        });
        tracing::debug!(
            "Rebuilt vertex grid for {}: {} vertices in {} cells",
            surface.id,
            self.world_positions.len(),
            self.cells.len()
        );
    }

    pub fn invalidate(&mut self) {
        self.cells.clear();
        self.world_positions.clear();
        self.key = None;
    }

    pub fn world_position(&self, index: u32) -> Option<Vec3> {
        self.world_positions.get(index as usize).copied()
    }

    /// Every vertex with `distance <= radius` from `center`, as
    /// `(index, distance)` in ascending index order.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<(u32, f32)> {
        if !(radius >= 0.0) {
            return Vec::new();
        }

        let cells_per_axis = (2.0 * radius / self.cell_size).ceil() + 1.0;

        let mut found = Vec::new();
        let mut test = |i: u32| {
            let d = self.world_positions[i as usize].distance(center);
            if d <= radius {
                found.push((i, d));
            }
        };

        if cells_per_axis.powi(3) > self.cells.len() as f32 {
            // Brush covers more cells than are occupied
            for i in 0..self.world_positions.len() as u32 {
                test(i);
            }
        } else {
            let lo = self.cell_of(center - Vec3::splat(radius));
            let hi = self.cell_of(center + Vec3::splat(radius));
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        if let Some(bucket) = self.cells.get(&IVec3::new(x, y, z)) {
                            bucket.iter().copied().for_each(&mut test);
                        }
                    }
                }
            }
        }

        found.sort_unstable_by_key(|(i, _)| *i);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(n: i32, spacing: f32) -> Surface {
        let mut positions = Vec::new();
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    positions.push(Vec3::new(x as f32, y as f32, z as f32) * spacing);
                }
            }
        }
        Surface::new("lattice", positions, None, vec![]).unwrap()
    }

    fn brute_force(surface: &Surface, center: Vec3, radius: f32) -> Vec<u32> {
        surface
            .world_positions()
            .enumerate()
            .filter(|(_, p)| p.distance(center) <= radius)
            .map(|(i, _)| i as u32)
            .collect()
    }

    #[test]
    fn test_matches_brute_force() {
        let mut surface = lattice(12, 0.05);
        surface.transform = SurfaceTransform {
            translation: Vec3::new(-0.3, 1.0, 0.2),
            rotation: glam::Quat::from_rotation_y(0.4),
            scale: Vec3::splat(1.3),
        };
        let mut grid = VertexGrid::new(0.12);
        grid.ensure_built(&surface);

        for (center, radius) in [
            (Vec3::new(0.0, 1.2, 0.4), 0.03),
            (Vec3::new(-0.1, 1.3, 0.5), 0.12),
            (Vec3::new(0.2, 1.5, 0.1), 0.5),
            (Vec3::new(9.0, 9.0, 9.0), 0.1),
        ] {
            let grid_hits: Vec<u32> = grid
                .query_radius(center, radius)
                .into_iter()
                .map(|(i, _)| i)
                .collect();
            assert_eq!(grid_hits, brute_force(&surface, center, radius));
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let surface = Surface::new(
            "pair",
            vec![Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0)],
            None,
            vec![],
        )
        .unwrap();
        let mut grid = VertexGrid::new(0.12);
        grid.ensure_built(&surface);

        let hits = grid.query_radius(Vec3::ZERO, 0.1);
        assert_eq!(hits.len(), 2);
        assert!((hits[1].1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_rebuilds_on_transform_change() {
        let mut surface = lattice(2, 1.0);
        let mut grid = VertexGrid::new(0.5);
        grid.ensure_built(&surface);
        assert!(grid.is_built_for(&surface));

        surface.transform.translate(Vec3::new(5.0, 0.0, 0.0));
        assert!(!grid.is_built_for(&surface));
        grid.ensure_built(&surface);
        assert_eq!(grid.world_position(0), Some(Vec3::new(5.0, 0.0, 0.0)));

        grid.invalidate();
        assert!(!grid.is_built_for(&surface));
        assert!(grid.query_radius(Vec3::ZERO, 10.0).is_empty());
    }
}
