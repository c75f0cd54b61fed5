//! Ray-mesh intersection for hit-testing pointer rays against surfaces.
//!
//! This module provides ray-triangle intersection using the Moller-Trumbore
//! algorithm. Triangles are moved into world space before testing, so the
//! parallel-ray threshold does not depend on the asset's native units.

use glam::Vec3;

use crate::constants::RAY_EPSILON;
use crate::surface::Surface;
use crate::types::MeshHit;

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Ray parameter of the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both windings are accepted so back faces still occlude.
///
/// # Returns
/// `Some(TriangleHit)` if the ray intersects in front of its origin, `None` otherwise
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < RAY_EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Cast a world-space ray against one surface and return the closest hit.
///
/// Each triangle is transformed by the surface's world matrix and tested
/// against the unit world ray, so `t` is a world-space distance.
pub fn raycast_surface(ray: &Ray, surface: &Surface) -> Option<MeshHit> {
    let world = surface.transform.matrix();

    let mut closest: Option<(TriangleHit, u32)> = None;

    // Brute force over triangles; meshes here are a single figure
    for (tri_idx, tri) in surface.indices.chunks_exact(3).enumerate() {
        let v0 = world.transform_point3(surface.positions[tri[0] as usize]);
        let v1 = world.transform_point3(surface.positions[tri[1] as usize]);
        let v2 = world.transform_point3(surface.positions[tri[2] as usize]);

        if let Some(hit) = ray_triangle_intersection(ray.origin, ray.direction, v0, v1, v2) {
            let dominated = matches!(&closest, Some((prev, _)) if hit.t >= prev.t);
            if !dominated {
                closest = Some((hit, tri_idx as u32));
            }
        }
    }

    closest.map(|(hit, face_id)| {
        let world_pos = ray.at(hit.t);
        MeshHit {
            surface: surface.id,
            world_pos,
            face_id,
            barycentric: Vec3::new(1.0 - hit.u - hit.v, hit.u, hit.v),
            distance: world_pos.distance(ray.origin),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceTransform;
    use crate::types::SurfaceId;

    const EPS: f32 = 1e-5;

    fn unit_quad() -> Surface {
        // Square in the XY plane at z=0, spanning -1..1
        Surface::new(
            "quad",
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            None,
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_ray_triangle_hit() {
        let v0 = Vec3::new(0.0, 0.0, 0.0);
        let v1 = Vec3::new(1.0, 0.0, 0.0);
        let v2 = Vec3::new(0.0, 1.0, 0.0);

        let origin = Vec3::new(0.25, 0.25, 1.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);

        let hit = ray_triangle_intersection(origin, dir, v0, v1, v2).unwrap();
        assert!((hit.t - 1.0).abs() < EPS);
        assert!((hit.u - 0.25).abs() < EPS);
        assert!((hit.v - 0.25).abs() < EPS);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let v0 = Vec3::new(0.0, 0.0, 0.0);
        let v1 = Vec3::new(1.0, 0.0, 0.0);
        let v2 = Vec3::new(0.0, 1.0, 0.0);

        let hit = ray_triangle_intersection(Vec3::new(2.0, 2.0, 1.0), Vec3::NEG_Z, v0, v1, v2);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_triangle_behind() {
        let v0 = Vec3::new(0.0, 0.0, 0.0);
        let v1 = Vec3::new(1.0, 0.0, 0.0);
        let v2 = Vec3::new(0.0, 1.0, 0.0);

        let hit = ray_triangle_intersection(Vec3::new(0.25, 0.25, 1.0), Vec3::Z, v0, v1, v2);
        assert!(hit.is_none());
    }

    #[test]
    fn test_back_face_hit() {
        let v0 = Vec3::new(0.0, 0.0, 0.0);
        let v1 = Vec3::new(0.0, 1.0, 0.0);
        let v2 = Vec3::new(1.0, 0.0, 0.0);

        let hit = ray_triangle_intersection(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z, v0, v1, v2);
        assert!(hit.is_some());
    }

    #[test]
    fn test_raycast_surface_world_space() {
        let mut quad = unit_quad();
        quad.id = SurfaceId(7);
        quad.transform = SurfaceTransform {
            translation: Vec3::new(0.0, 0.0, -5.0),
            scale: Vec3::splat(2.0),
            ..Default::default()
        };

        let ray = Ray::new(Vec3::new(1.5, 0.0, 5.0), Vec3::NEG_Z);
        let hit = raycast_surface(&ray, &quad).unwrap();
        assert_eq!(hit.surface, SurfaceId(7));
        assert!((hit.world_pos - Vec3::new(1.5, 0.0, -5.0)).length() < EPS);
        assert!((hit.distance - 10.0).abs() < EPS);
        // Outside the unscaled quad but inside the scaled one
        assert!(hit.world_pos.x > 1.0);
    }

    #[test]
    fn test_tiny_asset_scaled_up_is_hit() {
        // Millimetre-sized triangles blown up 1000x
        let mut quad = Surface::new(
            "tiny",
            vec![
                Vec3::new(-0.001, -0.001, 0.0),
                Vec3::new(0.001, -0.001, 0.0),
                Vec3::new(0.001, 0.001, 0.0),
                Vec3::new(-0.001, 0.001, 0.0),
            ],
            None,
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();
        quad.transform.scale = Vec3::splat(1000.0);

        let ray = Ray::new(Vec3::new(0.3, 0.2, 5.0), Vec3::NEG_Z);
        let hit = raycast_surface(&ray, &quad).unwrap();
        assert!((hit.world_pos - Vec3::new(0.3, 0.2, 0.0)).length() < 1e-4);
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_raycast_surface_miss() {
        let quad = unit_quad();
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(raycast_surface(&ray, &quad).is_none());
    }
}
