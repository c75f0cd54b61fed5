//! Axis-aligned bounding boxes shared by normalization and framing.

use glam::Vec3;

use crate::constants::DEGENERATE_EXTENT;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any included point will replace.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Bounding box of a point set, `None` if the set is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut bounds = Self::empty();
        let mut any = false;
        for point in points {
            bounds.include_point(point);
            any = true;
        }
        any.then_some(bounds)
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// True when the box has no usable extent along any axis.
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || !(self.max_extent() > DEGENERATE_EXTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Aabb::from_points([
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.5),
            Vec3::new(0.0, 4.0, 1.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 1.0, 1.25));
        assert_eq!(bounds.max_extent(), 6.0);
    }

    #[test]
    fn test_empty_point_set() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
        assert!(Aabb::empty().is_empty());
        assert!(Aabb::empty().is_degenerate());
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let bounds = Aabb::from_points([Vec3::ONE]).unwrap();
        assert!(!bounds.is_empty());
        assert!(bounds.is_degenerate());
    }

    #[test]
    fn test_flat_box_is_not_degenerate() {
        // A plane still has a usable largest extent
        let bounds = Aabb::from_points([Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)]).unwrap();
        assert!(!bounds.is_degenerate());
    }
}
