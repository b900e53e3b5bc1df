//! Axis-aligned bounding boxes in world (millimeter) space.

use glam::Vec3;

/// Axis-aligned bounding box.
///
/// Starts out inverted (`empty()`) so it can be grown point by point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox3 {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl BBox3 {
  /// Create a box with inverted extents, ready for encapsulation.
  pub fn empty() -> Self {
    Self {
      min: Vec3::splat(f32::INFINITY),
      max: Vec3::splat(f32::NEG_INFINITY),
    }
  }

  /// Create a box from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "BBox3 min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a box from center and half-extents.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Grow the box to include a point.
  #[inline]
  pub fn include(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Grow the box to include another box.
  #[inline]
  pub fn include_box(&mut self, other: &BBox3) {
    self.min = self.min.min(other.min);
    self.max = self.max.max(other.max);
  }

  /// A copy of this box expanded by `margin` on all sides.
  pub fn expanded(&self, margin: f32) -> Self {
    Self {
      min: self.min - Vec3::splat(margin),
      max: self.max + Vec3::splat(margin),
    }
  }

  /// Check if the box contains a point (boundary inclusive).
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Check if this box overlaps another (shared boundary counts).
  #[inline]
  pub fn overlaps(&self, other: &BBox3) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Size of the box (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Center of the box.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  /// Check if the box has valid (non-inverted) extents.
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }
}

impl Default for BBox3 {
  fn default() -> Self {
    Self::empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_is_invalid_until_grown() {
    let mut bbox = BBox3::empty();
    assert!(!bbox.is_valid());

    bbox.include(Vec3::new(1.0, 2.0, 3.0));
    assert!(bbox.is_valid());
    assert_eq!(bbox.min, bbox.max);
  }

  #[test]
  fn include_grows_both_corners() {
    let mut bbox = BBox3::empty();
    bbox.include(Vec3::splat(5.0));
    bbox.include(Vec3::splat(-5.0));
    assert_eq!(bbox.min, Vec3::splat(-5.0));
    assert_eq!(bbox.max, Vec3::splat(5.0));
    assert_eq!(bbox.center(), Vec3::ZERO);
    assert_eq!(bbox.size(), Vec3::splat(10.0));
  }

  #[test]
  fn contains_point_boundary_inclusive() {
    let bbox = BBox3::new(Vec3::ZERO, Vec3::splat(10.0));
    assert!(bbox.contains_point(Vec3::splat(5.0)));
    assert!(bbox.contains_point(Vec3::ZERO));
    assert!(bbox.contains_point(Vec3::splat(10.0)));
    assert!(!bbox.contains_point(Vec3::splat(10.1)));
  }

  #[test]
  fn overlaps_touching_boxes() {
    let a = BBox3::new(Vec3::ZERO, Vec3::splat(10.0));
    let b = BBox3::new(Vec3::splat(10.0), Vec3::splat(20.0));
    let c = BBox3::new(Vec3::splat(11.0), Vec3::splat(20.0));
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
  }

  #[test]
  fn expanded_adds_margin() {
    let bbox = BBox3::new(Vec3::ZERO, Vec3::splat(1.0)).expanded(2.0);
    assert_eq!(bbox.min, Vec3::splat(-2.0));
    assert_eq!(bbox.max, Vec3::splat(3.0));
  }
}
