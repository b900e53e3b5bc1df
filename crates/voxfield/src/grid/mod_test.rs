use glam::{IVec3, Vec3};

use super::*;

fn grid() -> DistanceGrid {
  DistanceGrid::new(GridConfig::new(0.5)).unwrap()
}

#[test]
fn rejects_bad_config() {
  assert!(DistanceGrid::new(GridConfig::new(0.0)).is_err());
  assert!(DistanceGrid::new(GridConfig::new(-1.0)).is_err());
  assert!(DistanceGrid::new(GridConfig::new(1.0).with_band_voxels(0.5)).is_err());
}

#[test]
fn empty_grid_reads_background_everywhere() {
  let g = grid();
  assert!(g.is_valid());
  assert!(g.is_empty());
  assert_eq!(g.value_at(IVec3::ZERO), g.background());
  assert_eq!(g.value_at(IVec3::new(-100, 50, 3)), g.background());
  assert_eq!(g.background(), 1.5);
}

#[test]
fn set_and_get_roundtrip() {
  let mut g = grid();
  g.set_value(IVec3::new(3, -4, 5), 0.25);
  assert_eq!(g.value_at(IVec3::new(3, -4, 5)), 0.25);
  // Neighbors in the same block stay at background.
  assert_eq!(g.value_at(IVec3::new(3, -4, 6)), g.background());
}

#[test]
fn values_clamp_to_band() {
  let mut g = grid();
  g.set_value(IVec3::ZERO, 100.0);
  assert_eq!(g.value_at(IVec3::ZERO), g.background());
  g.set_value(IVec3::ZERO, -100.0);
  assert_eq!(g.value_at(IVec3::ZERO), -g.background());
}

#[test]
fn background_write_allocates_nothing() {
  let mut g = grid();
  g.set_value(IVec3::new(10, 10, 10), g.background() + 5.0);
  assert!(g.is_empty());
}

#[test]
fn copy_is_deep_and_independent() {
  let mut original = grid();
  original.set_value(IVec3::ZERO, -0.5);
  let copy = original.clone();
  assert!(copy.is_equal(&original));

  let mut mutated = copy.clone();
  mutated.set_value(IVec3::ZERO, 0.5);
  assert!(!mutated.is_equal(&original));
  // Original unaffected by mutating the copy.
  assert_eq!(original.value_at(IVec3::ZERO), -0.5);
}

#[test]
fn equality_ignores_representation() {
  let mut a = grid();
  let mut b = grid();
  // a: dense block explicitly full of -background, then pruned to a tile.
  for x in 0..8 {
    for y in 0..8 {
      for z in 0..8 {
        a.set_value(IVec3::new(x, y, z), -a.background());
      }
    }
  }
  a.prune();
  for x in 0..8 {
    for y in 0..8 {
      for z in 0..8 {
        b.set_value(IVec3::new(x, y, z), -b.background());
      }
    }
  }
  assert!(a.is_equal(&b));
  assert!(b.is_equal(&a));
}

#[test]
fn presence_of_non_background_value_breaks_equality() {
  let mut a = grid();
  let b = grid();
  a.set_value(IVec3::ZERO, 0.1);
  assert!(!a.is_equal(&b));
}

#[test]
fn grids_with_different_voxel_size_are_unequal() {
  let a = DistanceGrid::new(GridConfig::new(0.5)).unwrap();
  let b = DistanceGrid::new(GridConfig::new(1.0)).unwrap();
  assert!(!a.is_equal(&b));
}

#[test]
fn prune_drops_outside_and_collapses_inside() {
  let mut g = grid();
  let bg = g.background();
  // Fill one block with background (removable) and one with -background.
  for x in 0..8 {
    for y in 0..8 {
      for z in 0..8 {
        g.set_value_raw(IVec3::new(x, y, z), bg);
        g.set_value(IVec3::new(x + 16, y, z), -bg);
      }
    }
  }
  g.prune();
  assert_eq!(g.value_at(IVec3::ZERO), bg);
  assert_eq!(g.value_at(IVec3::new(16, 0, 0)), -bg);
  assert!(!g.has_surface());
  // Only the interior tile survives.
  assert_eq!(g.sorted_block_keys().len(), 1);
}

#[test]
fn sample_interpolates_between_voxels() {
  let mut g = grid();
  // Plane x = 0.5 voxels: value grows linearly along +x.
  for x in -4..8 {
    for y in -4..8 {
      for z in -4..8 {
        g.set_value(IVec3::new(x, y, z), (x as f32 - 0.5) * 0.5);
      }
    }
  }
  // At world x = 0.25mm (voxel 0.5), halfway between voxel 0 and 1.
  let v = g.sample(Vec3::new(0.25, 0.5, 0.5));
  assert!((v - 0.0).abs() < 1e-6, "expected 0 at plane, got {v}");
  assert!(g.sample(Vec3::new(0.0, 0.5, 0.5)) < 0.0);
  assert!(g.sample(Vec3::new(1.0, 0.5, 0.5)) > 0.0);
}

#[test]
fn voxel_dimensions_tracks_blocks() {
  let mut g = grid();
  assert_eq!(g.voxel_dimensions().size, IVec3::ZERO);

  g.set_value(IVec3::new(0, 0, 0), 0.1);
  g.set_value(IVec3::new(15, 0, 0), 0.1);
  let dims = g.voxel_dimensions();
  assert_eq!(dims.origin, IVec3::ZERO);
  assert_eq!(dims.size, IVec3::new(16, 8, 8));
}

#[test]
fn nan_writes_degrade_to_background() {
  let mut g = grid();
  g.set_value(IVec3::ZERO, f32::NAN);
  assert_eq!(g.value_at(IVec3::ZERO), g.background());
}
