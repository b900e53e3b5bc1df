//! Implicit-function rendering into the distance field.
//!
//! A caller-supplied signed distance function is rasterized into the grid,
//! either overwriting content inside a bound (`render_implicit`), masking
//! already-active voxels (`intersect_implicit`), or union-accumulating
//! (`render_lattice`, and mesh voxelization in [`mesh_voxelize`]).
//!
//! Evaluation is parallelized per block with rayon. The callback sees
//! voxel centers in arbitrary order and from multiple threads, which is
//! why [`Implicit`] requires `Sync`.

mod mesh_voxelize;

use glam::{IVec3, Vec3};
use rayon::prelude::*;

use crate::bounds::BBox3;
use crate::constants::{coord_to_index, BLOCK_SIZE, BLOCK_SIZE_I, BLOCK_VOLUME};
use crate::grid::DistanceGrid;
use crate::lattice::Lattice;

/// A signed distance function over world space.
///
/// Implementations must be pure functions of the input point: the engine
/// may evaluate them concurrently and in arbitrary voxel order.
pub trait Implicit: Sync {
  /// Signed distance from `point` to the surface, negative inside.
  fn signed_distance(&self, point: Vec3) -> f32;
}

impl<F> Implicit for F
where
  F: Fn(Vec3) -> f32 + Sync,
{
  fn signed_distance(&self, point: Vec3) -> f32 {
    self(point)
  }
}

/// How rendered values combine with existing voxel content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CombineMode {
  /// Replace whatever was stored.
  Overwrite,
  /// `min(old, new)`: boolean union.
  Union,
}

impl DistanceGrid {
  /// Rasterize `implicit` into the grid, overwriting all voxels whose
  /// centers lie within `bounds` expanded by the narrow-band width.
  /// Content outside the bound is untouched.
  pub fn render_implicit<I: Implicit>(&mut self, implicit: &I, bounds: BBox3) {
    if !bounds.is_valid() {
      return;
    }
    let expanded = bounds.expanded(self.background());
    self.render_region(implicit, expanded, CombineMode::Overwrite);
  }

  /// Union-render `implicit` over `bounds` (expanded by the band width)
  /// into existing content.
  pub fn render_implicit_union<I: Implicit>(&mut self, implicit: &I, bounds: BBox3) {
    if !bounds.is_valid() {
      return;
    }
    let expanded = bounds.expanded(self.background());
    self.render_region(implicit, expanded, CombineMode::Union);
  }

  /// Mask the grid by `implicit`: every currently-active voxel becomes
  /// `max(old, implicit)`, so a voxel stays inside only where both the
  /// stored field and the function agree it is inside. Voxels the grid
  /// does not store are never evaluated.
  pub fn intersect_implicit<I: Implicit>(&mut self, implicit: &I) {
    let bg = self.background();
    let s = self.voxel_size();
    let keys = self.sorted_block_keys();

    tracing::debug!(blocks = keys.len(), "intersect_implicit");

    let updates: Vec<(IVec3, Box<[f32; BLOCK_VOLUME]>)> = keys
      .par_iter()
      .map(|&key| {
        let mut values = Box::new([0.0f32; BLOCK_VOLUME]);
        let base = key * BLOCK_SIZE_I;
        for x in 0..BLOCK_SIZE {
          for y in 0..BLOCK_SIZE {
            for z in 0..BLOCK_SIZE {
              let coord = base + IVec3::new(x as i32, y as i32, z as i32);
              let old = self.value_at(coord);
              let d = sanitize(implicit.signed_distance(coord.as_vec3() * s), bg);
              values[coord_to_index(x, y, z)] = old.max(d);
            }
          }
        }
        (key, values)
      })
      .collect();

    for (key, values) in updates {
      *self.dense_block_mut(key) = *values;
    }
    self.prune();
  }

  /// Union-render every primitive of a lattice into the grid.
  pub fn render_lattice(&mut self, lattice: &Lattice) {
    for primitive in lattice.primitives() {
      let bounds = primitive.bounds().expanded(self.background());
      let f = |p: Vec3| primitive.signed_distance(p);
      self.render_region(&f, bounds, CombineMode::Union);
    }
  }

  /// Evaluate `implicit` at every voxel center inside `bounds` (already
  /// expanded by the caller) and combine per `mode`.
  fn render_region<I: Implicit>(&mut self, implicit: &I, bounds: BBox3, mode: CombineMode) {
    let bg = self.background();
    let s = self.voxel_size();

    let vmin = (bounds.min / s).floor().as_ivec3();
    let vmax = (bounds.max / s).ceil().as_ivec3();
    let bmin = crate::constants::block_of(vmin);
    let bmax = crate::constants::block_of(vmax);

    let mut keys = Vec::new();
    for bx in bmin.x..=bmax.x {
      for by in bmin.y..=bmax.y {
        for bz in bmin.z..=bmax.z {
          keys.push(IVec3::new(bx, by, bz));
        }
      }
    }

    tracing::debug!(blocks = keys.len(), ?mode, "render_region");

    // Evaluate in parallel; apply serially in deterministic key order.
    let updates: Vec<(IVec3, Vec<(usize, f32)>)> = keys
      .par_iter()
      .map(|&key| {
        let base = key * BLOCK_SIZE_I;
        let mut writes = Vec::new();
        for x in 0..BLOCK_SIZE {
          for y in 0..BLOCK_SIZE {
            for z in 0..BLOCK_SIZE {
              let coord = base + IVec3::new(x as i32, y as i32, z as i32);
              let center = coord.as_vec3() * s;
              if !bounds.contains_point(center) {
                continue;
              }
              let d = sanitize(implicit.signed_distance(center), bg);
              writes.push((coord_to_index(x, y, z), d));
            }
          }
        }
        (key, writes)
      })
      .collect();

    for (key, writes) in updates {
      if writes.is_empty() {
        continue;
      }
      // Skip allocation for blocks the function reports fully outside,
      // unless existing content must be overwritten.
      let untouched = self.block(key).is_none();
      if untouched && writes.iter().all(|&(_, d)| d >= bg) {
        continue;
      }
      let values = self.dense_block_mut(key);
      match mode {
        CombineMode::Overwrite => {
          for (idx, d) in writes {
            values[idx] = d;
          }
        }
        CombineMode::Union => {
          for (idx, d) in writes {
            values[idx] = values[idx].min(d);
          }
        }
      }
    }
    self.prune();
  }
}

/// Clamp a callback result into the band, mapping NaN to background.
#[inline]
fn sanitize(d: f32, background: f32) -> f32 {
  if d.is_nan() {
    background
  } else {
    d.clamp(-background, background)
  }
}
