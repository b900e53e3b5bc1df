//! Morphological operations: offsets and smoothing filters.
//!
//! Offsetting a distance field is a uniform shift of the stored values,
//! valid as long as the shift stays within the narrow band. Larger
//! offsets run as sequential sub-steps, re-extending the band by chamfer
//! propagation before each shift so the surface never outruns the stored
//! values.

use std::collections::{HashMap, HashSet};

use glam::IVec3;
use rayon::prelude::*;

use crate::constants::{
  coord_to_index, index_to_coord, BLOCK_SIZE, BLOCK_SIZE_I, BLOCK_VOLUME, FACE_NEIGHBORS,
};
use crate::error::{Result, VoxError};
use crate::grid::{DistanceGrid, VoxelBlock};

impl DistanceGrid {
  /// Offset the surface by `distance`: positive grows the solid,
  /// negative shrinks it. Offsets larger than half the band width are
  /// executed as a sequence of smaller steps.
  pub fn offset(&mut self, distance: f32) {
    if distance == 0.0 || self.is_empty() {
      return;
    }
    let max_step = self.background() * 0.5;
    let steps = (distance.abs() / max_step).ceil().max(1.0) as usize;
    let step = distance / steps as f32;

    tracing::debug!(distance, steps, "offset");

    for _ in 0..steps {
      self.offset_step(step);
    }
  }

  /// Two offsets in sequence.
  pub fn double_offset(&mut self, dist1: f32, dist2: f32) {
    self.offset(dist1);
    self.offset(dist2);
  }

  /// Offset inward by `distance`, outward by twice `distance`, inward
  /// again. Rounds concave features of radius below `distance`.
  pub fn triple_offset(&mut self, distance: f32) {
    self.offset(-distance);
    self.offset(2.0 * distance);
    self.offset(-distance);
  }

  /// Smooth the surface. Alias for
  /// [`triple_offset`](DistanceGrid::triple_offset).
  pub fn smoothen(&mut self, distance: f32) {
    self.triple_offset(distance);
  }

  /// Offset out to `first_offset`, then back to `final_surface_dist`
  /// from the original surface. With a final distance of zero this is a
  /// morphological closing.
  pub fn over_offset(&mut self, first_offset: f32, final_surface_dist: f32) {
    self.double_offset(first_offset, -(first_offset - final_surface_dist));
  }

  /// Round sharp edges with radius `rounding`.
  pub fn fillet(&mut self, rounding: f32) {
    self.over_offset(rounding, 0.0);
  }

  /// A hollow copy of this field with wall thickness `|offset|`.
  /// Positive offsets build the wall outward from the current surface,
  /// negative offsets carve it inward.
  pub fn shell(&self, offset: f32) -> DistanceGrid {
    let mut outer = self.clone();
    if offset < 0.0 {
      let mut inner = self.clone();
      inner.offset(offset);
      outer.bool_subtract(&inner);
      return outer;
    }
    outer.offset(offset);
    outer.bool_subtract(self);
    outer
  }

  // ===========================================================================
  // Filters
  // ===========================================================================

  /// Gaussian blur of the distance values with standard deviation `size`
  /// (world units). Experimental: blurring is not distance-preserving.
  pub fn gaussian(&mut self, size: f32) -> Result<()> {
    let Some((radius, sigma)) = filter_radius_voxels(size, self.voxel_size())? else {
      return Ok(());
    };
    let weights = gaussian_weights(radius, sigma);
    self.apply_filter(radius, move |samples| {
      let mut sum = 0.0;
      let mut total = 0.0;
      for (value, w) in samples.iter().zip(&weights) {
        sum += value * w;
        total += w;
      }
      sum / total
    });
    Ok(())
  }

  /// Median filter over a cubic neighborhood of extent `size`.
  pub fn median(&mut self, size: f32) -> Result<()> {
    let Some((radius, _)) = filter_radius_voxels(size, self.voxel_size())? else {
      return Ok(());
    };
    self.apply_filter(radius, |samples| {
      let mut sorted = samples.to_vec();
      sorted.sort_unstable_by(f32::total_cmp);
      sorted[sorted.len() / 2]
    });
    Ok(())
  }

  /// Mean filter over a cubic neighborhood of extent `size`.
  pub fn mean(&mut self, size: f32) -> Result<()> {
    let Some((radius, _)) = filter_radius_voxels(size, self.voxel_size())? else {
      return Ok(());
    };
    self.apply_filter(radius, |samples| {
      samples.iter().sum::<f32>() / samples.len() as f32
    });
    Ok(())
  }

  // ===========================================================================
  // Internals
  // ===========================================================================

  /// One offset shift of at most half the band width.
  fn offset_step(&mut self, distance: f32) {
    let rings = (distance.abs() / self.voxel_size()).ceil() as usize + 1;
    let accurate = self.extend_band(rings);

    // Shift only voxels with accurate values. Clamped voxels beyond the
    // extension represent distances of at least `background + rings - 1`
    // voxels, so their post-shift value stays at the clamp. Interior
    // tiles stay interior for the same reason.
    for key in self.sorted_block_keys() {
      if matches!(self.block(key), Some(VoxelBlock::Dense(_))) {
        let base = key * BLOCK_SIZE_I;
        let values = self.dense_block_mut(key);
        for idx in 0..BLOCK_VOLUME {
          let (x, y, z) = index_to_coord(idx);
          let coord = base + IVec3::new(x as i32, y as i32, z as i32);
          if accurate.contains(&coord) {
            values[idx] -= distance;
          }
        }
      }
    }
    self.clamp_and_prune();
  }

  /// Chamfer propagation: grow accurate (unclamped) distance values
  /// outward from the band, `rings` voxels deep on both sides. Returns
  /// the set of voxels that now carry accurate values.
  fn extend_band(&mut self, rings: usize) -> HashSet<IVec3> {
    let s = self.voxel_size();
    let mut frontier: Vec<(IVec3, f32)> = Vec::new();
    self.for_each_band_voxel(|coord, v| frontier.push((coord, v)));
    let mut visited: HashSet<IVec3> = frontier.iter().map(|&(c, _)| c).collect();

    for _ in 0..rings {
      let mut next: HashMap<IVec3, f32> = HashMap::new();
      for &(coord, v) in &frontier {
        let candidate = if v >= 0.0 { v + s } else { v - s };
        for step in FACE_NEIGHBORS {
          let n = coord + step;
          if visited.contains(&n) {
            continue;
          }
          next
            .entry(n)
            .and_modify(|e| {
              if candidate.abs() < e.abs() {
                *e = candidate;
              }
            })
            .or_insert(candidate);
        }
      }
      if next.is_empty() {
        break;
      }
      frontier.clear();
      for (coord, v) in next {
        self.set_value_raw(coord, v);
        visited.insert(coord);
        frontier.push((coord, v));
      }
    }
    visited
  }

  /// Recompute every stored voxel as `f` of its cubic neighborhood.
  /// Evaluation is parallel per block; application is serial.
  fn apply_filter(&mut self, radius: i32, f: impl Fn(&[f32]) -> f32 + Sync) {
    let keys = self.sorted_block_keys();
    let side = (2 * radius + 1) as usize;
    let count = side * side * side;

    let updates: Vec<(IVec3, Box<[f32; BLOCK_VOLUME]>)> = keys
      .par_iter()
      .map(|&key| {
        let base = key * BLOCK_SIZE_I;
        let mut values = Box::new([0.0f32; BLOCK_VOLUME]);
        let mut samples = vec![0.0f32; count];
        for x in 0..BLOCK_SIZE {
          for y in 0..BLOCK_SIZE {
            for z in 0..BLOCK_SIZE {
              let coord = base + IVec3::new(x as i32, y as i32, z as i32);
              let mut i = 0;
              for dx in -radius..=radius {
                for dy in -radius..=radius {
                  for dz in -radius..=radius {
                    samples[i] = self.value_at(coord + IVec3::new(dx, dy, dz));
                    i += 1;
                  }
                }
              }
              values[coord_to_index(x, y, z)] = f(&samples);
            }
          }
        }
        (key, values)
      })
      .collect();

    for (key, values) in updates {
      *self.dense_block_mut(key) = *values;
    }
    self.clamp_and_prune();
  }
}

/// Validate a filter size and convert it to a voxel radius plus sigma.
/// `None` means the size is too small to have any effect.
fn filter_radius_voxels(size: f32, voxel_size: f32) -> Result<Option<(i32, f32)>> {
  if size < 0.0 || !size.is_finite() {
    return Err(VoxError::InvalidParameter(format!(
      "filter size must be non-negative, got {size}"
    )));
  }
  let sigma = size / voxel_size;
  if sigma < 1.0e-3 {
    return Ok(None);
  }
  let radius = (sigma.ceil() as i32).max(1);
  Ok(Some((radius, sigma)))
}

/// Flattened (2r+1)^3 Gaussian kernel in the same order `apply_filter`
/// gathers samples.
fn gaussian_weights(radius: i32, sigma: f32) -> Vec<f32> {
  let inv = 1.0 / (2.0 * sigma * sigma);
  let mut weights = Vec::with_capacity(((2 * radius + 1).pow(3)) as usize);
  for dx in -radius..=radius {
    for dy in -radius..=radius {
      for dz in -radius..=radius {
        let r2 = (dx * dx + dy * dy + dz * dz) as f32;
        weights.push((-r2 * inv).exp());
      }
    }
  }
  weights
}

#[cfg(test)]
#[path = "morph_test.rs"]
mod morph_test;
