//! Boolean combination of distance fields.
//!
//! Distance-field CSG is per-voxel min/max arithmetic:
//!
//! ```text
//! union        min(a, b)
//! difference   max(a, -b)
//! intersection max(a, b)
//! ```
//!
//! All operations mutate the first operand in place and leave the second
//! untouched. Block structure keeps the work proportional to the operand's
//! active region: union and difference only visit blocks present in the
//! operand, intersection only visits blocks present in the target.

use glam::IVec3;

use crate::constants::BLOCK_VOLUME;
use crate::grid::{DistanceGrid, VoxelBlock};

/// Quadratic polynomial smooth minimum with blend width `k`.
///
/// Identical to `min(a, b)` once `|a - b| >= k`.
#[inline]
fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
  let h = (0.5 + 0.5 * (b - a) / k).clamp(0.0, 1.0);
  b + (a - b) * h - k * h * (1.0 - h)
}

impl DistanceGrid {
  /// Boolean union: this field becomes `min(self, operand)`.
  ///
  /// Union with an empty field leaves the grid unchanged.
  pub fn bool_add(&mut self, operand: &DistanceGrid) {
    for (key, block) in operand.blocks() {
      match block {
        VoxelBlock::Interior => {
          // min(a, -background) is -background everywhere in the block.
          self.insert_block(*key, VoxelBlock::Interior);
        }
        VoxelBlock::Dense(bvals) => {
          if matches!(self.block(*key), Some(VoxelBlock::Interior)) {
            continue;
          }
          let avals = self.dense_block_mut(*key);
          for i in 0..BLOCK_VOLUME {
            avals[i] = avals[i].min(bvals[i]);
          }
        }
      }
    }
    self.prune();
  }

  /// Boolean union with every field in the iterator.
  pub fn bool_add_all<'a, I>(&mut self, operands: I)
  where
    I: IntoIterator<Item = &'a DistanceGrid>,
  {
    for operand in operands {
      self.bool_add(operand);
    }
  }

  /// Blended union: like [`bool_add`](DistanceGrid::bool_add) but with a
  /// filleted transition of width `smooth_distance` where the two surfaces
  /// meet. Outside the blend radius the result is identical to a plain
  /// union.
  ///
  /// The blend width is capped at the narrow-band background distance;
  /// wider fillets than the band cannot be represented.
  pub fn bool_add_smooth(&mut self, operand: &DistanceGrid, smooth_distance: f32) {
    let bg = self.background();
    if smooth_distance <= 0.0 {
      self.bool_add(operand);
      return;
    }
    let k = smooth_distance.min(bg);

    for (key, block) in operand.blocks() {
      match block {
        VoxelBlock::Interior => {
          self.insert_block(*key, VoxelBlock::Interior);
        }
        VoxelBlock::Dense(bvals) => {
          if matches!(self.block(*key), Some(VoxelBlock::Interior)) {
            continue;
          }
          let avals = self.dense_block_mut(*key);
          for i in 0..BLOCK_VOLUME {
            let (a, b) = (avals[i], bvals[i]);
            // Blend only where both operands carry band values; against
            // clamped background the smooth term would invent geometry.
            avals[i] = if a < bg && b < bg {
              smooth_min(a, b, k).max(-bg)
            } else {
              a.min(b)
            };
          }
        }
      }
    }
    self.prune();
  }

  /// Boolean difference: this field becomes `max(self, -operand)`,
  /// removing the operand's interior.
  pub fn bool_subtract(&mut self, operand: &DistanceGrid) {
    let mut cleared: Vec<IVec3> = Vec::new();
    for (key, block) in operand.blocks() {
      match block {
        VoxelBlock::Interior => {
          // max(a, +background) clears the whole block.
          cleared.push(*key);
        }
        VoxelBlock::Dense(bvals) => {
          if self.block(*key).is_none() {
            // max(background, -b) stays background: -b <= background.
            continue;
          }
          let avals = self.dense_block_mut(*key);
          for i in 0..BLOCK_VOLUME {
            avals[i] = avals[i].max(-bvals[i]);
          }
        }
      }
    }
    for key in cleared {
      self.remove_block(key);
    }
    self.prune();
  }

  /// Boolean difference with every field in the iterator.
  pub fn bool_subtract_all<'a, I>(&mut self, operands: I)
  where
    I: IntoIterator<Item = &'a DistanceGrid>,
  {
    for operand in operands {
      self.bool_subtract(operand);
    }
  }

  /// Boolean intersection: this field becomes `max(self, operand)`.
  ///
  /// Intersection with an empty field empties the grid.
  pub fn bool_intersect(&mut self, operand: &DistanceGrid) {
    let keys = self.sorted_block_keys();
    for key in keys {
      match operand.block(key) {
        None => {
          // max(a, background) is background: nothing survives here.
          self.remove_block(key);
        }
        Some(VoxelBlock::Interior) => {
          // max(a, -background) leaves a unchanged.
        }
        Some(VoxelBlock::Dense(bvals)) => {
          let avals = self.dense_block_mut(key);
          for i in 0..BLOCK_VOLUME {
            avals[i] = avals[i].max(bvals[i]);
          }
        }
      }
    }
    self.prune();
  }
}

#[cfg(test)]
#[path = "csg_test.rs"]
mod csg_test;
