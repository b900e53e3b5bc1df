//! Per-block voxel storage.

use crate::constants::BLOCK_VOLUME;

/// Storage for one 8³ block of signed distance values.
///
/// Blocks in the narrow band are dense; blocks entirely inside the solid
/// collapse to an `Interior` tile that reads as `-background` everywhere.
/// Blocks entirely outside are simply absent from the grid.
#[derive(Clone, Debug)]
pub enum VoxelBlock {
  Dense(Box<[f32; BLOCK_VOLUME]>),
  Interior,
}

/// Classification of a dense block's contents relative to the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockClass {
  /// Every voxel is at or beyond `+background`; the block is removable.
  AllOutside,
  /// Every voxel is at or beyond `-background`; collapses to `Interior`.
  AllInside,
  /// The block carries narrow-band values and must stay dense.
  Mixed,
}

impl VoxelBlock {
  /// A dense block with every voxel set to `value`.
  pub fn dense_filled(value: f32) -> Self {
    VoxelBlock::Dense(Box::new([value; BLOCK_VOLUME]))
  }

  /// Value at a block-local linear index.
  #[inline]
  pub fn get(&self, idx: usize, background: f32) -> f32 {
    match self {
      VoxelBlock::Dense(values) => values[idx],
      VoxelBlock::Interior => -background,
    }
  }

  /// Classify a dense block; `Interior` always reports `AllInside`.
  pub fn classify(&self, background: f32) -> BlockClass {
    let values = match self {
      VoxelBlock::Dense(values) => values,
      VoxelBlock::Interior => return BlockClass::AllInside,
    };

    let mut all_outside = true;
    let mut all_inside = true;
    for &v in values.iter() {
      if v < background {
        all_outside = false;
      }
      if v > -background {
        all_inside = false;
      }
      if !all_outside && !all_inside {
        return BlockClass::Mixed;
      }
    }
    if all_outside {
      BlockClass::AllOutside
    } else {
      BlockClass::AllInside
    }
  }

  /// True if any voxel carries a value strictly inside the band.
  pub fn has_band_values(&self, background: f32) -> bool {
    match self {
      VoxelBlock::Dense(values) => values.iter().any(|v| v.abs() < background),
      VoxelBlock::Interior => false,
    }
  }
}

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;
