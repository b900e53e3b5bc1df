//! Sparse narrow-band signed distance field grid.
//!
//! Geometry is represented as a signed distance field: negative inside the
//! solid, positive outside, metrically accurate within a narrow band around
//! the surface. Storage is an index-addressed map of 8³ dense blocks; deep
//! interior collapses to uniform tiles and exterior blocks are absent, so
//! memory scales with surface area rather than bounding volume.
//!
//! ```text
//!            outside (absent blocks, reads +background)
//!   ┌────────────────────────────────────────────────┐
//!   │            ┌─────band─────┐                    │
//!   │   ~~~~~~~~~│  -b … 0 … +b │~~~~~~~~~~          │
//!   │            └──────────────┘                    │
//!   │     inside (Interior tiles, reads -background) │
//!   └────────────────────────────────────────────────┘
//! ```
//!
//! Values are clamped to `±background = ±band_voxels * voxel_size` on every
//! write, so a queried coordinate always yields a well-defined finite value.

mod block;

pub use block::{BlockClass, VoxelBlock};

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::bounds::BBox3;
use crate::constants::{
  block_of, coord_to_index, local_index_of, BLOCK_SIZE, BLOCK_SIZE_I, BLOCK_VOLUME,
  DEFAULT_BAND_VOXELS,
};
use crate::error::{Result, VoxError};
use crate::metadata::FieldMetadata;

/// Grid construction parameters.
///
/// The voxel size is fixed for the lifetime of a grid; independently
/// configured grids can coexist in one process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
  /// Edge length of one voxel in millimeters.
  pub voxel_size: f32,
  /// Narrow-band half width in voxels.
  pub band_voxels: f32,
}

impl GridConfig {
  /// Config with the default narrow-band width.
  pub fn new(voxel_size: f32) -> Self {
    Self {
      voxel_size,
      band_voxels: DEFAULT_BAND_VOXELS,
    }
  }

  pub fn with_band_voxels(mut self, band_voxels: f32) -> Self {
    self.band_voxels = band_voxels;
    self
  }

  /// The background distance value, `band_voxels * voxel_size`.
  #[inline]
  pub fn background(&self) -> f32 {
    self.band_voxels * self.voxel_size
  }

  fn validate(&self) -> Result<()> {
    if !(self.voxel_size > 0.0) || !self.voxel_size.is_finite() {
      return Err(VoxError::InvalidParameter(format!(
        "voxel_size must be positive and finite, got {}",
        self.voxel_size
      )));
    }
    if !(self.band_voxels >= 1.0) || !self.band_voxels.is_finite() {
      return Err(VoxError::InvalidParameter(format!(
        "band_voxels must be at least 1, got {}",
        self.band_voxels
      )));
    }
    Ok(())
  }
}

/// Index-space extent of active content, in voxels.
///
/// Reported at block granularity: computing it never touches voxel values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelDimensions {
  /// Smallest voxel coordinate covered by an active block.
  pub origin: IVec3,
  /// Extent in voxels along each axis (zero for an empty grid).
  pub size: IVec3,
}

/// Sparse narrow-band signed distance field.
///
/// Not internally synchronized: mutation requires `&mut self`, concurrent
/// reads of an unchanging grid are safe.
#[derive(Clone, Debug)]
pub struct DistanceGrid {
  config: GridConfig,
  blocks: HashMap<IVec3, VoxelBlock>,
  metadata: FieldMetadata,
}

impl DistanceGrid {
  /// Create an empty grid.
  pub fn new(config: GridConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      config,
      blocks: HashMap::new(),
      metadata: FieldMetadata::new(),
    })
  }

  /// An empty grid sharing this grid's configuration. Metadata is not
  /// carried over.
  pub fn empty_clone(&self) -> Self {
    Self {
      config: self.config,
      blocks: HashMap::new(),
      metadata: FieldMetadata::new(),
    }
  }

  /// An empty grid with this grid's band width at `factor` times the
  /// voxel size. `factor` must be positive and finite.
  pub(crate) fn scaled_empty(&self, factor: f32) -> Self {
    debug_assert!(factor.is_finite() && factor > 0.0);
    Self {
      config: GridConfig {
        voxel_size: self.config.voxel_size * factor,
        band_voxels: self.config.band_voxels,
      },
      blocks: HashMap::new(),
      metadata: FieldMetadata::new(),
    }
  }

  #[inline]
  pub fn config(&self) -> GridConfig {
    self.config
  }

  #[inline]
  pub fn voxel_size(&self) -> f32 {
    self.config.voxel_size
  }

  /// The background distance value returned outside the narrow band.
  #[inline]
  pub fn background(&self) -> f32 {
    self.config.background()
  }

  /// True for any successfully constructed grid with sane configuration.
  pub fn is_valid(&self) -> bool {
    self.config.validate().is_ok()
  }

  /// True if the grid stores no blocks at all.
  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  /// True if any voxel carries a value strictly inside the narrow band,
  /// i.e. the field has a surface to query.
  pub fn has_surface(&self) -> bool {
    self
      .blocks
      .values()
      .any(|b| b.has_band_values(self.background()))
  }

  pub fn metadata(&self) -> &FieldMetadata {
    &self.metadata
  }

  pub fn metadata_mut(&mut self) -> &mut FieldMetadata {
    &mut self.metadata
  }

  // ===========================================================================
  // Coordinate transforms
  // ===========================================================================

  /// World position of a voxel center. Voxel `i` is centered at
  /// `i * voxel_size`.
  #[inline]
  pub fn voxel_to_world(&self, coord: IVec3) -> Vec3 {
    coord.as_vec3() * self.config.voxel_size
  }

  /// Continuous voxel-space position of a world point.
  #[inline]
  pub fn world_to_voxel(&self, point: Vec3) -> Vec3 {
    point / self.config.voxel_size
  }

  // ===========================================================================
  // Voxel access
  // ===========================================================================

  /// Signed distance stored at a voxel coordinate.
  ///
  /// Always well-defined: absent blocks read `+background`, interior tiles
  /// read `-background`.
  #[inline]
  pub fn value_at(&self, coord: IVec3) -> f32 {
    match self.blocks.get(&block_of(coord)) {
      Some(block) => block.get(local_index_of(coord), self.background()),
      None => self.background(),
    }
  }

  /// Write a signed distance value, clamped to `±background`.
  ///
  /// Writing a background value to an untouched region allocates nothing.
  pub fn set_value(&mut self, coord: IVec3, value: f32) {
    let bg = self.background();
    let clamped = if value.is_nan() { bg } else { value.clamp(-bg, bg) };

    let key = block_of(coord);
    match self.blocks.get(&key) {
      None if clamped >= bg => return,
      Some(VoxelBlock::Interior) if clamped <= -bg => return,
      _ => {}
    }
    let values = self.dense_block_mut(key);
    values[local_index_of(coord)] = clamped;
  }

  /// Unclamped write, used by narrow-band extension during offsetting.
  /// Values are brought back into the band by [`clamp_and_prune`].
  ///
  /// [`clamp_and_prune`]: DistanceGrid::clamp_and_prune
  pub(crate) fn set_value_raw(&mut self, coord: IVec3, value: f32) {
    let key = block_of(coord);
    let values = self.dense_block_mut(key);
    values[local_index_of(coord)] = value;
  }

  /// Mutable dense storage for a block, materializing it if needed.
  ///
  /// Absent blocks materialize filled with `+background`, interior tiles
  /// with `-background`.
  pub(crate) fn dense_block_mut(&mut self, key: IVec3) -> &mut [f32; BLOCK_VOLUME] {
    let bg = self.background();
    let block = self
      .blocks
      .entry(key)
      .or_insert_with(|| VoxelBlock::dense_filled(bg));
    if matches!(block, VoxelBlock::Interior) {
      *block = VoxelBlock::dense_filled(-bg);
    }
    match block {
      VoxelBlock::Dense(values) => values,
      VoxelBlock::Interior => unreachable!("interior tile was just densified"),
    }
  }

  pub(crate) fn block(&self, key: IVec3) -> Option<&VoxelBlock> {
    self.blocks.get(&key)
  }

  pub(crate) fn blocks(&self) -> &HashMap<IVec3, VoxelBlock> {
    &self.blocks
  }

  pub(crate) fn insert_block(&mut self, key: IVec3, block: VoxelBlock) {
    self.blocks.insert(key, block);
  }

  pub(crate) fn remove_block(&mut self, key: IVec3) {
    self.blocks.remove(&key);
  }

  /// Block keys in sorted order, for deterministic traversal.
  pub(crate) fn sorted_block_keys(&self) -> Vec<IVec3> {
    let mut keys: Vec<IVec3> = self.blocks.keys().copied().collect();
    keys.sort_unstable_by_key(|k| (k.x, k.y, k.z));
    keys
  }

  /// Visit every narrow-band voxel (|value| < background) of every dense
  /// block, in deterministic order.
  pub(crate) fn for_each_band_voxel(&self, mut f: impl FnMut(IVec3, f32)) {
    let bg = self.background();
    for key in self.sorted_block_keys() {
      let values = match &self.blocks[&key] {
        VoxelBlock::Dense(values) => values,
        VoxelBlock::Interior => continue,
      };
      let base = key * BLOCK_SIZE_I;
      for x in 0..BLOCK_SIZE {
        for y in 0..BLOCK_SIZE {
          for z in 0..BLOCK_SIZE {
            let v = values[coord_to_index(x, y, z)];
            if v.abs() < bg {
              f(base + IVec3::new(x as i32, y as i32, z as i32), v);
            }
          }
        }
      }
    }
  }

  // ===========================================================================
  // Interpolation
  // ===========================================================================

  /// Trilinearly interpolated signed distance at a world point.
  pub fn sample(&self, point: Vec3) -> f32 {
    let f = self.world_to_voxel(point);
    let base = f.floor();
    let t = f - base;
    let b = base.as_ivec3();

    let mut corners = [0.0f32; 8];
    for (i, offset) in crate::constants::CELL_CORNERS.iter().enumerate() {
      corners[i] = self.value_at(b + *offset);
    }

    // Lerp along X, then Y, then Z (corner order is binary ZYX).
    let c00 = corners[0] + (corners[1] - corners[0]) * t.x;
    let c10 = corners[2] + (corners[3] - corners[2]) * t.x;
    let c01 = corners[4] + (corners[5] - corners[4]) * t.x;
    let c11 = corners[6] + (corners[7] - corners[6]) * t.x;
    let c0 = c00 + (c10 - c00) * t.y;
    let c1 = c01 + (c11 - c01) * t.y;
    c0 + (c1 - c0) * t.z
  }

  // ===========================================================================
  // Maintenance
  // ===========================================================================

  /// Clamp every stored value back into `±background`.
  pub(crate) fn clamp_values(&mut self) {
    let bg = self.background();
    for block in self.blocks.values_mut() {
      if let VoxelBlock::Dense(values) = block {
        for v in values.iter_mut() {
          *v = v.clamp(-bg, bg);
        }
      }
    }
  }

  /// Drop all-outside blocks and collapse all-inside blocks to interior
  /// tiles.
  pub fn prune(&mut self) {
    let bg = self.background();
    let mut to_interior = Vec::new();
    self.blocks.retain(|key, block| match block.classify(bg) {
      BlockClass::AllOutside => false,
      BlockClass::AllInside => {
        if matches!(block, VoxelBlock::Dense(_)) {
          to_interior.push(*key);
        }
        true
      }
      BlockClass::Mixed => true,
    });
    for key in to_interior {
      self.blocks.insert(key, VoxelBlock::Interior);
    }
  }

  /// Clamp and prune in one pass, restoring the narrow-band invariant.
  pub(crate) fn clamp_and_prune(&mut self) {
    self.clamp_values();
    self.prune();
  }

  // ===========================================================================
  // Comparison and extent
  // ===========================================================================

  /// Exact equality: every voxel coordinate reads the same value in both
  /// grids. Representation differences (pruned background vs. explicitly
  /// stored background, dense vs. interior tile) do not affect the result,
  /// but differing voxel sizes always compare unequal.
  pub fn is_equal(&self, other: &DistanceGrid) -> bool {
    if self.config != other.config {
      return false;
    }

    let mut keys: Vec<IVec3> = self.blocks.keys().copied().collect();
    for key in other.blocks.keys() {
      if !self.blocks.contains_key(key) {
        keys.push(*key);
      }
    }

    let bg = self.background();
    for key in keys {
      let a = self.blocks.get(&key);
      let b = other.blocks.get(&key);
      for idx in 0..BLOCK_VOLUME {
        let va = a.map_or(bg, |blk| blk.get(idx, bg));
        let vb = b.map_or(bg, |blk| blk.get(idx, bg));
        if va != vb {
          return false;
        }
      }
    }
    true
  }

  /// Index-space extent of active blocks. Never reads voxel values, so it
  /// is cheap even on large fields; the answer is block-granular.
  pub fn voxel_dimensions(&self) -> VoxelDimensions {
    if self.blocks.is_empty() {
      return VoxelDimensions {
        origin: IVec3::ZERO,
        size: IVec3::ZERO,
      };
    }
    let mut min = IVec3::MAX;
    let mut max = IVec3::MIN;
    for key in self.blocks.keys() {
      min = min.min(*key);
      max = max.max(*key);
    }
    VoxelDimensions {
      origin: min * BLOCK_SIZE_I,
      size: (max - min + IVec3::ONE) * BLOCK_SIZE_I,
    }
  }

  /// World-space box covering all active blocks (block-granular, cheap).
  /// For a tight box over the solid, use
  /// [`calculate_properties`](DistanceGrid::calculate_properties).
  pub fn bounding_box(&self) -> BBox3 {
    let dims = self.voxel_dimensions();
    if dims.size == IVec3::ZERO {
      return BBox3::empty();
    }
    let s = self.config.voxel_size;
    BBox3::new(
      dims.origin.as_vec3() * s,
      (dims.origin + dims.size).as_vec3() * s,
    )
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
