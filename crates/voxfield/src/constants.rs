//! Block layout constants for the sparse distance field.
//!
//! The grid stores voxels in 8³ dense blocks keyed by block coordinate.
//! Eight samples per axis keeps a block at 2 KiB of f32 values (one block
//! spans `8 × voxel_size` millimeters) and allows bit-shift index math.
//!
//! # Memory Layout
//!
//! ```text
//! Block memory layout (row-major, Z innermost):
//!
//! index = x << 6 | y << 3 | z
//!       = x * 64 + y * 8 + z
//! ```
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          │
//!          └───────── +X
//!         /
//!        +Z
//!
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

use glam::IVec3;

/// Number of voxels per block axis (must be a power of two).
pub const BLOCK_SIZE: usize = 8;

/// Signed block size for coordinate math.
pub const BLOCK_SIZE_I: i32 = BLOCK_SIZE as i32;

/// Total voxels in a block (8³ = 512).
pub const BLOCK_VOLUME: usize = BLOCK_SIZE * BLOCK_SIZE * BLOCK_SIZE;

/// Bit shift for Y coordinate indexing (log2(8) = 3).
pub const Y_SHIFT: u32 = 3;

/// Bit shift for X coordinate indexing (log2(64) = 6).
pub const X_SHIFT: u32 = 6;

/// Mask for extracting a single axis from an index (0x7 = 7).
pub const INDEX_MASK: usize = 0x7;

/// Default narrow-band half width, in voxels.
///
/// Distance values are clamped to `±band_voxels * voxel_size`; everything
/// beyond reads the background constant.
pub const DEFAULT_BAND_VOXELS: f32 = 3.0;

/// Convert block-local 3D coordinates to a linear index using bit shifts.
///
/// Layout: X is major axis (stride 64), Y is middle (stride 8), Z is minor
/// (stride 1).
#[inline(always)]
pub const fn coord_to_index(x: usize, y: usize, z: usize) -> usize {
  (x << X_SHIFT) | (y << Y_SHIFT) | z
}

/// Convert a linear index back to block-local 3D coordinates.
#[inline(always)]
pub const fn index_to_coord(idx: usize) -> (usize, usize, usize) {
  let x = idx >> X_SHIFT;
  let y = (idx >> Y_SHIFT) & INDEX_MASK;
  let z = idx & INDEX_MASK;
  (x, y, z)
}

/// Block coordinate containing a global voxel coordinate.
#[inline(always)]
pub fn block_of(coord: IVec3) -> IVec3 {
  IVec3::new(
    coord.x.div_euclid(BLOCK_SIZE_I),
    coord.y.div_euclid(BLOCK_SIZE_I),
    coord.z.div_euclid(BLOCK_SIZE_I),
  )
}

/// Block-local linear index of a global voxel coordinate.
#[inline(always)]
pub fn local_index_of(coord: IVec3) -> usize {
  coord_to_index(
    coord.x.rem_euclid(BLOCK_SIZE_I) as usize,
    coord.y.rem_euclid(BLOCK_SIZE_I) as usize,
    coord.z.rem_euclid(BLOCK_SIZE_I) as usize,
  )
}

/// Voxel-space offsets of the 8 cube corners (binary: ZYX).
pub const CELL_CORNERS: [IVec3; 8] = [
  IVec3::new(0, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(1, 1, 0),
  IVec3::new(0, 0, 1),
  IVec3::new(1, 0, 1),
  IVec3::new(0, 1, 1),
  IVec3::new(1, 1, 1),
];

/// Corner index pairs for the 12 cube edges.
pub const CELL_EDGES: [[usize; 2]; 12] = [
  [0, 1],
  [0, 2],
  [0, 4],
  [1, 3],
  [1, 5],
  [2, 3],
  [2, 6],
  [3, 7],
  [4, 5],
  [4, 6],
  [5, 7],
  [6, 7],
];

/// 6-connected neighbor offsets, used by narrow-band propagation.
pub const FACE_NEIGHBORS: [IVec3; 6] = [
  IVec3::new(1, 0, 0),
  IVec3::new(-1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, -1, 0),
  IVec3::new(0, 0, 1),
  IVec3::new(0, 0, -1),
];

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
