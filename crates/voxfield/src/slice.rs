//! 2D cross-sections of the distance field.
//!
//! A slice samples the field on a horizontal plane into a caller-sized
//! f32 raster. Downstream consumers decide what the values mean via the
//! slice mode; the grid does not own any image format.

use glam::Vec3;

use crate::error::{Result, VoxError};
use crate::grid::DistanceGrid;

/// Pixel interpretation for [`DistanceGrid::fill_slice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceMode {
  /// Raw trilinear signed distance.
  SignedDistance,
  /// Inside 1.0, outside 0.0.
  BlackWhite,
  /// 1.0 at the surface and inside, smoothstep falloff to 0.0 at the
  /// narrow-band background distance.
  Antialiased,
}

/// Caller-owned 2D sample target.
#[derive(Clone, Debug)]
pub struct SliceBuffer {
  pub width: usize,
  pub height: usize,
  pub values: Vec<f32>,
}

impl SliceBuffer {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      values: vec![0.0; width * height],
    }
  }

  #[inline]
  pub fn value(&self, x: usize, y: usize) -> f32 {
    self.values[y * self.width + x]
  }
}

impl DistanceGrid {
  /// Sample the plane `z = z_mm` across the field's XY extent into
  /// `buffer`, row-major with pixel centers spread evenly over the
  /// extent. Returns the background distance value.
  ///
  /// Fails with [`VoxError::EmptyField`] when no voxels are allocated
  /// and [`VoxError::BufferSizeMismatch`] when `buffer.values` was
  /// resized away from `width * height`.
  pub fn fill_slice(&self, z_mm: f32, buffer: &mut SliceBuffer, mode: SliceMode) -> Result<f32> {
    if self.is_empty() {
      return Err(VoxError::EmptyField);
    }
    let expected = buffer.width * buffer.height;
    if buffer.values.len() != expected {
      return Err(VoxError::BufferSizeMismatch {
        expected,
        actual: buffer.values.len(),
      });
    }

    let bg = self.background();
    let bbox = self.bounding_box();
    let extent = bbox.size();

    tracing::debug!(
      width = buffer.width,
      height = buffer.height,
      z_mm,
      "fill_slice"
    );

    for row in 0..buffer.height {
      let fy = (row as f32 + 0.5) / buffer.height as f32;
      let y = bbox.min.y + fy * extent.y;
      for col in 0..buffer.width {
        let fx = (col as f32 + 0.5) / buffer.width as f32;
        let x = bbox.min.x + fx * extent.x;
        let d = self.sample(Vec3::new(x, y, z_mm));
        buffer.values[row * buffer.width + col] = match mode {
          SliceMode::SignedDistance => d,
          SliceMode::BlackWhite => {
            if d <= 0.0 {
              1.0
            } else {
              0.0
            }
          }
          SliceMode::Antialiased => {
            if d <= 0.0 {
              1.0
            } else {
              let t = (1.0 - d / bg).clamp(0.0, 1.0);
              t * t * (3.0 - 2.0 * t)
            }
          }
        };
      }
    }
    Ok(bg)
  }
}

#[cfg(test)]
#[path = "slice_test.rs"]
mod slice_test;
