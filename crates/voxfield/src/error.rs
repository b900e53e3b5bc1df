//! Error taxonomy for the voxel kernel.
//!
//! Queries that legitimately find nothing (no surface, no ray hit) return
//! `Option`/`bool` instead of an error. `VoxError` is reserved for caller
//! contract violations that are cheap to detect.

use thiserror::Error;

/// Errors produced by grid construction and contract-checked operations.
#[derive(Debug, Error)]
pub enum VoxError {
  /// A parameter violated the documented input contract, e.g. a negative
  /// filter kernel size or a non-positive voxel size.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// The operation requires a non-empty field.
  #[error("distance field contains no voxels")]
  EmptyField,

  /// A caller-provided buffer does not match its declared dimensions.
  #[error("buffer size mismatch: expected {expected} values, got {actual}")]
  BufferSizeMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, VoxError>;
