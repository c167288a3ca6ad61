//! Error types for voxel editing and meshing.

use glam::UVec3;
use thiserror::Error;

/// Errors raised by grid edits, volume routing and surface extraction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoxelError {
  #[error("subdivision range {min}..={max} is invalid (limit is {limit})")]
  InvalidSubdivisions { min: u32, max: u32, limit: u32 },

  #[error("subdivision level {subdivisions} is outside {min}..={max}")]
  SubdivisionOutOfRange { subdivisions: u32, min: u32, max: u32 },

  #[error("chunk size must be positive and finite, got {0}")]
  InvalidChunkSize(f32),

  #[error("detail size must be positive and finite, got {0}")]
  InvalidDetailSize(f32),

  #[error("falloff distance must be positive and finite, got {0}")]
  InvalidFalloff(f32),

  #[error("volume size must be positive and finite on every axis")]
  InvalidVolumeSize,

  #[error("voxel buffer holds {actual} samples, grid needs {expected}")]
  BufferSizeMismatch { expected: usize, actual: usize },

  /// A cell's dual edges did not close into loops. This is a defect in the
  /// extractor, never a property of the voxel data.
  #[error("dual edges of cell {cell} do not close into loops (corner mask {corner_mask:#010b})")]
  OpenEdgeLoop { cell: UVec3, corner_mask: u8 },
}

pub type Result<T> = std::result::Result<T, VoxelError>;

/// Reject non-positive or non-finite sizes.
#[inline]
pub(crate) fn check_positive(value: f32, err: fn(f32) -> VoxelError) -> Result<f32> {
  if value.is_finite() && value > 0.0 {
    Ok(value)
  } else {
    Err(err(value))
  }
}
