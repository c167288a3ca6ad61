//! VolumeConfig - chunk layout, resolution limits and shading style of a
//! voxel volume.

use glam::{IVec3, Vec3};

use crate::constants::{FLAT_MARGIN, MAX_SUBDIVISIONS, SMOOTH_MARGIN};
use crate::error::{check_positive, Result, VoxelError};

/// How the host shades chunk meshes.
///
/// Smooth shading reads neighbouring samples across chunk borders, so edits
/// have to reach one voxel further into adjacent chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NormalStyle {
  Flat,
  #[default]
  Smooth,
}

impl NormalStyle {
  /// Border margin in voxels applied to edit bounds.
  #[inline]
  pub const fn margin(self) -> u32 {
    match self {
      NormalStyle::Flat => FLAT_MARGIN,
      NormalStyle::Smooth => SMOOTH_MARGIN,
    }
  }
}

/// Configuration for a chunked voxel volume.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeConfig {
  /// Extent of a bounded volume, centred on its origin. `None` grows chunks
  /// in every direction without limit.
  pub local_size: Option<Vec3>,

  /// World size of one chunk along each axis.
  pub chunk_size: f32,

  /// Subdivision level of a freshly allocated chunk grid.
  pub min_subdivisions: u32,

  /// Finest subdivision a chunk grid may be upgraded to.
  pub max_subdivisions: u32,

  pub normal_style: NormalStyle,

  /// Sample spacing in world units used by `add` / `subtract`.
  pub default_detail_size: f32,
}

impl Default for VolumeConfig {
  fn default() -> Self {
    Self {
      local_size: None,
      chunk_size: 32.0,
      min_subdivisions: 4,
      max_subdivisions: 4,
      normal_style: NormalStyle::default(),
      default_detail_size: 2.0,
    }
  }
}

impl VolumeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_local_size(mut self, size: Vec3) -> Self {
    self.local_size = Some(size);
    self
  }

  pub fn unbounded(mut self) -> Self {
    self.local_size = None;
    self
  }

  pub fn with_chunk_size(mut self, size: f32) -> Self {
    self.chunk_size = size;
    self
  }

  pub fn with_subdivisions(mut self, min: u32, max: u32) -> Self {
    self.min_subdivisions = min;
    self.max_subdivisions = max;
    self
  }

  pub fn with_normal_style(mut self, style: NormalStyle) -> Self {
    self.normal_style = style;
    self
  }

  pub fn with_default_detail_size(mut self, size: f32) -> Self {
    self.default_detail_size = size;
    self
  }

  /// Reject configurations that cannot produce a working volume.
  pub fn validate(&self) -> Result<()> {
    check_positive(self.chunk_size, VoxelError::InvalidChunkSize)?;
    check_positive(self.default_detail_size, VoxelError::InvalidDetailSize)?;

    if self.min_subdivisions > self.max_subdivisions || self.max_subdivisions > MAX_SUBDIVISIONS {
      return Err(VoxelError::InvalidSubdivisions {
        min: self.min_subdivisions,
        max: self.max_subdivisions,
        limit: MAX_SUBDIVISIONS,
      });
    }

    if let Some(size) = self.local_size {
      if !size.is_finite() || size.cmple(Vec3::ZERO).any() {
        return Err(VoxelError::InvalidVolumeSize);
      }
    }

    Ok(())
  }

  /// Volume-local position of chunk `(0, 0, 0)`'s minimum corner.
  #[inline]
  pub fn chunk_offset(&self) -> Vec3 {
    self.local_size.map_or(Vec3::ZERO, |size| size * -0.5)
  }

  /// Chunks per axis of a bounded volume.
  #[inline]
  pub fn chunk_count(&self) -> Option<IVec3> {
    self
      .local_size
      .map(|size| (size / self.chunk_size).ceil().as_ivec3())
  }

  /// Edit margin in chunk-grid units (one chunk = 1.0).
  ///
  /// Measured at the coarsest resolution, so it covers the margin of every
  /// grid in the volume.
  #[inline]
  pub fn chunk_margin(&self) -> f32 {
    self.normal_style.margin() as f32 / (1u32 << self.min_subdivisions) as f32
  }
}
