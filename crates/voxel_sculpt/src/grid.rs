//! Dense voxel grid owned by a single chunk.
//!
//! The grid spans the unit cube `[0, 1]³` at `2^s + 1` samples per axis.
//! Storage is allocated by the first additive edit, and the subdivision level
//! only ever grows: an edit asking for finer detail than the current spacing
//! reallocates the grid and resamples the previous contents into it.

use glam::{Affine3A, UVec3, Vec3};

use crate::constants::{coord_to_index, samples_per_axis, FULLY_EMPTY, FULLY_SOLID, MAX_SUBDIVISIONS};
use crate::error::{check_positive, Result, VoxelError};
use crate::sdf::{SignedDistanceField, VoxelArraySdf};
use crate::types::{MaterialId, MinMaxAABB, Voxel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditOp {
  Add,
  Subtract,
}

impl EditOp {
  #[inline(always)]
  fn combine(self, prev: Voxel, next: Voxel) -> Voxel {
    match self {
      EditOp::Add => prev + next,
      EditOp::Subtract => prev - next,
    }
  }

  /// Conservative "the iso-surface may have moved" test for one voxel.
  #[inline(always)]
  fn may_change(self, prev: Voxel, next: Voxel) -> bool {
    match self {
      EditOp::Add => prev.raw < FULLY_SOLID && next.raw > FULLY_EMPTY,
      EditOp::Subtract => prev.raw > FULLY_EMPTY && next.raw > FULLY_EMPTY,
    }
  }
}

/// Dense `(2^s + 1)³` voxel array with adaptive resolution.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
  min_subdivisions: u32,
  max_subdivisions: u32,
  subdivisions: u32,
  size: UVec3,
  /// Empty until the first additive edit.
  voxels: Vec<Voxel>,
  /// Every voxel is known to be empty.
  cleared: bool,
}

impl VoxelGrid {
  /// Create an unallocated grid that may grow from `min_subdivisions` up to
  /// `max_subdivisions`.
  pub fn new(min_subdivisions: u32, max_subdivisions: u32) -> Result<Self> {
    validate_subdivisions(min_subdivisions, max_subdivisions)?;

    Ok(Self {
      min_subdivisions,
      max_subdivisions,
      subdivisions: min_subdivisions,
      size: UVec3::ZERO,
      voxels: Vec::new(),
      cleared: true,
    })
  }

  /// Rebuild a grid from a raw buffer previously read through
  /// [`VoxelGrid::voxels`].
  pub fn from_raw(
    min_subdivisions: u32,
    max_subdivisions: u32,
    subdivisions: u32,
    voxels: Vec<Voxel>,
  ) -> Result<Self> {
    validate_subdivisions(min_subdivisions, max_subdivisions)?;
    if !(min_subdivisions..=max_subdivisions).contains(&subdivisions) {
      return Err(VoxelError::SubdivisionOutOfRange {
        subdivisions,
        min: min_subdivisions,
        max: max_subdivisions,
      });
    }

    let size = UVec3::splat(samples_per_axis(subdivisions));
    let expected = (size.x * size.y * size.z) as usize;
    if voxels.len() != expected {
      return Err(VoxelError::BufferSizeMismatch {
        expected,
        actual: voxels.len(),
      });
    }

    let cleared = voxels.iter().all(|v| v.raw == FULLY_EMPTY);

    Ok(Self {
      min_subdivisions,
      max_subdivisions,
      subdivisions,
      size,
      voxels,
      cleared,
    })
  }

  #[inline]
  pub fn min_subdivisions(&self) -> u32 {
    self.min_subdivisions
  }

  #[inline]
  pub fn max_subdivisions(&self) -> u32 {
    self.max_subdivisions
  }

  /// Current subdivision level. Meaningful once allocated.
  #[inline]
  pub fn subdivisions(&self) -> u32 {
    self.subdivisions
  }

  /// Samples per axis, zero while unallocated.
  #[inline]
  pub fn size(&self) -> UVec3 {
    self.size
  }

  /// Distance between neighbouring samples in unit-cube space.
  #[inline]
  pub fn spacing(&self) -> f32 {
    1.0 / (1u32 << self.subdivisions) as f32
  }

  #[inline]
  pub fn is_allocated(&self) -> bool {
    !self.voxels.is_empty()
  }

  #[inline]
  pub fn is_cleared(&self) -> bool {
    self.cleared
  }

  /// Raw samples in x-minor order. Empty while unallocated.
  #[inline]
  pub fn voxels(&self) -> &[Voxel] {
    &self.voxels
  }

  /// Sample at lattice coordinates, if allocated and in range.
  pub fn get(&self, x: u32, y: u32, z: u32) -> Option<Voxel> {
    if !self.is_allocated() || x >= self.size.x || y >= self.size.y || z >= self.size.z {
      return None;
    }
    Some(self.voxels[coord_to_index(self.size, x, y, z)])
  }

  /// Union an SDF into the grid.
  ///
  /// `bounds` is the affected region in unit-cube space, `transform` maps
  /// unit-cube positions into SDF space and `detail_size` is the requested
  /// sample spacing in unit-cube space. Returns whether the surface may have
  /// changed.
  #[tracing::instrument(skip_all, name = "grid::add", level = "trace")]
  pub fn add<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    bounds: &MinMaxAABB,
    transform: &Affine3A,
    detail_size: f32,
    material: MaterialId,
  ) -> Result<bool> {
    check_positive(detail_size, VoxelError::InvalidDetailSize)?;
    self.prepare_for_detail(detail_size)?;

    Ok(self.apply(bounds, EditOp::Add, |pos| {
      Voxel::from_value(sdf.sample(transform.transform_point3(pos)), material)
    }))
  }

  /// Carve an SDF out of the grid.
  ///
  /// Never changes resolution. On an unallocated grid there is nothing to
  /// carve, so this reports no change.
  #[tracing::instrument(skip_all, name = "grid::subtract", level = "trace")]
  pub fn subtract<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    bounds: &MinMaxAABB,
    transform: &Affine3A,
    detail_size: f32,
    material: MaterialId,
  ) -> Result<bool> {
    check_positive(detail_size, VoxelError::InvalidDetailSize)?;
    if !self.is_allocated() {
      return Ok(false);
    }

    Ok(self.apply(bounds, EditOp::Subtract, |pos| {
      Voxel::from_value(sdf.sample(transform.transform_point3(pos)), material)
    }))
  }

  /// Zero every sample. Returns false if the grid was already empty.
  pub fn clear(&mut self) -> bool {
    if self.cleared || !self.is_allocated() {
      return false;
    }

    self.voxels.fill(Voxel::EMPTY);
    self.cleared = true;
    true
  }

  /// Allocate or upgrade storage so the spacing is at most `detail_size`,
  /// within the subdivision limit.
  fn prepare_for_detail(&mut self, detail_size: f32) -> Result<()> {
    let allocated = self.is_allocated();
    let needs_detail = self.spacing() > detail_size && self.subdivisions < self.max_subdivisions;
    if allocated && !needs_detail {
      return Ok(());
    }

    let target = 1.0 / detail_size;
    let mut subdivisions = self.subdivisions;
    while subdivisions < self.max_subdivisions && ((1u32 << subdivisions) as f32) < target {
      subdivisions += 1;
    }

    // Already at the target size
    if allocated && subdivisions == self.subdivisions {
      return Ok(());
    }

    let old_subdivisions = self.subdivisions;
    let old_size = self.size;
    let old_voxels = std::mem::take(&mut self.voxels);

    let size = UVec3::splat(samples_per_axis(subdivisions));
    self.subdivisions = subdivisions;
    self.size = size;
    self.voxels = vec![Voxel::EMPTY; (size.x * size.y * size.z) as usize];
    self.cleared = true;

    if allocated {
      tracing::debug!(
        from = old_subdivisions,
        to = subdivisions,
        "upgrading voxel grid resolution"
      );

      let previous = VoxelArraySdf::new(&old_voxels, old_size)?;
      self.apply(&MinMaxAABB::UNIT, EditOp::Add, |pos| {
        Voxel::from_value(previous.sample(pos), previous.material_at(pos))
      });
    }

    Ok(())
  }

  /// Combine `sample` into every lattice point covered by `bounds`.
  fn apply(&mut self, bounds: &MinMaxAABB, op: EditOp, sample: impl Fn(Vec3) -> Voxel) -> bool {
    let Some((min, max)) = self.edit_range(bounds) else {
      return false;
    };

    let spacing = self.spacing();
    let size = self.size;
    let mut changed = false;

    for z in min.z..max.z {
      for y in min.y..max.y {
        let row = coord_to_index(size, 0, y, z);
        for x in min.x..max.x {
          let pos = UVec3::new(x, y, z).as_vec3() * spacing;
          let next = sample(pos);
          let slot = &mut self.voxels[row + x as usize];
          let prev = *slot;

          *slot = op.combine(prev, next);
          changed |= op.may_change(prev, next);
        }
      }
    }

    if changed {
      self.cleared = false;
    }
    changed
  }

  /// Lattice range `[min, max)` touched by unit-space `bounds`.
  fn edit_range(&self, bounds: &MinMaxAABB) -> Option<(UVec3, UVec3)> {
    let size = self.size.as_vec3();
    let last = size - Vec3::ONE;

    let min = (bounds.min * last).floor().clamp(Vec3::ZERO, size);
    let max = ((bounds.max * last).ceil() + Vec3::ONE).clamp(Vec3::ZERO, size);

    let min = min.as_uvec3();
    let max = max.as_uvec3();

    if min.cmplt(max).all() {
      Some((min, max))
    } else {
      None
    }
  }
}

fn validate_subdivisions(min: u32, max: u32) -> Result<()> {
  if min > max || max > MAX_SUBDIVISIONS {
    return Err(VoxelError::InvalidSubdivisions {
      min,
      max,
      limit: MAX_SUBDIVISIONS,
    });
  }
  Ok(())
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
