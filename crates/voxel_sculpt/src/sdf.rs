//! Signed distance field primitives used as edit brushes.
//!
//! Every field returns a distance already normalized by its falloff, so
//! `sample(p) >= 1.0` deep inside, `<= -1.0` far outside and `0.0` on the
//! surface. Samples are quantized straight into [`Voxel`]s and combined with
//! the grid, which keeps edits free of any per-voxel rescaling.
//!
//! Evaluation never allocates; it runs once per voxel in the edited region.

use glam::{UVec3, Vec3};

use crate::constants::strides;
use crate::error::{check_positive, Result, VoxelError};
use crate::types::{MaterialId, MinMaxAABB, Voxel};

/// A shape that can be stamped into a voxel grid.
pub trait SignedDistanceField {
  /// Conservative bounds covering every point where `sample` is not
  /// saturated (shape extent plus falloff margin).
  fn bounds(&self) -> MinMaxAABB;

  /// Falloff-normalized signed distance. Positive inside, negative outside.
  fn sample(&self, pos: Vec3) -> f32;
}

impl<T: SignedDistanceField + ?Sized> SignedDistanceField for &T {
  #[inline]
  fn bounds(&self) -> MinMaxAABB {
    (**self).bounds()
  }

  #[inline]
  fn sample(&self, pos: Vec3) -> f32 {
    (**self).sample(pos)
  }
}

impl<T: SignedDistanceField + ?Sized> SignedDistanceField for Box<T> {
  #[inline]
  fn bounds(&self) -> MinMaxAABB {
    (**self).bounds()
  }

  #[inline]
  fn sample(&self, pos: Vec3) -> f32 {
    (**self).sample(pos)
  }
}

/// Sphere with a linear falloff band around its surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereSdf {
  pub center: Vec3,
  pub radius: f32,
  pub falloff: f32,
  inv_falloff: f32,
}

impl SphereSdf {
  pub fn new(center: Vec3, radius: f32, falloff: f32) -> Result<Self> {
    let falloff = check_positive(falloff, VoxelError::InvalidFalloff)?;
    Ok(Self {
      center,
      radius,
      falloff,
      inv_falloff: 1.0 / falloff,
    })
  }
}

impl SignedDistanceField for SphereSdf {
  fn bounds(&self) -> MinMaxAABB {
    let extent = Vec3::splat(self.radius + self.falloff);
    MinMaxAABB::new(self.center - extent, self.center + extent)
  }

  #[inline]
  fn sample(&self, pos: Vec3) -> f32 {
    (self.radius - self.center.distance(pos)) * self.inv_falloff
  }
}

/// Axis-aligned box.
///
/// Distance is the smallest per-axis distance to a face, which gives a square
/// falloff around edges and corners instead of a rounded one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxSdf {
  pub extent: MinMaxAABB,
  pub falloff: f32,
  inv_falloff: f32,
}

impl BoxSdf {
  pub fn new(min: Vec3, max: Vec3, falloff: f32) -> Result<Self> {
    Self::from_bounds(MinMaxAABB::new(min, max), falloff)
  }

  pub fn from_bounds(extent: MinMaxAABB, falloff: f32) -> Result<Self> {
    let falloff = check_positive(falloff, VoxelError::InvalidFalloff)?;
    Ok(Self {
      extent,
      falloff,
      inv_falloff: 1.0 / falloff,
    })
  }
}

impl SignedDistanceField for BoxSdf {
  fn bounds(&self) -> MinMaxAABB {
    self.extent.expanded(self.falloff)
  }

  #[inline]
  fn sample(&self, pos: Vec3) -> f32 {
    let dist = (pos - self.extent.min).min(self.extent.max - pos);
    dist.min_element() * self.inv_falloff
  }
}

/// Trilinear view over an existing voxel array covering the unit cube.
///
/// Used to carry a grid's contents across a resolution upgrade. Exact lattice
/// points return the stored sample without blending, so sharp edits survive
/// upsampling unchanged.
#[derive(Clone, Copy, Debug)]
pub struct VoxelArraySdf<'a> {
  voxels: &'a [Voxel],
  size: UVec3,
  stride: [usize; 3],
}

impl<'a> VoxelArraySdf<'a> {
  pub fn new(voxels: &'a [Voxel], size: UVec3) -> Result<Self> {
    let expected = size.x as usize * size.y as usize * size.z as usize;
    if voxels.len() != expected || size.min_element() == 0 {
      return Err(VoxelError::BufferSizeMismatch {
        expected,
        actual: voxels.len(),
      });
    }

    Ok(Self {
      voxels,
      size,
      stride: strides(size),
    })
  }

  pub fn size(&self) -> UVec3 {
    self.size
  }

  #[inline(always)]
  fn index(&self, coord: UVec3) -> usize {
    coord.x as usize * self.stride[0]
      + coord.y as usize * self.stride[1]
      + coord.z as usize * self.stride[2]
  }

  #[inline(always)]
  fn value_at(&self, coord: UVec3) -> f32 {
    self.voxels[self.index(coord)].value()
  }

  #[inline(always)]
  fn lattice(&self, pos: Vec3) -> Vec3 {
    pos * (self.size - UVec3::ONE).as_vec3()
  }

  /// Material of the nearest stored sample.
  pub fn material_at(&self, pos: Vec3) -> MaterialId {
    let max = (self.size - UVec3::ONE).as_vec3();
    let nearest = self.lattice(pos).round().clamp(Vec3::ZERO, max).as_uvec3();
    self.voxels[self.index(nearest)].material
  }
}

impl SignedDistanceField for VoxelArraySdf<'_> {
  fn bounds(&self) -> MinMaxAABB {
    MinMaxAABB::UNIT
  }

  fn sample(&self, pos: Vec3) -> f32 {
    let local = self.lattice(pos);
    let floored = local.floor();
    let max_index = (self.size - UVec3::ONE).as_vec3();

    let min = floored.clamp(Vec3::ZERO, max_index).as_uvec3();
    let max = local.ceil().clamp(Vec3::ZERO, max_index).as_uvec3();

    if min == max {
      return self.value_at(min);
    }

    let t = local - floored;

    let v000 = self.value_at(UVec3::new(min.x, min.y, min.z));
    let v100 = self.value_at(UVec3::new(max.x, min.y, min.z));
    let v010 = self.value_at(UVec3::new(min.x, max.y, min.z));
    let v110 = self.value_at(UVec3::new(max.x, max.y, min.z));
    let v001 = self.value_at(UVec3::new(min.x, min.y, max.z));
    let v101 = self.value_at(UVec3::new(max.x, min.y, max.z));
    let v011 = self.value_at(UVec3::new(min.x, max.y, max.z));
    let v111 = self.value_at(UVec3::new(max.x, max.y, max.z));

    let v_00 = lerp(v000, v100, t.x);
    let v_10 = lerp(v010, v110, t.x);
    let v_01 = lerp(v001, v101, t.x);
    let v_11 = lerp(v011, v111, t.x);

    let v__0 = lerp(v_00, v_10, t.y);
    let v__1 = lerp(v_01, v_11, t.y);

    lerp(v__0, v__1, t.z)
  }
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
  a + (b - a) * t
}

#[cfg(test)]
#[path = "sdf_test.rs"]
mod sdf_test;
