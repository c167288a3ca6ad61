//! Core data types for voxel editing and surface extraction.

use std::ops::{Add, Sub};

use glam::{Affine3A, Vec3};

use crate::constants::ISO_THRESHOLD;

/// Material identifier stored alongside each voxel.
pub type MaterialId = u8;

/// Quantization utilities for the 8-bit voxel value.
///
/// Maps a normalized signed distance in `[-1, 1]` onto `[0, 255]`.
/// Positive = inside/solid, negative = outside/air.
pub mod voxel_value {
  /// Half of the raw range; raw 127.5 would decode to exactly zero.
  pub const HALF_RANGE: f32 = 127.5;

  /// Convert a normalized distance to raw storage.
  ///
  /// Halfway cases round to even, so `0.0` lands on 128.
  #[inline(always)]
  pub fn to_storage(value: f32) -> u8 {
    (value * HALF_RANGE + HALF_RANGE).round_ties_even().clamp(0.0, 255.0) as u8
  }

  /// Decode raw storage back into a normalized distance.
  ///
  /// `0 → -1.0`, `255 → 1.0`, linear in between.
  #[inline(always)]
  pub fn to_float(raw: u8) -> f32 {
    (raw as f32 - HALF_RANGE) / HALF_RANGE
  }

  /// One quantization step in normalized units.
  pub const STEP: f32 = 1.0 / HALF_RANGE;
}

/// Quantized signed distance sample plus its material.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Voxel {
  /// Encoded distance, see [`voxel_value`].
  pub raw: u8,
  /// Material of the most recent edit that touched this voxel.
  pub material: MaterialId,
}

impl Voxel {
  /// Fully empty voxel (decodes to -1.0).
  pub const EMPTY: Self = Self { raw: 0, material: 0 };

  #[inline(always)]
  pub const fn from_raw(raw: u8, material: MaterialId) -> Self {
    Self { raw, material }
  }

  /// Quantize a normalized signed distance.
  #[inline(always)]
  pub fn from_value(value: f32, material: MaterialId) -> Self {
    Self {
      raw: voxel_value::to_storage(value),
      material,
    }
  }

  /// Decoded signed distance in `[-1, 1]`.
  #[inline(always)]
  pub fn value(self) -> f32 {
    voxel_value::to_float(self.raw)
  }

  /// True if this sample lies inside the surface.
  #[inline(always)]
  pub const fn is_inside(self) -> bool {
    self.raw >= ISO_THRESHOLD
  }
}

/// Saturating union: raw values sum and clamp at 255, material comes from `rhs`.
impl Add for Voxel {
  type Output = Voxel;

  #[inline(always)]
  fn add(self, rhs: Voxel) -> Voxel {
    Voxel::from_raw(self.raw.saturating_add(rhs.raw), rhs.material)
  }
}

/// Saturating difference: raw values subtract and clamp at 0, material comes
/// from `rhs`.
impl Sub for Voxel {
  type Output = Voxel;

  #[inline(always)]
  fn sub(self, rhs: Voxel) -> Voxel {
    Voxel::from_raw(self.raw.saturating_sub(rhs.raw), rhs.material)
  }
}

/// Output vertex with all mesh attributes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// Vertex position in chunk-local world units.
  pub position: [f32; 3],

  /// Flat face normal (unit vector).
  pub normal: [f32; 3],

  /// Direction of the first triangle edge (unit vector).
  pub tangent: [f32; 3],
}

impl Vertex {
  #[inline]
  pub fn new(position: Vec3, normal: Vec3, tangent: Vec3) -> Self {
    Self {
      position: position.to_array(),
      normal: normal.to_array(),
      tangent: tangent.to_array(),
    }
  }
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      tangent: [1.0, 0.0, 0.0],
    }
  }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: Vec3,
  pub max: Vec3,
}

impl MinMaxAABB {
  /// Unit cube `[0, 1]³`, the logical extent of every chunk grid.
  pub const UNIT: Self = Self {
    min: Vec3::ZERO,
    max: Vec3::ONE,
  };

  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::INFINITY,
      max: Vec3::NEG_INFINITY,
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }

  /// Grow the box by `margin` on every side.
  pub fn expanded(&self, margin: f32) -> Self {
    Self::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
  }

  /// Shift the box by `offset`.
  pub fn translated(&self, offset: Vec3) -> Self {
    Self::new(self.min + offset, self.max + offset)
  }

  /// Scale both corners by `factor` (component-wise, factor must be positive).
  pub fn scaled(&self, factor: Vec3) -> Self {
    Self::new(self.min * factor, self.max * factor)
  }

  /// Iterate the 8 corners (corner `i` uses max on axis `a` when bit `a` is set).
  pub fn corners(&self) -> [Vec3; 8] {
    std::array::from_fn(|i| {
      Vec3::new(
        if i & 1 == 0 { self.min.x } else { self.max.x },
        if i & 2 == 0 { self.min.y } else { self.max.y },
        if i & 4 == 0 { self.min.z } else { self.max.z },
      )
    })
  }

  /// Conservative bounds of this box after an affine transform.
  pub fn transformed(&self, transform: &Affine3A) -> Self {
    let mut out = Self::empty();
    for corner in self.corners() {
      out.encapsulate(transform.transform_point3(corner));
    }
    out
  }

  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Mesh extraction result: fully expanded triangle list, three vertices per
/// triangle, no index buffer.
#[derive(Clone, Debug, Default)]
pub struct MeshOutput {
  /// Output vertices with positions, normals, and tangents.
  pub vertices: Vec<Vertex>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.vertices.len() / 3
  }

  /// Iterate triangles as position triples.
  pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
    self.vertices.chunks_exact(3).map(|tri| {
      [
        Vec3::from_array(tri[0].position),
        Vec3::from_array(tri[1].position),
        Vec3::from_array(tri[2].position),
      ]
    })
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
