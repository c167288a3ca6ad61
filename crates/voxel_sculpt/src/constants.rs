//! Grid layout constants for dense voxel chunks.
//!
//! # Grid Layout
//!
//! A chunk grid is the unit cube `[0, 1]³` sampled at `2^s + 1` points per
//! axis, where `s` is the current subdivision level. The extra sample is the
//! shared boundary: the last sample of chunk `i` sits at the same world
//! position as the first sample of chunk `i + 1`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SUBDIVISION 2 (5 samples/axis)                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sample index:  0      1      2      3      4                           │
//! │  Position:     0.0    0.25   0.5    0.75   1.0                          │
//! │                 │                           │                           │
//! │                 └── shared with chunk i-1   └── shared with chunk i+1   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Memory Layout
//!
//! ```text
//! index = x + y * size_x + z * size_x * size_y
//! ```
//!
//! X is the minor axis (stride 1), Z is the major axis.
//!
//! # Coordinate System
//!
//! ```text
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

use glam::UVec3;

/// Highest subdivision level a grid can reach (32 cells, 33 samples per axis).
pub const MAX_SUBDIVISIONS: u32 = 5;

/// Raw values at or above this are inside the surface.
pub const ISO_THRESHOLD: u8 = 128;

/// Raw value of a fully solid voxel.
pub const FULLY_SOLID: u8 = u8::MAX;

/// Raw value of a fully empty voxel.
pub const FULLY_EMPTY: u8 = 0;

/// Chunk border margin in voxels for flat-shaded volumes.
pub const FLAT_MARGIN: u32 = 1;

/// Chunk border margin in voxels for smooth-shaded volumes.
pub const SMOOTH_MARGIN: u32 = 2;

/// Samples per axis at the given subdivision level.
#[inline(always)]
pub const fn samples_per_axis(subdivisions: u32) -> u32 {
  (1 << subdivisions) + 1
}

/// Linear stride for each axis of a grid with the given size.
#[inline(always)]
pub const fn strides(size: UVec3) -> [usize; 3] {
  [1, size.x as usize, size.x as usize * size.y as usize]
}

/// Convert 3D sample coordinates to a linear index.
#[inline(always)]
pub const fn coord_to_index(size: UVec3, x: u32, y: u32, z: u32) -> usize {
  x as usize + size.x as usize * (y as usize + size.y as usize * z as usize)
}

/// Convert a linear index back to 3D sample coordinates.
#[inline(always)]
pub const fn index_to_coord(size: UVec3, idx: usize) -> UVec3 {
  let sx = size.x as usize;
  let sy = size.y as usize;
  UVec3::new((idx % sx) as u32, ((idx / sx) % sy) as u32, (idx / (sx * sy)) as u32)
}

/// Linear index offsets for the 8 cube corners relative to the cell origin.
///
/// Corner `i` sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
#[inline]
pub const fn corner_offsets(size: UVec3) -> [usize; 8] {
  let [sx, sy, sz] = strides(size);
  [
    0,            // (0,0,0)
    sx,           // (1,0,0)
    sy,           // (0,1,0)
    sx + sy,      // (1,1,0)
    sz,           // (0,0,1)
    sx + sz,      // (1,0,1)
    sy + sz,      // (0,1,1)
    sx + sy + sz, // (1,1,1)
  ]
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
