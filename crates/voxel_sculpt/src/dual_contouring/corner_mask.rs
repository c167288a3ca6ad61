//! Corner mask computation.
//!
//! The corner mask is an 8-bit value where each bit indicates whether a corner
//! of the 2x2x2 cell is inside the surface (raw value at or above the iso
//! threshold).

use crate::types::Voxel;

/// Build corner mask from 8 voxel samples.
///
/// Each bit in the result corresponds to one corner:
/// - Bit 0: corner (0,0,0)
/// - Bit 1: corner (1,0,0)
/// - Bit 2: corner (0,1,0)
/// - Bit 3: corner (1,1,0)
/// - Bit 4: corner (0,0,1)
/// - Bit 5: corner (1,0,1)
/// - Bit 6: corner (0,1,1)
/// - Bit 7: corner (1,1,1)
#[inline]
pub fn build(corners: &[Voxel; 8]) -> u8 {
  corners
    .iter()
    .enumerate()
    .fold(0u8, |mask, (i, voxel)| mask | ((voxel.is_inside() as u8) << i))
}

/// All corners on the same side of the surface.
#[inline(always)]
pub const fn is_homogeneous(mask: u8) -> bool {
  mask == 0x00 || mask == 0xFF
}

#[cfg(test)]
#[path = "corner_mask_test.rs"]
mod corner_mask_test;
