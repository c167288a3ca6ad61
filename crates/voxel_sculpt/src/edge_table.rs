//! Precomputed cube topology tables for dual contouring.
//!
//! # Corners and Edges
//!
//! ```text
//!       6──────7        corner c sits at (c & 1, (c >> 1) & 1, (c >> 2) & 1)
//!      /│     /│
//!     4─┼────5 │        edges along X:  0 [0,1]   5 [2,3]   8 [4,5]  11 [6,7]
//!     │ 2────┼─3        edges along Y:  1 [0,2]   3 [1,3]   9 [4,6]  10 [5,7]
//!     │/     │/         edges along Z:  2 [0,4]   4 [1,5]   6 [2,6]   7 [3,7]
//!     0──────1
//! ```
//!
//! Every edge lists its lower corner first.
//!
//! # Face Cycles
//!
//! Each face lists its four corners as a closed cycle. Every cube edge is
//! walked in opposite directions by the two faces that share it, so a crossing
//! that leaves the solid region on one face enters it on the other. That is
//! what lets per-face dual edges chain into closed loops.
//!
//! ```text
//! Face   Cycle
//! ────   ───────────
//! XMin   0 → 2 → 6 → 4
//! XMax   5 → 7 → 3 → 1
//! YMin   0 → 4 → 5 → 1
//! YMax   3 → 7 → 6 → 2
//! ZMin   1 → 3 → 2 → 0
//! ZMax   4 → 6 → 7 → 5
//! ```

/// `[lower, upper]` corners of each cube edge.
pub const EDGE_CORNERS: [[u8; 2]; 12] = [
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

/// The six faces of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
  XMin,
  XMax,
  YMin,
  YMax,
  ZMin,
  ZMax,
}

impl CubeFace {
  pub const ALL: [CubeFace; 6] = [
    CubeFace::XMin,
    CubeFace::XMax,
    CubeFace::YMin,
    CubeFace::YMax,
    CubeFace::ZMin,
    CubeFace::ZMax,
  ];

  /// Corners of this face in cycle order.
  #[inline(always)]
  pub const fn cycle(self) -> [u8; 4] {
    FACE_CYCLES[self as usize]
  }
}

/// Face corner cycles, indexed by [`CubeFace`].
pub const FACE_CYCLES: [[u8; 4]; 6] = [
  [0, 2, 6, 4], // XMin
  [5, 7, 3, 1], // XMax
  [0, 4, 5, 1], // YMin
  [3, 7, 6, 2], // YMax
  [1, 3, 2, 0], // ZMin
  [4, 6, 7, 5], // ZMax
];

/// Edge index for an unordered corner pair, `0xFF` if the corners are not
/// adjacent.
pub const CORNER_PAIR_EDGE: [[u8; 8]; 8] = generate_corner_pair_edges();

const fn generate_corner_pair_edges() -> [[u8; 8]; 8] {
  let mut table = [[0xFFu8; 8]; 8];
  let mut edge = 0;

  while edge < 12 {
    let c0 = EDGE_CORNERS[edge][0] as usize;
    let c1 = EDGE_CORNERS[edge][1] as usize;
    table[c0][c1] = edge as u8;
    table[c1][c0] = edge as u8;
    edge += 1;
  }

  table
}

/// Crossing edges per corner mask: bit `e` is set when the two corners of
/// edge `e` fall on opposite sides of the surface.
pub const EDGE_TABLE: [u16; 256] = generate_edge_table();

const fn generate_edge_table() -> [u16; 256] {
  let mut table = [0u16; 256];
  let mut mask = 0usize;

  while mask < 256 {
    let mut edge = 0;
    while edge < 12 {
      let [lo, hi] = EDGE_CORNERS[edge];
      if ((mask >> lo as usize) ^ (mask >> hi as usize)) & 1 == 1 {
        table[mask] |= 1 << edge;
      }
      edge += 1;
    }
    mask += 1;
  }

  table
}

/// Cell-local position of a corner.
#[inline(always)]
pub const fn corner_position(corner: u8) -> [f32; 3] {
  [
    (corner & 1) as f32,
    ((corner >> 1) & 1) as f32,
    ((corner >> 2) & 1) as f32,
  ]
}

#[cfg(test)]
#[path = "edge_table_test.rs"]
mod edge_table_test;
