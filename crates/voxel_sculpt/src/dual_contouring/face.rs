//! Edge crossings and per-face dual edges.
//!
//! A face with crossings on 2 of its 4 edges yields one dual edge. With 4
//! crossings (checkerboard corners) the crossings can be paired two ways; the
//! pairing with the smaller total length wins. Both cells sharing the face see
//! the same crossing positions, so they make the same choice.
//!
//! Dual edges always run from the crossing where the face cycle leaves the
//! solid region to the crossing where it re-enters it.

use glam::Vec3;
use smallvec::SmallVec;

use crate::edge_table::{corner_position, CubeFace, CORNER_PAIR_EDGE, EDGE_CORNERS};
use crate::types::Voxel;

/// Surface crossing on one cube edge, in cell-local coordinates `[0, 1]³`.
///
/// Identity is the cube edge; two crossings on the same edge are equal.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
  /// Cube edge index (see [`EDGE_CORNERS`]).
  pub edge: u8,
  /// Corner the face cycle arrives at after this crossing.
  pub to: u8,
  pub pos: Vec3,
}

impl PartialEq for Intersection {
  fn eq(&self, other: &Self) -> bool {
    self.edge == other.edge
  }
}

impl Eq for Intersection {}

/// Directed connection between two crossings on one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DualEdge {
  pub start: Intersection,
  pub end: Intersection,
}

/// At most two dual edges per face, six faces.
pub type DualEdges = SmallVec<[DualEdge; 12]>;

type FaceIntersections = SmallVec<[Intersection; 4]>;

/// Crossing on the edge from corner `from` to corner `to`, if their signs
/// differ.
///
/// The parameter is always measured from the edge's lower corner using the
/// decoded values, so every cell sharing the edge computes bit-identical
/// positions.
#[inline]
pub fn intersect(corners: &[Voxel; 8], from: u8, to: u8) -> Option<Intersection> {
  let a = corners[from as usize];
  let b = corners[to as usize];
  if a.is_inside() == b.is_inside() {
    return None;
  }

  let edge = CORNER_PAIR_EDGE[from as usize][to as usize];
  let [lo, hi] = EDGE_CORNERS[edge as usize];
  let v0 = corners[lo as usize].value();
  let v1 = corners[hi as usize].value();
  let t = v0 / (v0 - v1);

  let p0 = Vec3::from_array(corner_position(lo));
  let p1 = Vec3::from_array(corner_position(hi));

  Some(Intersection {
    edge,
    to,
    pos: p0 + (p1 - p0) * t,
  })
}

/// Append the dual edges of one face to `out`.
pub fn process_face(corners: &[Voxel; 8], face: CubeFace, out: &mut DualEdges) {
  let cycle = face.cycle();

  let mut hits = FaceIntersections::new();
  for i in 0..4 {
    if let Some(hit) = intersect(corners, cycle[i], cycle[(i + 1) % 4]) {
      hits.push(hit);
    }
  }

  if hits.is_empty() {
    return;
  }

  let count = hits.len();
  let read_offset = if count == 4 {
    ambiguous_pairing_offset(corners, cycle, &hits)
  } else {
    0
  };

  for i in (0..count).step_by(2) {
    let i0 = hits[(read_offset + i) % count];
    let i1 = hits[(read_offset + i + 1) % count];

    // i0 enters the solid region: the edge runs the other way
    if corners[i0.to as usize].is_inside() {
      out.push(DualEdge { start: i1, end: i0 });
    } else {
      out.push(DualEdge { start: i0, end: i1 });
    }
  }
}

/// Pick between pairing `(0,1)(2,3)` and `(1,2)(3,0)` by total length.
///
/// Offset 0 cuts off corners `cycle[1]` and `cycle[3]`, offset 1 cuts off
/// `cycle[0]` and `cycle[2]`. Exact ties cut off the solid corners, which both
/// cells sharing the face agree on regardless of their cycle direction.
#[inline]
fn ambiguous_pairing_offset(corners: &[Voxel; 8], cycle: [u8; 4], hits: &FaceIntersections) -> usize {
  let length0 = hits[0].pos.distance(hits[1].pos) + hits[2].pos.distance(hits[3].pos);
  let length1 = hits[1].pos.distance(hits[2].pos) + hits[3].pos.distance(hits[0].pos);

  if length1 < length0 {
    1
  } else if length0 < length1 {
    0
  } else if corners[cycle[0] as usize].is_inside() {
    1
  } else {
    0
  }
}

/// Collect the dual edges of all six faces.
pub fn collect_dual_edges(corners: &[Voxel; 8], out: &mut DualEdges) {
  for face in CubeFace::ALL {
    process_face(corners, face, out);
  }
}

#[cfg(test)]
#[path = "face_test.rs"]
mod face_test;
