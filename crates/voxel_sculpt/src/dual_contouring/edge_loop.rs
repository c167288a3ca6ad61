//! Chaining dual edges into closed loops and fanning them into triangles.

use glam::Vec3;
use smallvec::SmallVec;

use super::face::DualEdges;

/// Loop vertices in cell-local coordinates. A cell never has more than 12
/// crossings.
pub type LoopRing = SmallVec<[Vec3; 12]>;

/// A dual edge had no successor, so its loop could not close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenLoop;

/// Remove one closed loop from `edges` and write its vertices to `ring`.
///
/// Returns `Ok(false)` once `edges` is empty.
pub fn take_loop(edges: &mut DualEdges, ring: &mut LoopRing) -> Result<bool, OpenLoop> {
  ring.clear();

  let Some(first) = edges.pop() else {
    return Ok(false);
  };

  ring.push(first.start.pos);
  let mut tail = first.end;

  while tail != first.start {
    ring.push(tail.pos);
    let next = edges.iter().position(|e| e.start == tail).ok_or(OpenLoop)?;
    tail = edges.swap_remove(next).end;
  }

  Ok(true)
}

/// Fan-triangulate a ring from its first vertex, `n - 2` triangles.
#[inline]
pub fn fan_triangles(ring: &[Vec3]) -> impl Iterator<Item = [Vec3; 3]> + '_ {
  let apex = ring.first().copied().unwrap_or(Vec3::ZERO);
  ring
    .windows(2)
    .skip(1)
    .map(move |pair| [apex, pair[0], pair[1]])
}

/// Flat triangle normal and tangent.
///
/// Degenerate triangles (coincident crossings on saturated edges) get zero
/// vectors rather than NaN.
#[inline]
pub fn triangle_frame(tri: &[Vec3; 3]) -> (Vec3, Vec3) {
  let ab = tri[1] - tri[0];
  let ac = tri[2] - tri[0];
  (ab.cross(ac).normalize_or_zero(), ab.normalize_or_zero())
}

#[cfg(test)]
#[path = "edge_loop_test.rs"]
mod edge_loop_test;
