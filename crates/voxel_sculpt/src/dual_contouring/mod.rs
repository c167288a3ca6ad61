//! Dual contouring surface extraction.
//!
//! Converts dense voxel grids into fully expanded triangle lists. Vertices sit
//! on the cube edges where the decoded signed distance crosses zero, so two
//! cells that share a face always agree on the vertices along it.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        INPUT                                    │
//! │  voxels: &[Voxel]    - (2^s + 1)³ quantized samples             │
//! │  offset, scale       - placement of the grid in output space    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 1: Corner Classification               │
//! │  For each 2×2×2 cell:                                           │
//! │    Load 8 corner voxels                                         │
//! │    Build 8-bit corner mask from the iso threshold               │
//! │    Early-out if homogeneous (mask == 0 or mask == 255)          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 2: Face Processing                     │
//! │  For each of the 6 faces:                                       │
//! │    Find crossings on its 4 edges (0, 2 or 4)                    │
//! │    Pair crossings into dual edges, shortest pairing on saddles  │
//! │    Orient each dual edge so the solid side is consistent        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 3: Loop Assembly                       │
//! │  Chain dual edges end-to-start into closed loops                │
//! │  Fan-triangulate each loop: n vertices → n - 2 triangles        │
//! │  Flat normal and tangent per triangle                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Triangles wind counter-clockwise seen from outside the solid, so face
//! normals point away from it.

pub mod corner_mask;
pub mod edge_loop;
pub mod face;

use glam::{UVec3, Vec3};

use crate::constants::{coord_to_index, corner_offsets};
use crate::error::{Result, VoxelError};
use crate::grid::VoxelGrid;
use crate::types::{MeshOutput, Vertex, Voxel};

use edge_loop::{LoopRing, OpenLoop};
use face::DualEdges;

/// Reusable dual contouring writer.
///
/// Output accumulates across calls until [`MeshWriter::clear`]. Writers are
/// meant to be recycled through a [`MeshWriterPool`](crate::pool::MeshWriterPool)
/// so their buffers keep their capacity between rebuilds.
#[derive(Debug)]
pub struct MeshWriter {
  output: MeshOutput,

  /// Added to every emitted position.
  pub offset: Vec3,

  /// Size of the unit grid cube in output space.
  pub scale: f32,

  edges: DualEdges,
  ring: LoopRing,
}

impl Default for MeshWriter {
  fn default() -> Self {
    Self {
      output: MeshOutput::new(),
      offset: Vec3::ZERO,
      scale: 1.0,
      edges: DualEdges::new(),
      ring: LoopRing::new(),
    }
  }
}

impl MeshWriter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop all output and reset placement. Capacity is kept.
  pub fn clear(&mut self) {
    self.output.clear();
    self.offset = Vec3::ZERO;
    self.scale = 1.0;
    self.edges.clear();
    self.ring.clear();
  }

  pub fn vertices(&self) -> &[Vertex] {
    &self.output.vertices
  }

  pub fn output(&self) -> &MeshOutput {
    &self.output
  }

  /// Move the accumulated output out, leaving the writer empty.
  pub fn take_output(&mut self) -> MeshOutput {
    std::mem::take(&mut self.output)
  }

  /// Write the triangles of one cell.
  ///
  /// `cell_size` is the cell's edge length in unit-grid space; the emitted
  /// position of a cell-local point `p` is `offset + (cell + p) * cell_size * scale`.
  ///
  /// Returns the number of triangles emitted.
  pub fn write_cell(&mut self, cell: UVec3, cell_size: f32, corners: &[Voxel; 8]) -> Result<usize> {
    let mask = corner_mask::build(corners);
    if corner_mask::is_homogeneous(mask) {
      return Ok(0);
    }

    self.edges.clear();
    face::collect_dual_edges(corners, &mut self.edges);

    let offset = self.offset;
    let scale = self.scale * cell_size;
    let base = cell.as_vec3();
    let mut triangles = 0;

    loop {
      let more = edge_loop::take_loop(&mut self.edges, &mut self.ring).map_err(|OpenLoop| {
        VoxelError::OpenEdgeLoop {
          cell,
          corner_mask: mask,
        }
      })?;
      if !more {
        break;
      }

      for local in edge_loop::fan_triangles(&self.ring) {
        let tri = local.map(|p| offset + (base + p) * scale);
        let (normal, tangent) = edge_loop::triangle_frame(&tri);

        for position in tri {
          self.output.bounds.encapsulate(position);
          self
            .output
            .vertices
            .push(Vertex::new(position, normal, tangent));
        }
        triangles += 1;
      }
    }

    Ok(triangles)
  }

  /// Write every cell whose minimum corner lies in `[min, max - 1)` of a
  /// dense grid, clamped to the grid.
  #[tracing::instrument(skip_all, name = "dual_contouring::write_region")]
  pub fn write_region(
    &mut self,
    voxels: &[Voxel],
    size: UVec3,
    min: UVec3,
    max: UVec3,
    cell_size: f32,
  ) -> Result<usize> {
    let expected = (size.x * size.y * size.z) as usize;
    if voxels.len() != expected {
      return Err(VoxelError::BufferSizeMismatch {
        expected,
        actual: voxels.len(),
      });
    }

    let max = max.min(size);
    if size.cmplt(UVec3::splat(2)).any() || min.cmpge(max).any() {
      return Ok(0);
    }

    let offsets = corner_offsets(size);
    let mut triangles = 0;

    for z in min.z..max.z - 1 {
      for y in min.y..max.y - 1 {
        for x in min.x..max.x - 1 {
          let base = coord_to_index(size, x, y, z);
          let corners: [Voxel; 8] = std::array::from_fn(|i| voxels[base + offsets[i]]);
          triangles += self.write_cell(UVec3::new(x, y, z), cell_size, &corners)?;
        }
      }
    }

    Ok(triangles)
  }

  /// Write a whole grid. Unallocated and cleared grids produce nothing.
  pub fn write_grid(&mut self, grid: &VoxelGrid) -> Result<usize> {
    if !grid.is_allocated() || grid.is_cleared() {
      return Ok(0);
    }

    let size = grid.size();
    self.write_region(grid.voxels(), size, UVec3::ZERO, size, grid.spacing())
  }
}
