//! One cubic chunk of a volume: its grid, placement and latest mesh.

use glam::{IVec3, Vec3};

use crate::error::Result;
use crate::grid::VoxelGrid;
use crate::pool::MeshWriterPool;
use crate::types::MeshOutput;

/// Chunk state: `Clean → (edit) → Dirty → (rebuild) → Clean`.
#[derive(Clone, Debug)]
pub struct VoxelChunk {
  index: IVec3,
  size: f32,
  local_position: Vec3,
  pub(crate) grid: VoxelGrid,
  dirty: bool,
  mesh: MeshOutput,
}

impl VoxelChunk {
  pub fn new(index: IVec3, size: f32, local_position: Vec3, grid: VoxelGrid) -> Self {
    Self {
      index,
      size,
      local_position,
      grid,
      dirty: false,
      mesh: MeshOutput::new(),
    }
  }

  /// Integer chunk coordinate within the volume.
  #[inline]
  pub fn index(&self) -> IVec3 {
    self.index
  }

  /// World size of the chunk along each axis.
  #[inline]
  pub fn size(&self) -> f32 {
    self.size
  }

  /// Position of the chunk's minimum corner in volume-local space.
  #[inline]
  pub fn local_position(&self) -> Vec3 {
    self.local_position
  }

  #[inline]
  pub fn grid(&self) -> &VoxelGrid {
    &self.grid
  }

  #[inline]
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  #[inline]
  pub fn mark_dirty(&mut self) {
    self.dirty = true;
  }

  /// Mesh from the last successful rebuild, in chunk-local units
  /// (`[0, size]³`).
  #[inline]
  pub fn mesh(&self) -> &MeshOutput {
    &self.mesh
  }

  /// Re-extract the mesh from the grid and mark the chunk clean.
  ///
  /// On failure the previous mesh is kept and the chunk stays dirty.
  /// Returns the new vertex count.
  pub fn rebuild_mesh(&mut self, pool: &MeshWriterPool) -> Result<usize> {
    let mut writer = pool.acquire();
    writer.scale = self.size;

    if let Err(err) = writer.write_grid(&self.grid) {
      tracing::error!(chunk = ?self.index, %err, "chunk mesh rebuild failed");
      return Err(err);
    }

    let output = writer.output();
    self.mesh.vertices.clear();
    self.mesh.vertices.extend_from_slice(&output.vertices);
    self.mesh.bounds = output.bounds;
    self.dirty = false;

    Ok(self.mesh.vertices.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::Affine3A;

  use crate::sdf::{SignedDistanceField, SphereSdf};

  fn chunk_with_sphere() -> VoxelChunk {
    let mut grid = VoxelGrid::new(3, 3).unwrap();
    let sphere = SphereSdf::new(Vec3::splat(0.5), 0.3, 0.1).unwrap();
    grid
      .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 1.0, 0)
      .unwrap();

    let mut chunk = VoxelChunk::new(IVec3::ZERO, 8.0, Vec3::ZERO, grid);
    chunk.mark_dirty();
    chunk
  }

  #[test]
  fn test_new_chunk_is_clean_and_empty() {
    let chunk = VoxelChunk::new(
      IVec3::new(1, 2, 3),
      4.0,
      Vec3::new(4.0, 8.0, 12.0),
      VoxelGrid::new(1, 2).unwrap(),
    );

    assert!(!chunk.is_dirty());
    assert!(chunk.mesh().is_empty());
    assert_eq!(chunk.index(), IVec3::new(1, 2, 3));
    assert_eq!(chunk.local_position(), Vec3::new(4.0, 8.0, 12.0));
  }

  #[test]
  fn test_rebuild_clears_dirty_and_scales_mesh() {
    let pool = MeshWriterPool::new();
    let mut chunk = chunk_with_sphere();

    let vertices = chunk.rebuild_mesh(&pool).unwrap();

    assert!(!chunk.is_dirty());
    assert!(vertices > 0);
    assert_eq!(chunk.mesh().vertices.len(), vertices);

    // Sphere of radius 0.3 in unit space, chunk size 8
    let bounds = chunk.mesh().bounds;
    assert!(bounds.min.cmpgt(Vec3::splat(1.0)).all());
    assert!(bounds.max.cmplt(Vec3::splat(7.0)).all());
    assert!(bounds.size().x > 4.0);

    assert_eq!(pool.idle_count(), 1, "Writer returns to the pool");
  }

  #[test]
  fn test_rebuild_after_clear_empties_mesh() {
    let pool = MeshWriterPool::new();
    let mut chunk = chunk_with_sphere();
    chunk.rebuild_mesh(&pool).unwrap();

    assert!(chunk.grid.clear());
    chunk.mark_dirty();
    assert_eq!(chunk.rebuild_mesh(&pool), Ok(0));
    assert!(chunk.mesh().is_empty());
  }
}
