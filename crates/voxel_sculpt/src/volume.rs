//! VoxelVolume - a sparse set of chunks addressed by integer coordinates.
//!
//! # Coordinate Spaces
//!
//! ```text
//! world ──(transform⁻¹)──► volume-local ──(- offset, / chunk_size)──► chunk-grid
//!                                                                        │
//!                                              (- chunk index) ◄─────────┘
//!                                                     │
//!                                                     ▼
//!                                          grid unit cube [0, 1]³
//! ```
//!
//! Chunk `i` covers chunk-grid space `[i, i + 1]³`. Neighbouring chunks share
//! their boundary sample planes, and both evaluate those samples at the same
//! positions, so seams line up without stitching.
//!
//! A bounded volume is centred on its origin and never creates chunks outside
//! its extent. An unbounded volume starts at the origin and grows lazily in
//! every direction.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use glam::{Affine3A, IVec3, Vec3};
use rayon::prelude::*;
use web_time::Instant;

use crate::chunk::VoxelChunk;
use crate::config::VolumeConfig;
use crate::error::{check_positive, Result, VoxelError};
use crate::grid::VoxelGrid;
use crate::pool::MeshWriterPool;
use crate::sdf::SignedDistanceField;
use crate::types::{MaterialId, MinMaxAABB};

/// Summary of one rebuild pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
  /// Chunks whose mesh was rebuilt.
  pub chunks: usize,
  /// Total vertices across the rebuilt meshes.
  pub vertices: usize,
  /// Wall time of the pass in microseconds.
  pub elapsed_us: u64,
}

/// Where an edit lands: the chunk range plus the shared transforms.
struct EditRoute {
  /// Edit bounds in chunk-grid space, margin included.
  bounds: MinMaxAABB,
  /// Chunk-grid space to SDF space.
  grid_to_sdf: Affine3A,
  /// Inclusive chunk index range.
  min: IVec3,
  max: IVec3,
}

impl EditRoute {
  fn indices(&self) -> impl Iterator<Item = IVec3> {
    let (min, max) = (self.min, self.max);
    (min.z..=max.z).flat_map(move |z| {
      (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
    })
  }

  /// Bounds and transform for one chunk's unit-cube grid.
  #[inline]
  fn for_chunk(&self, index: IVec3) -> (MinMaxAABB, Affine3A) {
    let shift = index.as_vec3();
    (
      self.bounds.translated(-shift),
      self.grid_to_sdf * Affine3A::from_translation(shift),
    )
  }
}

/// Chunked, editable voxel volume.
#[derive(Debug)]
pub struct VoxelVolume {
  config: VolumeConfig,
  /// Volume-local to world.
  transform: Affine3A,
  chunk_offset: Vec3,
  chunk_count: Option<IVec3>,
  chunks: HashMap<IVec3, VoxelChunk>,
  writers: MeshWriterPool,
}

impl VoxelVolume {
  pub fn new(config: VolumeConfig) -> Result<Self> {
    config.validate()?;

    Ok(Self {
      chunk_offset: config.chunk_offset(),
      chunk_count: config.chunk_count(),
      config,
      transform: Affine3A::IDENTITY,
      chunks: HashMap::new(),
      writers: MeshWriterPool::new(),
    })
  }

  #[inline]
  pub fn config(&self) -> &VolumeConfig {
    &self.config
  }

  #[inline]
  pub fn transform(&self) -> Affine3A {
    self.transform
  }

  /// Place the volume in the world. Existing voxels move with it.
  pub fn set_transform(&mut self, transform: Affine3A) {
    self.transform = transform;
  }

  /// Number of allocated chunks.
  #[inline]
  pub fn len(&self) -> usize {
    self.chunks.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  pub fn chunk(&self, index: IVec3) -> Option<&VoxelChunk> {
    self.chunks.get(&index)
  }

  pub fn chunks(&self) -> impl Iterator<Item = &VoxelChunk> {
    self.chunks.values()
  }

  /// Chunks edited since their last mesh rebuild.
  pub fn dirty_chunks(&self) -> impl Iterator<Item = &VoxelChunk> {
    self.chunks.values().filter(|chunk| chunk.is_dirty())
  }

  /// Volume-local minimum corner of chunk `index`.
  #[inline]
  pub fn chunk_local_origin(&self, index: IVec3) -> Vec3 {
    self.chunk_offset + index.as_vec3() * self.config.chunk_size
  }

  /// World position of chunk `index`'s minimum corner.
  #[inline]
  pub fn chunk_world_origin(&self, index: IVec3) -> Vec3 {
    self
      .transform
      .transform_point3(self.chunk_local_origin(index))
  }

  /// Union `sdf` into the volume at the default detail size.
  ///
  /// `transform` maps SDF space to world space. Returns the number of chunks
  /// marked dirty.
  pub fn add<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    transform: &Affine3A,
    material: MaterialId,
  ) -> Result<usize> {
    self.add_with_detail(sdf, transform, self.config.default_detail_size, material)
  }

  /// Carve `sdf` out of the volume at the default detail size.
  pub fn subtract<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    transform: &Affine3A,
    material: MaterialId,
  ) -> Result<usize> {
    self.subtract_with_detail(sdf, transform, self.config.default_detail_size, material)
  }

  /// Union `sdf` into the volume, creating chunks as needed.
  ///
  /// `detail_size` is the requested sample spacing in world units.
  #[tracing::instrument(skip_all, name = "volume::add")]
  pub fn add_with_detail<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    transform: &Affine3A,
    detail_size: f32,
    material: MaterialId,
  ) -> Result<usize> {
    check_positive(detail_size, VoxelError::InvalidDetailSize)?;
    let Some(route) = self.route(sdf.bounds(), transform) else {
      return Ok(0);
    };

    let chunk_detail = detail_size / self.config.chunk_size;
    let mut dirtied = 0;

    for index in route.indices() {
      let chunk = self.get_or_create_chunk(index)?;
      let (bounds, grid_transform) = route.for_chunk(index);

      if chunk
        .grid
        .add(sdf, &bounds, &grid_transform, chunk_detail, material)?
      {
        chunk.mark_dirty();
        dirtied += 1;
      }
    }

    Ok(dirtied)
  }

  /// Carve `sdf` out of the volume. Chunks that do not exist are skipped.
  #[tracing::instrument(skip_all, name = "volume::subtract")]
  pub fn subtract_with_detail<T: SignedDistanceField + ?Sized>(
    &mut self,
    sdf: &T,
    transform: &Affine3A,
    detail_size: f32,
    material: MaterialId,
  ) -> Result<usize> {
    check_positive(detail_size, VoxelError::InvalidDetailSize)?;
    let Some(route) = self.route(sdf.bounds(), transform) else {
      return Ok(0);
    };

    let chunk_detail = detail_size / self.config.chunk_size;
    let mut dirtied = 0;

    for index in route.indices() {
      let Some(chunk) = self.chunks.get_mut(&index) else {
        continue;
      };
      let (bounds, grid_transform) = route.for_chunk(index);

      if chunk
        .grid
        .subtract(sdf, &bounds, &grid_transform, chunk_detail, material)?
      {
        chunk.mark_dirty();
        dirtied += 1;
      }
    }

    Ok(dirtied)
  }

  /// Empty every chunk, keeping storage. Returns the number of chunks marked
  /// dirty.
  pub fn clear(&mut self) -> usize {
    let mut dirtied = 0;
    for chunk in self.chunks.values_mut() {
      if chunk.grid.clear() {
        chunk.mark_dirty();
        dirtied += 1;
      }
    }
    dirtied
  }

  /// Rebuild every dirty chunk mesh on the calling thread.
  ///
  /// Stops at the first failure; chunks not yet rebuilt stay dirty.
  #[tracing::instrument(skip_all, name = "volume::rebuild_dirty_meshes")]
  pub fn rebuild_dirty_meshes(&mut self) -> Result<RebuildStats> {
    let start = Instant::now();
    let mut stats = RebuildStats::default();

    for chunk in self.chunks.values_mut().filter(|chunk| chunk.is_dirty()) {
      stats.vertices += chunk.rebuild_mesh(&self.writers)?;
      stats.chunks += 1;
    }

    stats.elapsed_us = start.elapsed().as_micros() as u64;
    log_rebuild(&stats);
    Ok(stats)
  }

  /// Rebuild every dirty chunk mesh across the rayon pool.
  ///
  /// Chunks are independent, so each task only touches its own chunk and
  /// borrows its own writer from the shared pool.
  #[tracing::instrument(skip_all, name = "volume::rebuild_dirty_meshes_parallel")]
  pub fn rebuild_dirty_meshes_parallel(&mut self) -> Result<RebuildStats> {
    let start = Instant::now();
    let writers = &self.writers;

    let vertex_counts: Vec<usize> = self
      .chunks
      .par_iter_mut()
      .filter(|(_, chunk)| chunk.is_dirty())
      .map(|(_, chunk)| chunk.rebuild_mesh(writers))
      .collect::<Result<_>>()?;

    let stats = RebuildStats {
      chunks: vertex_counts.len(),
      vertices: vertex_counts.iter().sum(),
      elapsed_us: start.elapsed().as_micros() as u64,
    };
    log_rebuild(&stats);
    Ok(stats)
  }

  fn get_or_create_chunk(&mut self, index: IVec3) -> Result<&mut VoxelChunk> {
    match self.chunks.entry(index) {
      Entry::Occupied(entry) => Ok(entry.into_mut()),
      Entry::Vacant(entry) => {
        let grid = VoxelGrid::new(self.config.min_subdivisions, self.config.max_subdivisions)?;
        let local_position = self.chunk_offset + index.as_vec3() * self.config.chunk_size;
        tracing::trace!(?index, "creating chunk");

        Ok(entry.insert(VoxelChunk::new(
          index,
          self.config.chunk_size,
          local_position,
          grid,
        )))
      }
    }
  }

  /// Map SDF bounds into chunk-grid space and find the chunks they touch.
  fn route(&self, sdf_bounds: MinMaxAABB, sdf_to_world: &Affine3A) -> Option<EditRoute> {
    let chunk_size = self.config.chunk_size;

    let sdf_to_local = self.transform.inverse() * *sdf_to_world;
    let grid_to_local = Affine3A::from_translation(self.chunk_offset)
      * Affine3A::from_scale(Vec3::splat(chunk_size));
    let grid_to_sdf = sdf_to_local.inverse() * grid_to_local;

    let bounds = sdf_bounds
      .transformed(&sdf_to_local)
      .translated(-self.chunk_offset)
      .scaled(Vec3::splat(1.0 / chunk_size))
      .expanded(self.config.chunk_margin());

    if !bounds.is_valid() || !bounds.min.is_finite() || !bounds.max.is_finite() {
      return None;
    }

    // Chunk i spans [i, i + 1], so touching a boundary selects both sides
    let mut min = (bounds.min.ceil() - Vec3::ONE).as_ivec3();
    let mut max = bounds.max.floor().as_ivec3();

    if let Some(count) = self.chunk_count {
      min = min.max(IVec3::ZERO);
      max = max.min(count - IVec3::ONE);
    }

    if min.cmpgt(max).any() {
      return None;
    }

    Some(EditRoute {
      bounds,
      grid_to_sdf,
      min,
      max,
    })
  }
}

fn log_rebuild(stats: &RebuildStats) {
  if stats.chunks > 0 {
    tracing::debug!(
      chunks = stats.chunks,
      vertices = stats.vertices,
      elapsed_us = stats.elapsed_us,
      "rebuilt dirty chunk meshes"
    );
  }
}

#[cfg(test)]
#[path = "volume_test.rs"]
mod volume_test;
