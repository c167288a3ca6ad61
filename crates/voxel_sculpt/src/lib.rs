//! voxel_sculpt - Engine independent sculptable voxel volumes
//!
//! A volume is a sparse set of cubic chunks. Each chunk stores a dense grid of
//! 8-bit signed distance samples with a material id, refined on demand when an
//! edit asks for finer detail. Edits stamp signed distance field brushes into
//! every chunk they touch; dirty chunks are then re-meshed with a dual
//! contouring extractor that emits flat triangle lists.
//!
//! # Features
//!
//! - **Additive / subtractive edits**: Sphere and box brushes, or any type
//!   implementing [`SignedDistanceField`], placed with an affine transform
//! - **Adaptive resolution**: Chunk grids start coarse and upgrade up to
//!   33³ samples, carrying existing contents across
//! - **Seamless chunks**: Neighbouring chunks share their boundary samples, so
//!   meshes close without stitching
//! - **Parallel rebuilds**: Dirty chunks re-mesh across the rayon pool with
//!   pooled scratch writers
//!
//! # Example
//!
//! ```
//! use glam::{Affine3A, Vec3};
//! use voxel_sculpt::{SphereSdf, VolumeConfig, VoxelVolume};
//!
//! let mut volume = VoxelVolume::new(VolumeConfig::default())?;
//! let brush = SphereSdf::new(Vec3::ZERO, 8.0, 2.0)?;
//!
//! volume.add(&brush, &Affine3A::from_translation(Vec3::splat(16.0)), 1)?;
//! let stats = volume.rebuild_dirty_meshes()?;
//!
//! println!("Rebuilt {} chunks, {} vertices", stats.chunks, stats.vertices);
//! # Ok::<(), voxel_sculpt::VoxelError>(())
//! ```

pub mod constants;
pub mod edge_table;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::{coord_to_index, index_to_coord, samples_per_axis, MAX_SUBDIVISIONS};
pub use edge_table::{CubeFace, EDGE_CORNERS, EDGE_TABLE};
pub use error::{Result, VoxelError};
pub use types::{voxel_value, MaterialId, MeshOutput, MinMaxAABB, Vertex, Voxel};

// Edit brushes
pub mod sdf;
pub use sdf::{BoxSdf, SignedDistanceField, SphereSdf, VoxelArraySdf};

// Dense per-chunk storage
pub mod grid;
pub use grid::VoxelGrid;

// Surface extraction
pub mod dual_contouring;
pub use dual_contouring::MeshWriter;

// Scratch writers shared across rebuild tasks
pub mod pool;
pub use pool::{MeshWriterPool, PooledMeshWriter};

// Chunked volumes
pub mod chunk;
pub mod config;
pub mod volume;
pub use chunk::VoxelChunk;
pub use config::{NormalStyle, VolumeConfig};
pub use volume::{RebuildStats, VoxelVolume};
