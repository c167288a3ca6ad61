//! Reusable mesh writers.
//!
//! Rebuilding a chunk mesh needs scratch space (output vertices, dual edges,
//! loop rings). Writers are handed out through [`MeshWriterPool::acquire`] and
//! go back to the pool when the guard is dropped, keeping their capacity.
//!
//! The pool is `Sync`, so one pool can serve every rayon worker during a
//! parallel rebuild. Each guard is a single exclusive borrow of one writer.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::dual_contouring::MeshWriter;

/// Free list of idle writers.
#[derive(Debug, Default)]
pub struct MeshWriterPool {
  idle: Mutex<Vec<MeshWriter>>,
}

impl MeshWriterPool {
  pub fn new() -> Self {
    Self::default()
  }

  /// Take an idle writer, or create one. The writer is always cleared.
  pub fn acquire(&self) -> PooledMeshWriter<'_> {
    let mut writer = self.lock().pop().unwrap_or_default();
    writer.clear();

    PooledMeshWriter { pool: self, writer }
  }

  /// Number of writers waiting to be reused.
  pub fn idle_count(&self) -> usize {
    self.lock().len()
  }

  fn release(&self, mut writer: MeshWriter) {
    writer.clear();
    self.lock().push(writer);
  }

  // Writers hold no invariants a panicking holder could break.
  fn lock(&self) -> MutexGuard<'_, Vec<MeshWriter>> {
    self.idle.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Exclusive borrow of a pooled writer. Returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledMeshWriter<'a> {
  pool: &'a MeshWriterPool,
  writer: MeshWriter,
}

impl Deref for PooledMeshWriter<'_> {
  type Target = MeshWriter;

  fn deref(&self) -> &MeshWriter {
    &self.writer
  }
}

impl DerefMut for PooledMeshWriter<'_> {
  fn deref_mut(&mut self) -> &mut MeshWriter {
    &mut self.writer
  }
}

impl Drop for PooledMeshWriter<'_> {
  fn drop(&mut self) {
    // An empty default writer does not allocate
    self.pool.release(std::mem::take(&mut self.writer));
  }
}
