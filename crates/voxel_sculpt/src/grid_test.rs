use super::*;
use crate::sdf::{BoxSdf, SphereSdf};
use crate::types::voxel_value;

fn solid_box() -> BoxSdf {
  // Covers the unit cube with more than one falloff to spare
  BoxSdf::new(Vec3::splat(-1.0), Vec3::splat(2.0), 0.1).unwrap()
}

fn center_sphere() -> SphereSdf {
  SphereSdf::new(Vec3::splat(0.5), 0.25, 0.25).unwrap()
}

fn ramp_voxels(size: u32) -> Vec<Voxel> {
  let mut voxels = Vec::with_capacity((size * size * size) as usize);
  for z in 0..size {
    for y in 0..size {
      for x in 0..size {
        voxels.push(Voxel::from_raw(
          (x * 100 + y * 20 + z * 7) as u8,
          (x + 3 * y + 9 * z) as u8,
        ));
      }
    }
  }
  voxels
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_new_validates_subdivisions() {
  assert!(VoxelGrid::new(0, 0).is_ok());
  assert!(VoxelGrid::new(2, MAX_SUBDIVISIONS).is_ok());
  assert_eq!(
    VoxelGrid::new(3, 2).unwrap_err(),
    VoxelError::InvalidSubdivisions {
      min: 3,
      max: 2,
      limit: MAX_SUBDIVISIONS
    }
  );
  assert!(VoxelGrid::new(0, MAX_SUBDIVISIONS + 1).is_err());
}

#[test]
fn test_new_grid_is_unallocated() {
  let grid = VoxelGrid::new(1, 4).unwrap();

  assert!(!grid.is_allocated());
  assert!(grid.is_cleared());
  assert_eq!(grid.size(), UVec3::ZERO);
  assert!(grid.voxels().is_empty());
  assert_eq!(grid.get(0, 0, 0), None);
}

#[test]
fn test_from_raw_rejects_bad_input() {
  assert_eq!(
    VoxelGrid::from_raw(1, 3, 2, vec![Voxel::EMPTY; 10]).unwrap_err(),
    VoxelError::BufferSizeMismatch {
      expected: 125,
      actual: 10
    }
  );
  assert_eq!(
    VoxelGrid::from_raw(1, 3, 4, vec![Voxel::EMPTY; 17 * 17 * 17]).unwrap_err(),
    VoxelError::SubdivisionOutOfRange {
      subdivisions: 4,
      min: 1,
      max: 3
    }
  );
}

#[test]
fn test_from_raw_roundtrips_buffer() {
  let voxels = ramp_voxels(3);
  let grid = VoxelGrid::from_raw(1, 3, 1, voxels.clone()).unwrap();

  assert_eq!(grid.size(), UVec3::splat(3));
  assert_eq!(grid.voxels(), voxels.as_slice());
  assert!(!grid.is_cleared());
  assert_eq!(grid.get(2, 1, 0), Some(Voxel::from_raw(220, 5)));

  let empty = VoxelGrid::from_raw(1, 3, 1, vec![Voxel::EMPTY; 27]).unwrap();
  assert!(empty.is_cleared());
}

// =============================================================================
// Resolution selection
// =============================================================================

#[test]
fn test_first_add_allocates_at_min_for_coarse_detail() {
  let mut grid = VoxelGrid::new(2, 5).unwrap();
  let sphere = center_sphere();

  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();

  assert!(grid.is_allocated());
  assert_eq!(grid.subdivisions(), 2);
  assert_eq!(grid.size(), UVec3::splat(5));
  assert_eq!(grid.voxels().len(), 125);
}

#[test]
fn test_first_add_picks_smallest_sufficient_subdivision() {
  let mut grid = VoxelGrid::new(2, 5).unwrap();
  let sphere = center_sphere();

  // 1 / 0.1 = 10 → 2^4 = 16 is the first level at or above it
  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.1, 0)
    .unwrap();

  assert_eq!(grid.subdivisions(), 4);
  assert_eq!(grid.spacing(), 1.0 / 16.0);
}

#[test]
fn test_detail_is_capped_at_max_subdivisions() {
  let mut grid = VoxelGrid::new(1, 3).unwrap();
  let sphere = center_sphere();

  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.001, 0)
    .unwrap();
  assert_eq!(grid.subdivisions(), 3);

  // Already at the cap: asking again does not reallocate
  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.001, 0)
    .unwrap();
  assert_eq!(grid.subdivisions(), 3);
}

#[test]
fn test_coarser_detail_never_downgrades() {
  let mut grid = VoxelGrid::new(1, 4).unwrap();
  let sphere = center_sphere();

  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.1, 0)
    .unwrap();
  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();

  assert_eq!(grid.subdivisions(), 4);
}

#[test]
fn test_rejects_bad_detail_size() {
  let mut grid = VoxelGrid::new(1, 4).unwrap();
  let sphere = center_sphere();

  let err = grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.0, 0)
    .unwrap_err();
  assert_eq!(err, VoxelError::InvalidDetailSize(0.0));
  assert!(grid
    .subtract(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, -1.0, 0)
    .is_err());
  assert!(!grid.is_allocated());
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_add_sphere_fills_center() {
  let mut grid = VoxelGrid::new(2, 2).unwrap();
  let sphere = center_sphere();

  let changed = grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 1.0, 7)
    .unwrap();

  assert!(changed);
  assert!(!grid.is_cleared());

  let center = grid.get(2, 2, 2).unwrap();
  assert_eq!(center, Voxel::from_raw(255, 7));
  assert!(!grid.get(0, 0, 0).unwrap().is_inside());
}

#[test]
fn test_add_outside_unit_cube_changes_nothing() {
  let mut grid = VoxelGrid::new(2, 2).unwrap();
  let far = SphereSdf::new(Vec3::splat(5.0), 0.5, 0.25).unwrap();

  let changed = grid
    .add(&far, &far.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();

  assert!(!changed);
  assert!(grid.is_allocated(), "Storage is allocated even by empty edits");
  assert!(grid.is_cleared());
}

#[test]
fn test_edit_range_includes_boundary_samples() {
  let mut grid = VoxelGrid::new(2, 2).unwrap();
  let sdf = solid_box();

  // Bounds only touch the last sample plane at x = 1
  let bounds = MinMaxAABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.5, 1.0, 1.0));
  grid.add(&sdf, &bounds, &Affine3A::IDENTITY, 1.0, 0).unwrap();

  assert_eq!(grid.get(4, 3, 3).unwrap().raw, 255);
  assert_eq!(grid.get(3, 3, 3).unwrap().raw, 0);
}

#[test]
fn test_transform_maps_grid_into_sdf_space() {
  let mut grid = VoxelGrid::new(2, 2).unwrap();
  let sphere = SphereSdf::new(Vec3::ZERO, 0.25, 0.25).unwrap();
  let transform = Affine3A::from_translation(Vec3::splat(-0.5));
  let bounds = sphere.bounds().translated(Vec3::splat(0.5));

  grid.add(&sphere, &bounds, &transform, 1.0, 0).unwrap();

  assert_eq!(grid.get(2, 2, 2).unwrap().raw, 255);
  assert_eq!(grid.get(0, 0, 0).unwrap().raw, 0);
}

#[test]
fn test_add_saturates_and_reports_no_change_when_full() {
  let mut grid = VoxelGrid::new(1, 1).unwrap();
  let sdf = solid_box();

  assert!(grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap());
  assert!(grid.voxels().iter().all(|v| v.raw == 255));

  let changed = grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();
  assert!(!changed, "Adding to fully solid voxels changes nothing");
  assert!(grid.voxels().iter().all(|v| v.raw == 255));
}

#[test]
fn test_subtract_saturates_and_reports_no_change_when_empty() {
  let mut grid = VoxelGrid::new(1, 1).unwrap();
  let sdf = solid_box();

  grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();

  assert!(grid
    .subtract(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap());
  assert!(grid.voxels().iter().all(|v| v.raw == 0));

  let changed = grid
    .subtract(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();
  assert!(!changed, "Subtracting from empty voxels changes nothing");
}

#[test]
fn test_subtract_on_unallocated_grid_is_noop() {
  let mut grid = VoxelGrid::new(1, 4).unwrap();
  let sdf = solid_box();

  let changed = grid
    .subtract(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 0.01, 0)
    .unwrap();

  assert!(!changed);
  assert!(!grid.is_allocated());
}

#[test]
fn test_subtract_never_upgrades_resolution() {
  let mut grid = VoxelGrid::new(1, 4).unwrap();
  let sdf = solid_box();
  let sphere = center_sphere();

  grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();
  assert_eq!(grid.subdivisions(), 1);

  grid
    .subtract(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.01, 0)
    .unwrap();
  assert_eq!(grid.subdivisions(), 1);
  assert_eq!(grid.size(), UVec3::splat(3));
}

#[test]
fn test_subtract_takes_material_of_brush() {
  let mut grid = VoxelGrid::new(1, 1).unwrap();
  let sdf = solid_box();

  grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 2)
    .unwrap();
  grid
    .subtract(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 9)
    .unwrap();

  assert!(grid.voxels().iter().all(|v| *v == Voxel::from_raw(0, 9)));
}

#[test]
fn test_clear_is_idempotent() {
  let mut grid = VoxelGrid::new(1, 2).unwrap();
  assert!(!grid.clear(), "Unallocated grid has nothing to clear");

  let sphere = center_sphere();
  grid
    .add(&sphere, &sphere.bounds(), &Affine3A::IDENTITY, 0.5, 3)
    .unwrap();

  assert!(grid.clear());
  assert!(grid.is_cleared());
  assert!(grid.is_allocated(), "Clear keeps storage");
  assert!(grid.voxels().iter().all(|v| *v == Voxel::EMPTY));

  assert!(!grid.clear());
}

// =============================================================================
// Upgrade resampling
// =============================================================================

#[test]
fn test_upgrade_preserves_lattice_samples_and_material() {
  let old = ramp_voxels(3);
  let mut grid = VoxelGrid::from_raw(1, 3, 1, old.clone()).unwrap();
  let far = SphereSdf::new(Vec3::splat(10.0), 0.1, 0.1).unwrap();

  // 1 / 0.25 = 4 → subdivision 2
  grid
    .add(&far, &far.bounds(), &Affine3A::IDENTITY, 0.25, 0)
    .unwrap();

  assert_eq!(grid.subdivisions(), 2);
  assert_eq!(grid.size(), UVec3::splat(5));

  for z in 0..3 {
    for y in 0..3 {
      for x in 0..3 {
        let before = old[coord_to_index(UVec3::splat(3), x, y, z)];
        let after = grid.get(x * 2, y * 2, z * 2).unwrap();
        assert_eq!(after, before, "Sample ({}, {}, {}) should survive", x, y, z);
      }
    }
  }
}

#[test]
fn test_upgrade_interpolates_new_samples() {
  let old = ramp_voxels(3);
  let mut grid = VoxelGrid::from_raw(1, 3, 1, old.clone()).unwrap();
  let far = SphereSdf::new(Vec3::splat(10.0), 0.1, 0.1).unwrap();

  grid
    .add(&far, &far.bounds(), &Affine3A::IDENTITY, 0.25, 0)
    .unwrap();

  // Halfway between old (0,0,0) raw 0 and old (1,0,0) raw 100
  let a = voxel_value::to_float(0);
  let b = voxel_value::to_float(100);
  let expected = voxel_value::to_storage((a + b) * 0.5) as i32;
  let actual = grid.get(1, 0, 0).unwrap().raw as i32;

  assert!((actual - expected).abs() <= 1, "Got {}, expected {}", actual, expected);
}

#[test]
fn test_upgrade_of_cleared_grid_stays_cleared() {
  let mut grid = VoxelGrid::new(1, 3).unwrap();
  let sdf = solid_box();

  grid
    .add(&sdf, &sdf.bounds(), &Affine3A::IDENTITY, 1.0, 0)
    .unwrap();
  grid.clear();

  let far = SphereSdf::new(Vec3::splat(10.0), 0.1, 0.1).unwrap();
  grid
    .add(&far, &far.bounds(), &Affine3A::IDENTITY, 0.25, 0)
    .unwrap();

  assert_eq!(grid.subdivisions(), 2);
  assert!(grid.is_cleared());
}
