use glam::Vec3;

use crate::bounds::BBox3;
use crate::grid::{DistanceGrid, GridConfig};
use crate::mesh::Mesh;

fn grid() -> DistanceGrid {
  DistanceGrid::new(GridConfig::new(0.5)).unwrap()
}

fn unit_box(half: f32) -> Mesh {
  Mesh::from_bbox(&BBox3::from_center_half_extents(Vec3::ZERO, Vec3::splat(half)))
}

#[test]
fn voxelized_box_has_an_interior() {
  let mut g = grid();
  g.render_mesh(&unit_box(4.0));

  assert!(g.has_surface());
  assert!(g.is_inside(Vec3::ZERO));
  assert!(g.is_inside(Vec3::new(3.0, 3.0, 3.0)));
  assert!(!g.is_inside(Vec3::new(5.0, 0.0, 0.0)));
  assert!(!g.is_inside(Vec3::new(0.0, 0.0, -6.0)));
}

#[test]
fn voxelized_box_volume_matches() {
  let mut g = grid();
  g.render_mesh(&unit_box(4.0));
  let (volume, bbox) = g.calculate_properties();

  let exact = 8.0f32 * 8.0 * 8.0;
  assert!(
    (volume - exact).abs() / exact < 0.05,
    "expected ~{exact}, got {volume}"
  );
  assert!(bbox.min.x <= -4.0 && bbox.max.x >= 4.0);
}

#[test]
fn band_distances_are_metric_near_faces() {
  let mut g = grid();
  g.render_mesh(&unit_box(4.0));

  // 1 mm outside the +X face.
  let d = g.sample(Vec3::new(5.0, 0.0, 0.0));
  assert!((d - 1.0).abs() < 0.26, "expected ~1.0, got {d}");
  // 1 mm inside the +X face.
  let d = g.sample(Vec3::new(3.0, 0.0, 0.0));
  assert!((d + 1.0).abs() < 0.26, "expected ~-1.0, got {d}");
}

#[test]
fn mesh_render_unions_with_existing_content() {
  let mut g = grid();
  let f = |p: Vec3| (p - Vec3::new(10.0, 0.0, 0.0)).length() - 2.0;
  g.render_implicit(
    &f,
    BBox3::from_center_half_extents(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0)),
  );
  g.render_mesh(&unit_box(3.0));

  assert!(g.is_inside(Vec3::ZERO));
  assert!(g.is_inside(Vec3::new(10.0, 0.0, 0.0)));
}

#[test]
fn open_mesh_produces_no_interior() {
  let mut mesh = Mesh::new();
  let a = mesh.add_vertex(Vec3::new(-4.0, -4.0, 0.0));
  let b = mesh.add_vertex(Vec3::new(4.0, -4.0, 0.0));
  let c = mesh.add_vertex(Vec3::new(0.0, 4.0, 0.0));
  mesh.add_triangle([a, b, c]);

  let mut g = grid();
  g.render_mesh(&mesh);

  // A lone triangle has band voxels but no enclosed volume.
  assert!(!g.is_inside(Vec3::new(0.0, 0.0, 2.0)));
  assert!(!g.is_inside(Vec3::new(0.0, 0.0, -2.0)));
}

#[test]
fn empty_mesh_is_a_no_op() {
  let mut g = grid();
  g.render_mesh(&Mesh::new());
  assert!(g.is_empty());
}

#[test]
fn quads_are_voxelized() {
  // Same box expressed as 6 quads.
  let bbox = BBox3::from_center_half_extents(Vec3::ZERO, Vec3::splat(3.0));
  let tri_box = Mesh::from_bbox(&bbox);
  let mut quad_box = Mesh::new();
  for &v in tri_box.vertices() {
    quad_box.add_vertex(v);
  }
  for pair in tri_box.triangles().chunks_exact(2) {
    // from_bbox emits (a,b,c),(a,c,d) per face.
    let [a, b, c] = pair[0];
    let d = pair[1][2];
    quad_box.add_quad([a, b, c, d]);
  }

  let mut g = grid();
  g.render_mesh(&quad_box);
  assert!(g.is_inside(Vec3::ZERO));
  assert!(!g.is_inside(Vec3::new(4.0, 0.0, 0.0)));
}
