use std::collections::HashMap;

use glam::Vec3;

use super::ExtractConfig;
use crate::bounds::BBox3;
use crate::grid::{DistanceGrid, GridConfig};
use crate::mesh::Mesh;

fn sphere_grid(radius: f32) -> DistanceGrid {
  let mut g = DistanceGrid::new(GridConfig::new(0.5)).unwrap();
  let f = move |p: Vec3| p.length() - radius;
  g.render_implicit(&f, BBox3::from_center_half_extents(Vec3::ZERO, Vec3::splat(radius)));
  g
}

/// Every edge of a closed triangle mesh is shared by exactly two faces.
fn assert_watertight(mesh: &Mesh) {
  let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
  for [a, b, c] in mesh.triangles() {
    for (u, v) in [(a, b), (b, c), (c, a)] {
      let key = if u < v { (*u, *v) } else { (*v, *u) };
      *edges.entry(key).or_default() += 1;
    }
  }
  assert!(!edges.is_empty());
  assert!(
    edges.values().all(|&n| n == 2),
    "mesh has boundary or non-manifold edges"
  );
}

#[test]
fn empty_field_extracts_an_empty_mesh() {
  let g = DistanceGrid::new(GridConfig::new(0.5)).unwrap();
  let mesh = g.extract_surface(&ExtractConfig::default());
  assert!(mesh.is_empty());
  assert_eq!(mesh.vertex_count(), 0);
}

#[test]
fn sphere_vertices_lie_on_the_surface() {
  let g = sphere_grid(10.0);
  let mesh = g.extract_surface(&ExtractConfig::default());

  assert!(mesh.vertex_count() > 100);
  for &v in mesh.vertices() {
    let err = (v.length() - 10.0).abs();
    assert!(err < 0.5, "vertex {v} is {err} off the sphere");
  }
}

#[test]
fn sphere_mesh_is_watertight() {
  let mesh = sphere_grid(6.0).extract_surface(&ExtractConfig::default());
  assert_watertight(&mesh);
}

#[test]
fn triangles_face_outward() {
  let mesh = sphere_grid(6.0).extract_surface(&ExtractConfig::default());
  let mut outward = 0usize;
  let mut inward = 0usize;
  for &[a, b, c] in mesh.triangles() {
    let (pa, pb, pc) = (mesh.vertex(a), mesh.vertex(b), mesh.vertex(c));
    let normal = (pb - pa).cross(pc - pa);
    let radial = (pa + pb + pc) / 3.0;
    if normal.dot(radial) > 0.0 {
      outward += 1;
    } else {
      inward += 1;
    }
  }
  assert_eq!(inward, 0, "{inward} of {} triangles face inward", inward + outward);
}

#[test]
fn extraction_is_deterministic() {
  let g = sphere_grid(7.0);
  let a = g.extract_surface(&ExtractConfig::default());
  let b = g.extract_surface(&ExtractConfig::default());

  assert_eq!(a.vertex_count(), b.vertex_count());
  assert_eq!(a.triangles(), b.triangles());
  assert_eq!(a.vertices(), b.vertices());
}

#[test]
fn quad_mode_emits_quads() {
  let mesh = sphere_grid(6.0).extract_surface(&ExtractConfig::new().with_quads(true));
  assert!(mesh.quad_count() > 0);
  assert_eq!(mesh.triangle_count(), 0);
}

#[test]
fn adaptivity_reduces_vertex_count() {
  let g = sphere_grid(8.0);
  let full = g.extract_surface(&ExtractConfig::default());
  let simplified = g.extract_surface(&ExtractConfig::new().with_adaptivity(0.8));

  assert!(simplified.vertex_count() < full.vertex_count());
  assert!(simplified.vertex_count() > 0);
  for &v in simplified.vertices() {
    assert!((v.length() - 8.0).abs() < 1.5);
  }
}

#[test]
fn coarsening_reduces_resolution() {
  let g = sphere_grid(8.0);
  let fine = g.extract_surface(&ExtractConfig::default());
  let coarse = g.extract_surface(&ExtractConfig::new().with_coarsen(2.0));

  assert!(coarse.vertex_count() < fine.vertex_count());
  for &v in coarse.vertices() {
    assert!((v.length() - 8.0).abs() < 1.0, "coarse vertex {v} off surface");
  }
}

#[test]
fn extracted_volume_agrees_with_field_volume() {
  let g = sphere_grid(8.0);
  let mesh = g.extract_surface(&ExtractConfig::default());

  // Signed tetrahedron sum; valid because the mesh is closed.
  let mut mesh_volume = 0.0f64;
  for &[a, b, c] in mesh.triangles() {
    let (pa, pb, pc) = (mesh.vertex(a), mesh.vertex(b), mesh.vertex(c));
    mesh_volume += (pa.dot(pb.cross(pc)) / 6.0) as f64;
  }
  let field_volume = g.calculate_properties().0 as f64;

  let err = (mesh_volume - field_volume).abs() / field_volume;
  assert!(
    err < 0.05,
    "mesh volume {mesh_volume} vs field volume {field_volume}"
  );
}

#[test]
fn config_builders_clamp_inputs() {
  let cfg = ExtractConfig::new()
    .with_adaptivity(7.0)
    .with_coarsen(0.25);
  assert_eq!(cfg.adaptivity, 1.0);
  assert_eq!(cfg.coarsen, 1.0);
}
