//! Benchmarks for the render / boolean / extract pipeline on a sphere.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use voxfield::{BBox3, DistanceGrid, ExtractConfig, GridConfig};

const RADIUS: f32 = 10.0;
const VOXEL: f32 = 0.5;

fn sphere_sdf(p: Vec3) -> f32 {
  p.length() - RADIUS
}

fn sphere_grid() -> DistanceGrid {
  let mut grid = DistanceGrid::new(GridConfig::new(VOXEL)).expect("valid config");
  grid.render_implicit(
    &sphere_sdf,
    BBox3::from_center_half_extents(Vec3::ZERO, Vec3::splat(RADIUS)),
  );
  grid
}

fn bench_render(c: &mut Criterion) {
  c.bench_function("render_implicit (10mm sphere @ 0.5mm)", |b| {
    b.iter(|| black_box(sphere_grid()))
  });
}

fn bench_boolean(c: &mut Criterion) {
  let a = sphere_grid();
  let mut core = DistanceGrid::new(GridConfig::new(VOXEL)).expect("valid config");
  let f = |p: Vec3| p.length() - 5.0;
  core.render_implicit(
    &f,
    BBox3::from_center_half_extents(Vec3::ZERO, Vec3::splat(5.0)),
  );

  c.bench_function("bool_subtract (sphere - core)", |b| {
    b.iter(|| {
      let mut g = a.clone();
      g.bool_subtract(black_box(&core));
      black_box(g)
    })
  });
}

fn bench_offset(c: &mut Criterion) {
  let grid = sphere_grid();
  c.bench_function("offset (+0.5mm)", |b| {
    b.iter(|| {
      let mut g = grid.clone();
      g.offset(black_box(0.5));
      black_box(g)
    })
  });
}

fn bench_extract(c: &mut Criterion) {
  let grid = sphere_grid();
  let config = ExtractConfig::default();
  c.bench_function("extract_surface (10mm sphere)", |b| {
    b.iter(|| black_box(grid.extract_surface(black_box(&config))))
  });
}

criterion_group!(
  benches,
  bench_render,
  bench_boolean,
  bench_offset,
  bench_extract
);
criterion_main!(benches);
