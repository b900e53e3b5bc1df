//! Closed-mesh voxelization.
//!
//! Two passes build a signed field from a watertight triangle mesh:
//!
//! 1. Unsigned narrow band: every triangle stamps exact point-to-triangle
//!    distances into the voxels within one band width of it.
//! 2. Sign: a parity scan along +Z per voxel column marks interior voxels.
//!    Band voxels get their sign from the column, interior voxels beyond
//!    the band are filled at the inside clamp value.
//!
//! The result is union-combined into the existing grid, so meshes can be
//! accumulated the same way implicit renders are.

use std::collections::HashMap;

use glam::{IVec3, Vec3};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::grid::DistanceGrid;
use crate::mesh::Mesh;

impl DistanceGrid {
  /// Voxelize a closed mesh and union it into the grid.
  ///
  /// The mesh must be watertight and outward-facing for the interior
  /// parity scan to be meaningful; open meshes produce an unsigned band
  /// with no interior. Quads are split on their first diagonal.
  pub fn render_mesh(&mut self, mesh: &Mesh) {
    let triangles = gather_triangles(mesh);
    if triangles.is_empty() {
      return;
    }
    let bg = self.background();
    let s = self.voxel_size();

    tracing::debug!(triangles = triangles.len(), "render_mesh");

    // Pass 1: unsigned distances within the band, min-merged per voxel.
    let band: HashMap<IVec3, f32> = triangles
      .par_iter()
      .fold(HashMap::new, |mut acc, tri| {
        stamp_triangle(&mut acc, tri, s, bg);
        acc
      })
      .reduce(HashMap::new, |mut a, b| {
        for (coord, d) in b {
          a.entry(coord)
            .and_modify(|existing| *existing = existing.min(d))
            .or_insert(d);
        }
        a
      });

    // Pass 2: per-column surface crossings for the parity test.
    let crossings = column_crossings(&triangles, s);

    // Compose into a scratch grid so the union into `self` reuses the
    // block-level CSG path.
    let mut scratch = self.empty_clone();
    for (&(cx, cy), zs) in &crossings {
      for pair in zs.chunks_exact(2) {
        let z0 = (pair[0] / s).ceil() as i32;
        let z1 = (pair[1] / s).floor() as i32;
        for z in z0..=z1 {
          scratch.set_value(IVec3::new(cx, cy, z), -bg);
        }
      }
    }
    for (&coord, &d) in &band {
      let inside = column_is_inside(&crossings, coord, s);
      scratch.set_value(coord, if inside { -d } else { d });
    }
    scratch.prune();

    self.bool_add(&scratch);
  }
}

/// Flatten triangles and diagonal-split quads into one list.
fn gather_triangles(mesh: &Mesh) -> Vec<[Vec3; 3]> {
  let mut triangles = Vec::with_capacity(mesh.triangle_count() + 2 * mesh.quad_count());
  for &[a, b, c] in mesh.triangles() {
    triangles.push([mesh.vertex(a), mesh.vertex(b), mesh.vertex(c)]);
  }
  for &[a, b, c, d] in mesh.quads() {
    triangles.push([mesh.vertex(a), mesh.vertex(b), mesh.vertex(c)]);
    triangles.push([mesh.vertex(a), mesh.vertex(c), mesh.vertex(d)]);
  }
  triangles
}

/// Min-merge the triangle's distance into every voxel within `band` of it.
fn stamp_triangle(acc: &mut HashMap<IVec3, f32>, tri: &[Vec3; 3], s: f32, band: f32) {
  let lo = tri[0].min(tri[1]).min(tri[2]) - Vec3::splat(band);
  let hi = tri[0].max(tri[1]).max(tri[2]) + Vec3::splat(band);
  let vmin = (lo / s).floor().as_ivec3();
  let vmax = (hi / s).ceil().as_ivec3();

  for x in vmin.x..=vmax.x {
    for y in vmin.y..=vmax.y {
      for z in vmin.z..=vmax.z {
        let coord = IVec3::new(x, y, z);
        let p = coord.as_vec3() * s;
        let d = point_triangle_distance_sq(p, tri[0], tri[1], tri[2]).sqrt();
        if d <= band {
          acc
            .entry(coord)
            .and_modify(|existing| *existing = existing.min(d))
            .or_insert(d);
        }
      }
    }
  }
}

/// Sorted z crossings per (x, y) voxel column, cast along +Z.
fn column_crossings(triangles: &[[Vec3; 3]], s: f32) -> HashMap<(i32, i32), Vec<f32>> {
  // Bucket triangle indices by the columns their XY footprint touches.
  let mut buckets: HashMap<(i32, i32), SmallVec<[u32; 8]>> = HashMap::new();
  for (idx, tri) in triangles.iter().enumerate() {
    let lo = tri[0].min(tri[1]).min(tri[2]);
    let hi = tri[0].max(tri[1]).max(tri[2]);
    let xmin = (lo.x / s).floor() as i32;
    let xmax = (hi.x / s).ceil() as i32;
    let ymin = (lo.y / s).floor() as i32;
    let ymax = (hi.y / s).ceil() as i32;
    for x in xmin..=xmax {
      for y in ymin..=ymax {
        buckets.entry((x, y)).or_default().push(idx as u32);
      }
    }
  }

  let mut columns: Vec<(&(i32, i32), &SmallVec<[u32; 8]>)> = buckets.iter().collect();
  columns.sort_by_key(|(key, _)| **key);

  columns
    .par_iter()
    .map(|&(&(cx, cy), bucket)| {
      // Nudge the ray off voxel centers so it cannot graze shared edges.
      let origin = Vec3::new(
        cx as f32 * s + s * 1.0e-4,
        cy as f32 * s + s * 1.7e-4,
        0.0,
      );
      let mut zs: Vec<f32> = bucket
        .iter()
        .filter_map(|&idx| ray_z_crossing(origin, &triangles[idx as usize]))
        .collect();
      zs.sort_by(f32::total_cmp);
      ((cx, cy), zs)
    })
    .collect()
}

/// Intersection z of a +Z ray through `origin.xy` with the triangle,
/// or None when the ray misses or the triangle is edge-on.
fn ray_z_crossing(origin: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
  let (a, b, c) = (tri[0], tri[1], tri[2]);
  let e0 = Vec3::new(b.x - a.x, b.y - a.y, 0.0);
  let e1 = Vec3::new(c.x - a.x, c.y - a.y, 0.0);
  let denom = e0.x * e1.y - e0.y * e1.x;
  if denom.abs() < 1.0e-12 {
    return None;
  }
  let px = origin.x - a.x;
  let py = origin.y - a.y;
  let v = (px * e1.y - py * e1.x) / denom;
  let w = (py * e0.x - px * e0.y) / denom;
  let u = 1.0 - v - w;
  if v < 0.0 || w < 0.0 || u < 0.0 {
    return None;
  }
  Some(u * a.z + v * b.z + w * c.z)
}

/// Parity test: odd number of crossings below the voxel center means inside.
fn column_is_inside(crossings: &HashMap<(i32, i32), Vec<f32>>, coord: IVec3, s: f32) -> bool {
  let Some(zs) = crossings.get(&(coord.x, coord.y)) else {
    return false;
  };
  let cz = coord.z as f32 * s;
  zs.iter().filter(|&&z| z < cz).count() % 2 == 1
}

/// Squared distance from `p` to the closest point on triangle `abc`.
fn point_triangle_distance_sq(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f32 {
  let ab = b - a;
  let ac = c - a;
  let ap = p - a;

  let d1 = ab.dot(ap);
  let d2 = ac.dot(ap);
  if d1 <= 0.0 && d2 <= 0.0 {
    return ap.length_squared();
  }

  let bp = p - b;
  let d3 = ab.dot(bp);
  let d4 = ac.dot(bp);
  if d3 >= 0.0 && d4 <= d3 {
    return bp.length_squared();
  }

  let vc = d1 * d4 - d3 * d2;
  if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
    let v = d1 / (d1 - d3);
    return (ap - ab * v).length_squared();
  }

  let cp = p - c;
  let d5 = ab.dot(cp);
  let d6 = ac.dot(cp);
  if d6 >= 0.0 && d5 <= d6 {
    return cp.length_squared();
  }

  let vb = d5 * d2 - d1 * d6;
  if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
    let w = d2 / (d2 - d6);
    return (ap - ac * w).length_squared();
  }

  let va = d3 * d6 - d5 * d4;
  if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
    let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
    return (bp - (c - b) * w).length_squared();
  }

  let denom = 1.0 / (va + vb + vc);
  let v = vb * denom;
  let w = vc * denom;
  (a + ab * v + ac * w - p).length_squared()
}

#[cfg(test)]
#[path = "mesh_voxelize_test.rs"]
mod mesh_voxelize_test;
