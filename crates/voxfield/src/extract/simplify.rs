//! Normal-aware vertex clustering simplification.
//!
//! Vertices are binned into a uniform cluster grid whose size grows with
//! the adaptivity setting. Within a bin, vertices merge only while their
//! field normals agree, so flat regions collapse aggressively while
//! edges and corners keep their vertices. Faces are re-indexed against
//! the merged vertices and degenerate ones dropped.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::mesh::Mesh;

/// A group of merged vertices within one cluster bin.
struct Group {
  normal_sum: Vec3,
  position_sum: Vec3,
  count: u32,
}

/// Simplify `mesh` with clustering strength `adaptivity` in `(0, 1]`.
/// `cell_size` is the extraction cell size in world units.
pub(super) fn simplify(mesh: &Mesh, normals: &[Vec3], cell_size: f32, adaptivity: f32) -> Mesh {
  debug_assert_eq!(mesh.vertex_count(), normals.len());

  // One cell at adaptivity 0+ up to an 8-cell bin at adaptivity 1.
  let bin_size = cell_size * (1.0 + adaptivity * 7.0);
  // Merge tolerance: ~18 degrees at low adaptivity, ~66 at full.
  let dot_limit = 0.95 - 0.55 * adaptivity;

  // BTreeMap keeps bins ordered, so merged vertex order is deterministic.
  let mut bins: BTreeMap<(i32, i32, i32), Vec<usize>> = BTreeMap::new();
  for (idx, &p) in mesh.vertices().iter().enumerate() {
    let key = (
      (p.x / bin_size).floor() as i32,
      (p.y / bin_size).floor() as i32,
      (p.z / bin_size).floor() as i32,
    );
    bins.entry(key).or_default().push(idx);
  }

  let mut out = Mesh::new();
  let mut remap = vec![0u32; mesh.vertex_count()];

  for members in bins.values() {
    let mut groups: Vec<(Group, Vec<usize>)> = Vec::new();
    for &idx in members {
      let n = normals[idx];
      let found = groups.iter_mut().find(|(g, _)| {
        let avg = g.normal_sum / g.count as f32;
        avg.normalize_or_zero().dot(n) > dot_limit
      });
      match found {
        Some((g, list)) => {
          g.normal_sum += n;
          g.position_sum += mesh.vertex(idx as u32);
          g.count += 1;
          list.push(idx);
        }
        None => groups.push((
          Group {
            normal_sum: n,
            position_sum: mesh.vertex(idx as u32),
            count: 1,
          },
          vec![idx],
        )),
      }
    }
    for (group, list) in groups {
      let merged = out.add_vertex(group.position_sum / group.count as f32);
      for idx in list {
        remap[idx] = merged;
      }
    }
  }

  for &[a, b, c] in mesh.triangles() {
    let (a, b, c) = (remap[a as usize], remap[b as usize], remap[c as usize]);
    if a != b && b != c && a != c {
      out.add_triangle([a, b, c]);
    }
  }
  for &[a, b, c, d] in mesh.quads() {
    let mapped = [
      remap[a as usize],
      remap[b as usize],
      remap[c as usize],
      remap[d as usize],
    ];
    let unique: Vec<u32> = {
      let mut seen = Vec::with_capacity(4);
      for &i in &mapped {
        if !seen.contains(&i) {
          seen.push(i);
        }
      }
      seen
    };
    match unique.len() {
      4 => out.add_quad(mapped),
      3 => out.add_triangle([unique[0], unique[1], unique[2]]),
      _ => {}
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use glam::Vec3;

  use super::*;

  #[test]
  fn zero_length_mesh_survives() {
    let mesh = Mesh::new();
    let out = simplify(&mesh, &[], 1.0, 0.5);
    assert_eq!(out.vertex_count(), 0);
    assert!(out.is_empty());
  }

  #[test]
  fn coplanar_vertices_collapse() {
    // Four coplanar vertices, all facing +Z, inside one bin.
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(Vec3::new(0.1, 0.0, 0.0));
    let c = mesh.add_vertex(Vec3::new(0.0, 0.1, 0.0));
    let d = mesh.add_vertex(Vec3::new(0.1, 0.1, 0.0));
    mesh.add_triangle([a, b, c]);
    mesh.add_triangle([b, d, c]);
    let normals = vec![Vec3::Z; 4];

    let out = simplify(&mesh, &normals, 1.0, 1.0);
    // All four merge into one vertex; both triangles degenerate away.
    assert_eq!(out.vertex_count(), 1);
    assert_eq!(out.triangle_count(), 0);
  }

  #[test]
  fn opposing_normals_stay_apart() {
    let mut mesh = Mesh::new();
    mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
    mesh.add_vertex(Vec3::new(0.1, 0.0, 0.0));
    let normals = vec![Vec3::Z, -Vec3::Z];

    let out = simplify(&mesh, &normals, 1.0, 1.0);
    assert_eq!(out.vertex_count(), 2);
  }
}
