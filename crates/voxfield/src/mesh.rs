//! Triangle/quad mesh storage.
//!
//! A mesh is an ordered vertex sequence plus triangle (and optionally
//! quad) index tuples into it. Meshes own their arrays outright; nothing
//! is shared with the grids that produce or consume them.

use glam::Vec3;

use crate::bounds::BBox3;

/// Indexed triangle/quad surface.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
  vertices: Vec<Vec3>,
  triangles: Vec<[u32; 3]>,
  quads: Vec<[u32; 4]>,
}

impl Mesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a vertex, returning its index.
  pub fn add_vertex(&mut self, position: Vec3) -> u32 {
    let idx = self.vertices.len() as u32;
    self.vertices.push(position);
    idx
  }

  /// Append a triangle (counter-clockwise = outward-facing).
  pub fn add_triangle(&mut self, indices: [u32; 3]) {
    debug_assert!(indices.iter().all(|&i| (i as usize) < self.vertices.len()));
    self.triangles.push(indices);
  }

  /// Append a quad (counter-clockwise = outward-facing).
  pub fn add_quad(&mut self, indices: [u32; 4]) {
    debug_assert!(indices.iter().all(|&i| (i as usize) < self.vertices.len()));
    self.quads.push(indices);
  }

  pub fn vertex(&self, idx: u32) -> Vec3 {
    self.vertices[idx as usize]
  }

  pub fn vertices(&self) -> &[Vec3] {
    &self.vertices
  }

  pub fn triangles(&self) -> &[[u32; 3]] {
    &self.triangles
  }

  pub fn quads(&self) -> &[[u32; 4]] {
    &self.quads
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  pub fn quad_count(&self) -> usize {
    self.quads.len()
  }

  /// True if the mesh carries no faces.
  pub fn is_empty(&self) -> bool {
    self.triangles.is_empty() && self.quads.is_empty()
  }

  /// Bounding box of all vertices.
  pub fn bounding_box(&self) -> BBox3 {
    let mut bbox = BBox3::empty();
    for &v in &self.vertices {
      bbox.include(v);
    }
    bbox
  }

  /// Axis-aligned box as a closed 12-triangle surface, outward-facing.
  pub fn from_bbox(bbox: &BBox3) -> Self {
    let (lo, hi) = (bbox.min, bbox.max);
    let mut mesh = Mesh::new();
    // Corner order: binary ZYX, matching the voxel cell convention.
    for i in 0..8u32 {
      let c = Vec3::new(
        if i & 1 != 0 { hi.x } else { lo.x },
        if i & 2 != 0 { hi.y } else { lo.y },
        if i & 4 != 0 { hi.z } else { lo.z },
      );
      mesh.add_vertex(c);
    }
    const FACES: [[u32; 4]; 6] = [
      [0, 2, 3, 1], // -z
      [4, 5, 7, 6], // +z
      [0, 1, 5, 4], // -y
      [2, 6, 7, 3], // +y
      [0, 4, 6, 2], // -x
      [1, 3, 7, 5], // +x
    ];
    for [a, b, c, d] in FACES {
      mesh.add_triangle([a, b, c]);
      mesh.add_triangle([a, c, d]);
    }
    mesh
  }
}
