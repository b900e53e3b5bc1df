//! Lattice primitives: spheres and tapered beams.
//!
//! A lattice is a bag of analytic primitives that can be rasterized into
//! a distance field in one pass (`DistanceGrid::render_lattice`). Beams
//! support independent end radii and either rounded or flat caps.

use glam::Vec3;

use crate::bounds::BBox3;

/// End-cap style for beams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamCap {
  /// Hemispherical caps; the beam is the convex hull of its end spheres.
  Round,
  /// Flat disc caps at the exact endpoints.
  Flat,
}

/// A single analytic lattice element.
#[derive(Clone, Copy, Debug)]
pub enum LatticePrimitive {
  Sphere {
    center: Vec3,
    radius: f32,
  },
  Beam {
    start: Vec3,
    end: Vec3,
    radius_start: f32,
    radius_end: f32,
    cap: BeamCap,
  },
}

impl LatticePrimitive {
  /// Exact signed distance to the primitive surface, negative inside.
  pub fn signed_distance(&self, p: Vec3) -> f32 {
    match *self {
      LatticePrimitive::Sphere { center, radius } => (p - center).length() - radius,
      LatticePrimitive::Beam {
        start,
        end,
        radius_start,
        radius_end,
        cap,
      } => match cap {
        BeamCap::Round => sdf_round_cone(p, start, end, radius_start, radius_end),
        BeamCap::Flat => sdf_capped_cone(p, start, end, radius_start, radius_end),
      },
    }
  }

  /// Tight axis-aligned bound of the primitive.
  pub fn bounds(&self) -> BBox3 {
    match *self {
      LatticePrimitive::Sphere { center, radius } => {
        BBox3::from_center_half_extents(center, Vec3::splat(radius))
      }
      LatticePrimitive::Beam {
        start,
        end,
        radius_start,
        radius_end,
        ..
      } => {
        let r = radius_start.max(radius_end);
        let mut bbox = BBox3::from_center_half_extents(start, Vec3::splat(r));
        bbox.include_box(&BBox3::from_center_half_extents(end, Vec3::splat(r)));
        bbox
      }
    }
  }
}

/// Collection of lattice primitives, rendered as their union.
#[derive(Clone, Debug, Default)]
pub struct Lattice {
  primitives: Vec<LatticePrimitive>,
}

impl Lattice {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_sphere(&mut self, center: Vec3, radius: f32) {
    self
      .primitives
      .push(LatticePrimitive::Sphere { center, radius });
  }

  /// Add a beam from `start` to `end` with linearly interpolated radius.
  /// `round_cap` selects hemispherical versus flat end caps.
  pub fn add_beam(
    &mut self,
    start: Vec3,
    end: Vec3,
    radius_start: f32,
    radius_end: f32,
    round_cap: bool,
  ) {
    let cap = if round_cap {
      BeamCap::Round
    } else {
      BeamCap::Flat
    };
    self.primitives.push(LatticePrimitive::Beam {
      start,
      end,
      radius_start,
      radius_end,
      cap,
    });
  }

  pub fn primitives(&self) -> &[LatticePrimitive] {
    &self.primitives
  }

  pub fn is_empty(&self) -> bool {
    self.primitives.is_empty()
  }

  /// Union bound over all primitives; empty box for an empty lattice.
  pub fn bounds(&self) -> BBox3 {
    let mut bbox = BBox3::empty();
    for primitive in &self.primitives {
      bbox.include_box(&primitive.bounds());
    }
    bbox
  }
}

// ============================================================================
// Beam distance functions
// ============================================================================

/// Round cone: convex hull of sphere(a, r1) and sphere(b, r2).
fn sdf_round_cone(p: Vec3, a: Vec3, b: Vec3, r1: f32, r2: f32) -> f32 {
  let ba = b - a;
  let l2 = ba.dot(ba);
  if l2 < 1e-12 {
    return (p - a).length() - r1.max(r2);
  }
  let rr = r1 - r2;
  let a2 = l2 - rr * rr;
  let il2 = 1.0 / l2;

  let pa = p - a;
  let y = pa.dot(ba);
  let z = y - l2;
  let w = pa * l2 - ba * y;
  let x2 = w.dot(w);
  let y2 = y * y * l2;
  let z2 = z * z * l2;

  let k = rr.signum() * rr * rr * x2;
  if z.signum() * a2 * z2 > k {
    (x2 + z2).sqrt() * il2 - r2
  } else if y.signum() * a2 * y2 < k {
    (x2 + y2).sqrt() * il2 - r1
  } else {
    ((x2 * a2 * il2).sqrt() + y * rr) * il2 - r1
  }
}

/// Capped cone: flat discs at both endpoints.
fn sdf_capped_cone(p: Vec3, a: Vec3, b: Vec3, ra: f32, rb: f32) -> f32 {
  let rba = rb - ra;
  let baba = (b - a).dot(b - a);
  if baba < 1e-12 {
    return (p - a).length() - ra.max(rb);
  }
  let papa = (p - a).dot(p - a);
  let paba = (p - a).dot(b - a) / baba;

  let x = (papa - paba * paba * baba).max(0.0).sqrt();
  let cax = 0.0f32.max(x - if paba < 0.5 { ra } else { rb });
  let cay = (paba - 0.5).abs() - 0.5;

  let k = rba * rba + baba;
  let f = ((rba * (x - ra) + paba * baba) / k).clamp(0.0, 1.0);
  let cbx = x - ra - f * rba;
  let cby = paba - f;

  let s = if cbx < 0.0 && cay < 0.0 { -1.0 } else { 1.0 };
  s * (cax * cax + cay * cay * baba)
    .min(cbx * cbx + cby * cby * baba)
    .sqrt()
}
