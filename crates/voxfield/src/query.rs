//! Point, ray and bulk queries against the distance field.

use glam::{IVec3, Vec3};

use crate::bounds::BBox3;
use crate::constants::{BLOCK_SIZE, BLOCK_SIZE_I, BLOCK_VOLUME};
use crate::grid::{DistanceGrid, VoxelBlock};

/// Convergence tolerance for surface projection, in voxels.
const SURFACE_EPS_VOXELS: f32 = 1.0e-3;

impl DistanceGrid {
  /// True if `point` lies inside the solid (trilinear sample <= 0).
  pub fn is_inside(&self, point: Vec3) -> bool {
    self.sample(point) <= 0.0
  }

  /// Normalized field gradient at `point` by central differences.
  /// Returns the zero vector where the gradient is degenerate, e.g. far
  /// outside the narrow band.
  pub fn surface_normal(&self, point: Vec3) -> Vec3 {
    let h = 0.5 * self.voxel_size();
    let g = Vec3::new(
      self.sample(point + Vec3::X * h) - self.sample(point - Vec3::X * h),
      self.sample(point + Vec3::Y * h) - self.sample(point - Vec3::Y * h),
      self.sample(point + Vec3::Z * h) - self.sample(point - Vec3::Z * h),
    );
    g.normalize_or_zero()
  }

  /// The point on the surface closest to `point`, or `None` for a field
  /// without a surface.
  ///
  /// Inside the narrow band the query is a few gradient projection
  /// steps. Outside, the nearest band voxel seeds the projection first,
  /// which costs a scan over the active narrow band.
  pub fn closest_point_on_surface(&self, point: Vec3) -> Option<Vec3> {
    if !self.has_surface() {
      return None;
    }
    let bg = self.background();
    let mut p = if self.sample(point).abs() < bg {
      point
    } else {
      tracing::debug!("closest_point_on_surface: seeding from band scan");
      let mut best: Option<Vec3> = None;
      let mut best_d2 = f32::INFINITY;
      self.for_each_band_voxel(|coord, _| {
        let w = self.voxel_to_world(coord);
        let d2 = w.distance_squared(point);
        if d2 < best_d2 {
          best_d2 = d2;
          best = Some(w);
        }
      });
      best?
    };

    let eps = self.voxel_size() * SURFACE_EPS_VOXELS;
    for _ in 0..12 {
      let d = self.sample(p);
      if d.abs() <= eps {
        break;
      }
      let n = self.surface_normal(p);
      if n == Vec3::ZERO {
        break;
      }
      p -= n * d;
    }
    Some(p)
  }

  /// Sphere-trace a ray from `origin` along `direction` to the surface.
  ///
  /// Returns the hit point, or `None` when the ray misses the active
  /// region or `direction` is degenerate. A ray starting inside the
  /// solid reports its origin.
  pub fn raycast_to_surface(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
    if !self.has_surface() {
      return None;
    }
    let dir = direction.try_normalize()?;
    let bounds = self.bounding_box().expanded(self.background());
    let (t_enter, t_exit) = ray_box_range(origin, dir, &bounds)?;
    if t_exit < 0.0 {
      return None;
    }

    let eps = self.voxel_size() * SURFACE_EPS_VOXELS;
    let min_step = 0.25 * self.voxel_size();
    let mut t = t_enter.max(0.0);
    let mut prev_t = t;
    let mut prev_d = self.sample(origin + dir * t);

    while t <= t_exit {
      let d = self.sample(origin + dir * t);
      if d <= eps {
        // Linear zero refinement between the last two samples.
        if prev_d > d && prev_d > 0.0 {
          let f = prev_d / (prev_d - d);
          return Some(origin + dir * (prev_t + f * (t - prev_t)));
        }
        return Some(origin + dir * t);
      }
      prev_t = t;
      prev_d = d;
      // Safe to skip the full unsigned distance; clamped values bound
      // each step at the band width.
      t += d.max(min_step);
    }
    None
  }

  /// Solid volume (world units cubed) and world-space bounding box.
  ///
  /// Volume uses linear partial weighting across the boundary voxel:
  /// a voxel at distance `v` contributes `clamp(0.5 - v / voxel_size,
  /// 0, 1)` of its cell. Cost is proportional to the active region.
  pub fn calculate_properties(&self) -> (f32, BBox3) {
    let s = self.voxel_size();
    let cell = s * s * s;
    let half = Vec3::splat(0.5 * s);
    let mut fractions = 0.0f64;
    let mut bbox = BBox3::empty();

    for key in self.sorted_block_keys() {
      match &self.blocks()[&key] {
        VoxelBlock::Interior => {
          fractions += BLOCK_VOLUME as f64;
          let lo = (key * BLOCK_SIZE_I).as_vec3() * s - half;
          let hi = ((key + IVec3::ONE) * BLOCK_SIZE_I - IVec3::ONE).as_vec3() * s + half;
          bbox.include(lo);
          bbox.include(hi);
        }
        VoxelBlock::Dense(values) => {
          let base = key * BLOCK_SIZE_I;
          for x in 0..BLOCK_SIZE {
            for y in 0..BLOCK_SIZE {
              for z in 0..BLOCK_SIZE {
                let v = values[crate::constants::coord_to_index(x, y, z)];
                let frac = (0.5 - v / s).clamp(0.0, 1.0);
                if frac > 0.0 {
                  fractions += frac as f64;
                  let w = (base + IVec3::new(x as i32, y as i32, z as i32)).as_vec3() * s;
                  bbox.include(w - half);
                  bbox.include(w + half);
                }
              }
            }
          }
        }
      }
    }

    tracing::debug!(volume = fractions * cell as f64, "calculate_properties");
    ((fractions * cell as f64) as f32, bbox)
  }
}

/// Parametric entry/exit of a ray against a box, `None` on miss.
fn ray_box_range(origin: Vec3, dir: Vec3, bounds: &BBox3) -> Option<(f32, f32)> {
  let mut t_enter = f32::NEG_INFINITY;
  let mut t_exit = f32::INFINITY;
  for axis in 0..3 {
    let (o, d) = (origin[axis], dir[axis]);
    let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
    if d.abs() < 1e-12 {
      if o < lo || o > hi {
        return None;
      }
      continue;
    }
    let inv = 1.0 / d;
    let (t0, t1) = ((lo - o) * inv, (hi - o) * inv);
    let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    t_enter = t_enter.max(t0);
    t_exit = t_exit.min(t1);
    if t_enter > t_exit {
      return None;
    }
  }
  Some((t_enter, t_exit))
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
