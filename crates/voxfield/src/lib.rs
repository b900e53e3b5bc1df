//! voxfield - Sparse narrow-band signed distance voxel kernel
//!
//! This crate stores solids as block-sparse signed distance fields and
//! provides the operations of a voxel geometry kernel on top: boolean
//! combination, morphological offsetting, implicit-function and mesh
//! rasterization, surface-nets extraction, and point/ray/slice queries.
//!
//! # Representation
//!
//! - Distances are metrically accurate inside a narrow band around the
//!   surface (default ±3 voxels) and clamped to the background value
//!   beyond it. Negative is inside.
//! - Voxels live in 8³ dense blocks keyed by block coordinate. Deep
//!   interior regions collapse into uniform tiles, absent blocks read
//!   as background.
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use voxfield::{DistanceGrid, ExtractConfig, GridConfig};
//!
//! let mut grid = DistanceGrid::new(GridConfig::new(0.5))?;
//!
//! // Render a 10 mm sphere at the origin.
//! let sphere = |p: Vec3| p.length() - 10.0;
//! grid.render_implicit(&sphere, voxfield::BBox3::from_center_half_extents(
//!     Vec3::ZERO, Vec3::splat(10.0)));
//!
//! let (volume, bounds) = grid.calculate_properties();
//! let mesh = grid.extract_surface(&ExtractConfig::default());
//! # Ok::<(), voxfield::VoxError>(())
//! ```

pub mod bounds;
pub mod constants;
pub mod error;
pub mod grid;
pub mod lattice;
pub mod mesh;
pub mod metadata;

mod csg;
mod extract;
mod morph;
mod query;
mod render;
mod slice;

// Re-export the public surface at the crate root
pub use bounds::BBox3;
pub use error::{Result, VoxError};
pub use extract::ExtractConfig;
pub use grid::{DistanceGrid, GridConfig, VoxelDimensions};
pub use lattice::{BeamCap, Lattice, LatticePrimitive};
pub use mesh::Mesh;
pub use metadata::{FieldMetadata, MetaValue};
pub use render::Implicit;
pub use slice::{SliceBuffer, SliceMode};
