//! Adaptive DEM-to-sphere triangulation for 3D-printable planetary globes
//!
//! Converts a digital elevation model (a grayscale equirectangular
//! heightmap) into a hollow, watertight triangulated sphere suitable for
//! printing a relief globe. A recursive cube-face subdivision concentrates
//! triangles where the terrain is rough and coarsens where it is flat,
//! bounded by a per-cell geometric error tolerance.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use relief_globe::*;
//!
//! // Decode a DEM and wrap it in a height field
//! let image = image::open("mars_dem.png").unwrap();
//! let params = Body::Mars.parameters();
//! let field = HeightField::from_image(&image, params.min_elevation, params.max_elevation).unwrap();
//!
//! // Outer relief + inverted inner cavity
//! let shells = ShellBuilder::new(&field, params).build().unwrap();
//! println!("generated {} triangles", shells.triangle_count());
//!
//! // One binary STL per shell
//! save_stl(params.output_file_name("Mars", Some("outer")), &shells.outer).unwrap();
//! save_stl(params.output_file_name("Mars", Some("inner")), &shells.inner).unwrap();
//! ```
//!
//! # Features
//!
//! - `parallel` (default): triangulates the six cube faces concurrently
//!   with rayon; output ordering is identical either way
//! - `serde`: serialization support for parameters and presets

// Modules
pub mod error;
pub mod config;
pub mod heightfield;
pub mod projector;
pub mod mesh;
pub mod triangulate;
pub mod shell;

// Re-export core types for convenience
pub use error::{GlobeError, Result};
pub use config::{Body, SphereParameters, SphereParametersBuilder, MAX_SUPPORTED_DEPTH};
pub use heightfield::HeightField;
pub use mesh::{load_stl, read_stl, save_stl, write_stl, Mesh, Triangle};
pub use shell::{DualShell, ShellBuilder};
pub use triangulate::triangulate;

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
