//! Dual-shell assembly
//!
//! A printable globe needs a finite wall: an outer surface carrying the
//! relief and an inner cavity surface carrying the same relief inverted, so
//! the wall keeps a roughly constant thickness under peaks and trenches.

use tracing::info;

use crate::config::SphereParameters;
use crate::error::{GlobeError, Result};
use crate::heightfield::HeightField;
use crate::mesh::Mesh;
use crate::triangulate::triangulate;

/// The two shells of a hollow globe
///
/// `outer` winds outward (normals away from the sphere center); `inner` is
/// built from the inverted height field at a reduced scale and winds inward
/// (normals out of the cavity, into the printed wall). The shells are
/// topologically independent closed surfaces; no vertices are shared
/// between them.
#[derive(Debug, Clone)]
pub struct DualShell {
    /// The relief surface
    pub outer: Mesh,
    /// The cavity surface, inverted and wound toward the wall
    pub inner: Mesh,
}

impl DualShell {
    /// Both shells concatenated into one mesh, outer first
    ///
    /// The order is part of the output contract: it keeps combined files
    /// byte-reproducible.
    #[must_use]
    pub fn combined(&self) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.outer.triangle_count() + self.inner.triangle_count());
        let mut outer = self.outer.clone();
        let mut inner = self.inner.clone();
        mesh.append(&mut outer);
        mesh.append(&mut inner);
        mesh
    }

    /// Total triangle count across both shells
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.outer.triangle_count() + self.inner.triangle_count()
    }
}

/// Builds the hollow dual-shell mesh for one height field
///
/// # Example
///
/// ```rust
/// use relief_globe::*;
///
/// let field = HeightField::from_samples(8, 4, vec![0.5; 32], -100.0, 100.0).unwrap();
/// let params = SphereParametersBuilder::new()
///     .mean_radius(1000.0)
///     .unwrap()
///     .elevation_range(-100.0, 100.0)
///     .depth_range(2, 2)
///     .build()
///     .unwrap();
///
/// let shells = ShellBuilder::new(&field, params).build().unwrap();
/// assert_eq!(shells.outer.triangle_count(), shells.inner.triangle_count());
/// ```
pub struct ShellBuilder<'a> {
    field: &'a HeightField,
    params: SphereParameters,
}

impl<'a> ShellBuilder<'a> {
    /// Create a builder for the given field and parameters
    pub fn new(field: &'a HeightField, params: SphereParameters) -> Self {
        Self { field, params }
    }

    /// Triangulate both shells
    ///
    /// The outer shell triangulates the field as-is. The inner shell
    /// triangulates the elevation-inverted field with the scale multiplied
    /// by `inner_shell_scale`, then reverses every triangle's winding so
    /// its normal points into the wall.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for bad parameters and `DegenerateMesh` if
    /// either traversal yields zero triangles — a print-ready model needs
    /// both shells, so an empty one is reported, never passed through.
    pub fn build(&self) -> Result<DualShell> {
        self.params.validate()?;

        let outer = triangulate(self.field, &self.params)?;
        info!("outer shell: {} triangles", outer.triangle_count());

        let mut inner_params = self.params;
        inner_params.scale = self.params.scale * self.params.inner_shell_scale;
        let inner = triangulate(&self.field.inverted(), &inner_params)?.reversed();
        info!("inner shell: {} triangles", inner.triangle_count());

        if outer.is_empty() || inner.is_empty() {
            return Err(GlobeError::DegenerateMesh(format!(
                "shell traversal produced an empty mesh (outer: {}, inner: {})",
                outer.triangle_count(),
                inner.triangle_count()
            )));
        }

        Ok(DualShell { outer, inner })
    }
}
