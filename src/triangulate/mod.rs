//! Adaptive DEM-to-sphere triangulation
//!
//! The core engine: each cube face is refined depth-first until every cell
//! either meets the geometric error tolerance or hits the depth ceiling,
//! then edge-adjacent cells are depth-balanced and the leaves are emitted as
//! displaced triangles. Refinement concentrates triangles where elevation
//! changes sharply and coarsens over flat terrain, so output size tracks
//! terrain complexity rather than uniform subdivision.

mod quadtree;

use glam::DVec3;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::SphereParameters;
use crate::error::Result;
use crate::heightfield::HeightField;
use crate::mesh::{Mesh, Triangle};
use crate::projector::{direction, Face, FaceEdge};
use quadtree::{balance, CellId, LeafSet};

/// Triangulate a height field over the sphere
///
/// Produces one complete shell: a closed triangle mesh whose vertices lie at
/// radius `scale * (mean_radius + exaggeration * elevation)` along unit
/// directions from the sphere center, wound counter-clockwise seen from
/// outside. The output is deterministic: the same field and parameters
/// always yield the identical triangle sequence.
///
/// # Errors
///
/// Returns `InvalidConfig` if the parameters fail validation; no traversal
/// is started in that case.
///
/// # Example
///
/// ```rust
/// use relief_globe::*;
///
/// let field = HeightField::from_samples(8, 4, vec![0.0; 32], 0.0, 0.0).unwrap();
/// let params = SphereParametersBuilder::new().depth_range(2, 2).build().unwrap();
/// let mesh = triangulate(&field, &params).unwrap();
/// assert_eq!(mesh.triangle_count(), 6 * 16 * 2);
/// ```
pub fn triangulate(field: &HeightField, params: &SphereParameters) -> Result<Mesh> {
    params.validate()?;
    let triangulator = Triangulator { field, params };
    Ok(triangulator.run())
}

struct Triangulator<'a> {
    field: &'a HeightField,
    params: &'a SphereParameters,
}

impl Triangulator<'_> {
    fn run(&self) -> Mesh {
        // Refine: each face is an independent subtree over the shared
        // read-only height field.
        #[cfg(feature = "parallel")]
        let per_face: Vec<Vec<CellId>> = Face::ALL
            .par_iter()
            .map(|&face| self.refine_face(face))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let per_face: Vec<Vec<CellId>> = Face::ALL
            .iter()
            .map(|&face| self.refine_face(face))
            .collect();

        let order: Vec<CellId> = per_face.into_iter().flatten().collect();
        debug!("refined to {} leaf cells", order.len());

        // Balance: bound edge-adjacent leaves to one level of depth
        // difference so emission can close every seam with one midpoint.
        let mut leaves = LeafSet::new();
        for &cell in &order {
            leaves.insert(cell);
        }
        let splits = balance(&mut leaves, &order, |cell| self.split_leaf(cell));
        debug!(
            "balance pass split {} coarse cells ({} leaves)",
            splits,
            leaves.len()
        );

        // Emit in canonical order: face, then depth, then row-major. The
        // sort makes the output independent of set iteration order and of
        // whether the faces ran in parallel.
        let mut final_leaves: Vec<CellId> = leaves.iter().collect();
        final_leaves.sort_unstable();

        let groups: Vec<&[CellId]> = Face::ALL
            .iter()
            .map(|&face| {
                let start = final_leaves.partition_point(|c| c.face < face);
                let end = final_leaves.partition_point(|c| c.face <= face);
                &final_leaves[start..end]
            })
            .collect();

        #[cfg(feature = "parallel")]
        let meshes: Vec<Mesh> = groups
            .par_iter()
            .map(|cells| self.emit_cells(cells, &leaves))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let meshes: Vec<Mesh> = groups
            .iter()
            .map(|cells| self.emit_cells(cells, &leaves))
            .collect();

        let mut mesh = Mesh::with_capacity(meshes.iter().map(Mesh::triangle_count).sum());
        for mut part in meshes {
            mesh.append(&mut part);
        }
        debug!("emitted {} triangles", mesh.triangle_count());
        mesh
    }

    /// Displace a unit direction by the sampled elevation
    fn displaced(&self, dir: DVec3) -> DVec3 {
        let lat = dir.y.clamp(-1.0, 1.0).asin();
        let lon = dir.z.atan2(dir.x);
        let elevation = self.field.elevation_meters(lon, lat);
        let radius =
            self.params.scale * (self.params.mean_radius + self.params.exaggeration * elevation);
        dir * radius
    }

    /// The displaced vertex at a face parameter point
    fn vertex(&self, face: Face, u: f64, v: f64) -> DVec3 {
        self.displaced(direction(face, u, v))
    }

    /// Geometric error of a cell in real-world meters
    ///
    /// Distance between the cell center's actual displaced position and the
    /// position predicted by interpolating the four already-displaced
    /// corners (at the center, bilinear interpolation is their average).
    /// Output-space distance is divided by `scale` to compare against the
    /// tolerance in meters.
    fn cell_error(&self, cell: CellId) -> f64 {
        let (u0, v0, u1, v1) = cell.uv_bounds();
        let p00 = self.vertex(cell.face, u0, v0);
        let p10 = self.vertex(cell.face, u1, v0);
        let p01 = self.vertex(cell.face, u0, v1);
        let p11 = self.vertex(cell.face, u1, v1);
        let interpolated = (p00 + p10 + p01 + p11) * 0.25;

        let actual = self.vertex(cell.face, (u0 + u1) * 0.5, (v0 + v1) * 0.5);
        (actual - interpolated).length() / self.params.scale
    }

    /// The subdivision decision for one cell
    fn should_split(&self, cell: CellId) -> bool {
        if cell.depth < self.params.min_depth {
            return true;
        }
        cell.depth < self.params.max_depth && self.cell_error(cell) > self.params.tolerance
    }

    /// Depth-first refinement of one face, collecting leaves in traversal
    /// order
    fn refine_face(&self, face: Face) -> Vec<CellId> {
        let mut leaves = Vec::new();
        self.refine_into(CellId::root(face), &mut leaves);
        leaves
    }

    fn refine_into(&self, cell: CellId, leaves: &mut Vec<CellId>) {
        if self.should_split(cell) {
            for child in cell.children() {
                self.refine_into(child, leaves);
            }
        } else {
            leaves.push(cell);
        }
    }

    /// Split a leaf during balancing, re-applying the refinement predicate
    /// to its children so the error bound holds for every leaf that
    /// replaces it
    fn split_leaf(&self, cell: CellId) -> Vec<CellId> {
        let mut leaves = Vec::new();
        for child in cell.children() {
            self.refine_into(child, &mut leaves);
        }
        leaves
    }

    fn emit_cells(&self, cells: &[CellId], leaves: &LeafSet) -> Mesh {
        let mut mesh = Mesh::with_capacity(cells.len() * 2);
        for &cell in cells {
            self.emit_cell(cell, leaves, &mut mesh);
        }
        mesh
    }

    /// Emit one leaf cell
    ///
    /// A leaf with no finer edge-neighbor emits two triangles along the
    /// fixed corner0-corner2 diagonal. Where a neighbor is one level deeper
    /// its edge midpoint already exists on the finer side; the leaf then
    /// emits a fan around its displaced center that includes each such
    /// midpoint, closing the T-junction (the midpoint parameters are the
    /// same dyadic values the finer cells use, so the positions match
    /// exactly).
    fn emit_cell(&self, cell: CellId, leaves: &LeafSet, mesh: &mut Mesh) {
        let face = cell.face;
        let (u0, v0, u1, v1) = cell.uv_bounds();
        let um = (u0 + u1) * 0.5;
        let vm = (v0 + v1) * 0.5;

        let p00 = self.vertex(face, u0, v0);
        let p10 = self.vertex(face, u1, v0);
        let p11 = self.vertex(face, u1, v1);
        let p01 = self.vertex(face, u0, v1);

        let finer_south = leaves.neighbor_is_finer(cell, FaceEdge::South);
        let finer_east = leaves.neighbor_is_finer(cell, FaceEdge::East);
        let finer_north = leaves.neighbor_is_finer(cell, FaceEdge::North);
        let finer_west = leaves.neighbor_is_finer(cell, FaceEdge::West);

        if !(finer_south || finer_east || finer_north || finer_west) {
            push_triangle(mesh, p00, p10, p11);
            push_triangle(mesh, p00, p11, p01);
            return;
        }

        // Perimeter in counter-clockwise order seen from outside, with the
        // midpoints of refined edges spliced in.
        let mut ring = Vec::with_capacity(8);
        ring.push(p00);
        if finer_south {
            ring.push(self.vertex(face, um, v0));
        }
        ring.push(p10);
        if finer_east {
            ring.push(self.vertex(face, u1, vm));
        }
        ring.push(p11);
        if finer_north {
            ring.push(self.vertex(face, um, v1));
        }
        ring.push(p01);
        if finer_west {
            ring.push(self.vertex(face, u0, vm));
        }

        let center = self.vertex(face, um, vm);
        for i in 0..ring.len() {
            push_triangle(mesh, center, ring[i], ring[(i + 1) % ring.len()]);
        }
    }
}

/// Append a triangle unless it is zero-area
fn push_triangle(mesh: &mut Mesh, a: DVec3, b: DVec3, c: DVec3) {
    let triangle = Triangle::new(a, b, c);
    if !triangle.is_degenerate() {
        mesh.push(triangle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SphereParametersBuilder;
    use crate::error::GlobeError;
    use std::collections::HashMap;

    /// A field with zero relief everywhere
    fn flat_field() -> HeightField {
        HeightField::from_samples(8, 4, vec![0.0; 32], 0.0, 0.0).unwrap()
    }

    /// A field that is flat except for a raised plateau in one region,
    /// giving the error metric a sharp discontinuity to chase
    fn plateau_field() -> HeightField {
        let (w, h) = (64, 32);
        let samples = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                if (10..16).contains(&x) && (12..18).contains(&y) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        HeightField::from_samples(w, h, samples, 0.0, 0.3).unwrap()
    }

    fn unit_sphere_params(min_depth: u32, max_depth: u32) -> SphereParameters {
        SphereParametersBuilder::new()
            .depth_range(min_depth, max_depth)
            .build()
            .unwrap()
    }

    /// Map of every undirected edge to its occurrence count, with vertex
    /// positions quantized to tolerate last-ulp drift across face seams
    fn edge_counts(mesh: &Mesh) -> HashMap<((i64, i64, i64), (i64, i64, i64)), usize> {
        let key = |p: DVec3| {
            (
                (p.x * 1e9).round() as i64,
                (p.y * 1e9).round() as i64,
                (p.z * 1e9).round() as i64,
            )
        };
        let mut counts = HashMap::new();
        for tri in mesh.triangles() {
            let (a, b, c) = (key(tri.a), key(tri.b), key(tri.c));
            for (p, q) in [(a, b), (b, c), (c, a)] {
                let edge = if p <= q { (p, q) } else { (q, p) };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_invalid_parameters_rejected_before_traversal() {
        let field = flat_field();
        let mut params = unit_sphere_params(2, 2);
        params.tolerance = -1.0;
        assert!(matches!(
            triangulate(&field, &params),
            Err(GlobeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_flat_sphere_at_fixed_depth_has_192_triangles() {
        let field = flat_field();
        let params = unit_sphere_params(2, 2);
        let mesh = triangulate(&field, &params).unwrap();

        assert_eq!(mesh.triangle_count(), 6 * 16 * 2);
        for tri in mesh.triangles() {
            for v in [tri.a, tri.b, tri.c] {
                assert!(
                    (v.length() - 1.0).abs() < 1e-12,
                    "vertex off the unit sphere: {:?}",
                    v
                );
            }
        }
    }

    #[test]
    fn test_determinism() {
        let field = plateau_field();
        let params = SphereParametersBuilder::new()
            .depth_range(2, 5)
            .tolerance(0.004)
            .unwrap()
            .build()
            .unwrap();

        let first = triangulate(&field, &params).unwrap();
        let second = triangulate(&field, &params).unwrap();
        assert_eq!(
            first, second,
            "two runs over the same inputs must produce identical sequences"
        );
    }

    #[test]
    fn test_depth_bounds_respected() {
        let triangulator = Triangulator {
            field: &plateau_field(),
            params: &SphereParametersBuilder::new()
                .depth_range(2, 4)
                .tolerance(0.004)
                .unwrap()
                .build()
                .unwrap(),
        };
        for face in Face::ALL {
            for leaf in triangulator.refine_face(face) {
                assert!(leaf.depth >= 2, "leaf above the subdivision floor");
                assert!(leaf.depth <= 4, "leaf below the subdivision ceiling");
            }
        }
    }

    #[test]
    fn test_error_bound_on_interior_leaves() {
        // Every leaf that stopped before the ceiling must satisfy the
        // tolerance; only ceiling leaves may exceed it.
        let params = SphereParametersBuilder::new()
            .depth_range(1, 5)
            .tolerance(0.005)
            .unwrap()
            .build()
            .unwrap();
        let field = plateau_field();
        let triangulator = Triangulator {
            field: &field,
            params: &params,
        };
        let mut interior = 0;
        for face in Face::ALL {
            for leaf in triangulator.refine_face(face) {
                if leaf.depth < params.max_depth {
                    interior += 1;
                    let error = triangulator.cell_error(leaf);
                    assert!(
                        error <= params.tolerance,
                        "leaf at depth {} has error {} > {}",
                        leaf.depth,
                        error,
                        params.tolerance
                    );
                }
            }
        }
        assert!(interior > 0, "test needs some leaves under the ceiling");
    }

    #[test]
    fn test_outward_winding() {
        let field = plateau_field();
        let params = SphereParametersBuilder::new()
            .depth_range(2, 4)
            .tolerance(0.005)
            .unwrap()
            .build()
            .unwrap();
        let mesh = triangulate(&field, &params).unwrap();
        for tri in mesh.triangles() {
            let outward = tri.normal_direction().dot(tri.centroid());
            assert!(
                outward > 0.0,
                "triangle winds inward: centroid {:?}",
                tri.centroid()
            );
        }
    }

    #[test]
    fn test_watertight_at_uniform_depth() {
        let field = flat_field();
        let params = unit_sphere_params(3, 3);
        let mesh = triangulate(&field, &params).unwrap();

        for (edge, count) in edge_counts(&mesh) {
            assert_eq!(
                count, 2,
                "edge {:?} shared by {} triangles, expected 2",
                edge, count
            );
        }
    }

    #[test]
    fn test_watertight_across_depth_transitions() {
        // The plateau forces refinement to the ceiling around its rim while
        // the rest of the sphere stays coarse, so this exercises both the
        // balance pass and the stitched fans.
        let field = plateau_field();
        let params = SphereParametersBuilder::new()
            .depth_range(2, 5)
            .tolerance(0.004)
            .unwrap()
            .build()
            .unwrap();
        let mesh = triangulate(&field, &params).unwrap();

        let counts = edge_counts(&mesh);
        let depths: std::collections::HashSet<usize> = counts.values().copied().collect();
        assert_eq!(
            depths,
            std::collections::HashSet::from([2]),
            "every edge must be shared by exactly two triangles"
        );
    }

    #[test]
    fn test_adaptive_refinement_concentrates_triangles() {
        // The same field triangulated with a loose floor must spend its
        // extra triangles near the plateau, not uniformly.
        let field = plateau_field();
        let adaptive = triangulate(
            &field,
            &SphereParametersBuilder::new()
                .depth_range(2, 5)
                .tolerance(0.004)
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        let uniform_coarse = triangulate(&field, &unit_sphere_params(4, 4)).unwrap();
        let uniform_fine = triangulate(&field, &unit_sphere_params(5, 5)).unwrap();

        assert!(adaptive.triangle_count() > uniform_coarse.triangle_count() / 4);
        assert!(
            adaptive.triangle_count() < uniform_fine.triangle_count(),
            "adaptive output should undercut uniform max-depth subdivision"
        );
    }

    #[test]
    fn test_displacement_follows_elevation() {
        // A uniform 1.0 field over [0, 100] with exaggeration 2 must place
        // every vertex at radius mean + 200.
        let field = HeightField::from_samples(8, 4, vec![1.0; 32], 0.0, 100.0).unwrap();
        let params = SphereParametersBuilder::new()
            .mean_radius(1000.0)
            .unwrap()
            .elevation_range(0.0, 100.0)
            .exaggeration(2.0)
            .unwrap()
            .depth_range(2, 2)
            .build()
            .unwrap();
        let mesh = triangulate(&field, &params).unwrap();
        for tri in mesh.triangles() {
            for v in [tri.a, tri.b, tri.c] {
                assert!(
                    (v.length() - 1200.0).abs() < 1e-6,
                    "vertex at radius {}",
                    v.length()
                );
            }
        }
    }

    #[test]
    fn test_scale_is_uniform() {
        let field = flat_field();
        let unscaled = triangulate(&field, &unit_sphere_params(2, 2)).unwrap();
        let scaled = triangulate(
            &field,
            &SphereParametersBuilder::new()
                .depth_range(2, 2)
                .scale(2.5)
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(unscaled.triangle_count(), scaled.triangle_count());
        for (a, b) in unscaled.triangles().iter().zip(scaled.triangles()) {
            assert!((a.a * 2.5 - b.a).length() < 1e-12);
            assert!((a.b * 2.5 - b.b).length() < 1e-12);
            assert!((a.c * 2.5 - b.c).length() < 1e-12);
        }
    }
}
