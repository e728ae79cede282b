//! Cube-to-sphere projection
//!
//! The base polyhedron is a cube: six faces, each parameterized by
//! `(u, v)` in `[0, 1]²` and independently subdividable. Face coordinates
//! are warped through `tan(s * π/4)` before normalization, which spreads
//! triangle density far more evenly over the sphere than naive
//! normalization (which clusters cells at face corners).
//!
//! Everything here is a pure function of its inputs. Identical inputs yield
//! bit-identical outputs, which is what lets adjacent recursion subtrees
//! agree on shared edge vertices without ever communicating.

use std::f64::consts::FRAC_PI_4;

use glam::DVec3;

/// The six faces of the projection cube
///
/// Each face's outward normal points along the named axis. The `u` and `v`
/// axes are chosen so that `u_axis × v_axis = normal`, making `(u, v)` a
/// right-handed parameterization seen from outside the cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    /// +X face
    PosX = 0,
    /// -X face
    NegX = 1,
    /// +Y face (north polar cap)
    PosY = 2,
    /// -Y face (south polar cap)
    NegY = 3,
    /// +Z face
    PosZ = 4,
    /// -Z face
    NegZ = 5,
}

impl Face {
    /// All six faces in canonical traversal order.
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Outward-pointing unit normal for this face
    #[must_use]
    pub fn normal(self) -> DVec3 {
        match self {
            Face::PosX => DVec3::X,
            Face::NegX => DVec3::NEG_X,
            Face::PosY => DVec3::Y,
            Face::NegY => DVec3::NEG_Y,
            Face::PosZ => DVec3::Z,
            Face::NegZ => DVec3::NEG_Z,
        }
    }

    /// Direction of increasing `u` on this face
    #[must_use]
    pub fn u_axis(self) -> DVec3 {
        match self {
            Face::PosX => DVec3::NEG_Z,
            Face::NegX => DVec3::Z,
            Face::PosY => DVec3::X,
            Face::NegY => DVec3::X,
            Face::PosZ => DVec3::X,
            Face::NegZ => DVec3::NEG_X,
        }
    }

    /// Direction of increasing `v` on this face
    #[must_use]
    pub fn v_axis(self) -> DVec3 {
        match self {
            Face::PosX => DVec3::Y,
            Face::NegX => DVec3::Y,
            Face::PosY => DVec3::NEG_Z,
            Face::NegY => DVec3::Z,
            Face::PosZ => DVec3::Y,
            Face::NegZ => DVec3::Y,
        }
    }
}

/// The four edges of a face in `(u, v)` space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceEdge {
    /// `u = 0`
    West,
    /// `u = 1`
    East,
    /// `v = 0`
    South,
    /// `v = 1`
    North,
}

impl FaceEdge {
    /// All four edges.
    pub const ALL: [FaceEdge; 4] = [
        FaceEdge::West,
        FaceEdge::East,
        FaceEdge::South,
        FaceEdge::North,
    ];
}

/// How one face's edge attaches to the neighboring face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeLink {
    /// The face on the other side of the edge
    pub face: Face,
    /// Which of the neighbor's edges is the shared one
    pub edge: FaceEdge,
    /// Whether the coordinate along the shared edge runs the opposite way
    /// on the neighbor face
    pub reversed: bool,
}

/// The cube's edge topology: which face lies across each edge of each face
///
/// 6 faces x 4 edges = 24 entries covering the cube's 12 physical edges
/// twice, once from each side.
#[must_use]
pub fn edge_link(face: Face, edge: FaceEdge) -> EdgeLink {
    use Face::*;
    use FaceEdge::*;

    let (face, edge, reversed) = match (face, edge) {
        (PosX, North) => (PosY, East, false),
        (PosX, South) => (NegY, East, true),
        (PosX, East) => (NegZ, West, false),
        (PosX, West) => (PosZ, East, false),

        (NegX, North) => (PosY, West, true),
        (NegX, South) => (NegY, West, false),
        (NegX, East) => (PosZ, West, false),
        (NegX, West) => (NegZ, East, false),

        (PosY, North) => (NegZ, North, true),
        (PosY, South) => (PosZ, North, false),
        (PosY, East) => (PosX, North, false),
        (PosY, West) => (NegX, North, true),

        (NegY, North) => (PosZ, South, false),
        (NegY, South) => (NegZ, South, true),
        (NegY, East) => (PosX, South, true),
        (NegY, West) => (NegX, South, false),

        (PosZ, North) => (PosY, South, false),
        (PosZ, South) => (NegY, North, false),
        (PosZ, East) => (PosX, West, false),
        (PosZ, West) => (NegX, East, false),

        (NegZ, North) => (PosY, North, true),
        (NegZ, South) => (NegY, South, true),
        (NegZ, East) => (NegX, West, false),
        (NegZ, West) => (PosX, East, false),
    };
    EdgeLink {
        face,
        edge,
        reversed,
    }
}

/// Remap a centered face coordinate in `[-1, 1]` through the tangent warp
///
/// Two details keep shared edges bit-exact from both adjacent faces:
/// `tan(π/4)` is mathematically 1 but not in f64, so `±1` passes through
/// unchanged, and the warp is evaluated on `|c|` with the sign reapplied,
/// so `warp(-c)` is exactly `-warp(c)` regardless of the platform's `tan`.
#[inline]
fn warp(c: f64) -> f64 {
    let a = c.abs();
    let w = if a == 1.0 { 1.0 } else { (a * FRAC_PI_4).tan() };
    w.copysign(c)
}

/// Project a face coordinate onto the unit sphere
///
/// Pure and deterministic: the same `(face, u, v)` always yields the same
/// unit direction, bit for bit, and points on a shared face boundary yield
/// the same direction from either face's parameterization.
///
/// # Example
///
/// ```rust
/// use relief_globe::projector::{direction, Face};
///
/// let d = direction(Face::PosY, 0.5, 0.5);
/// assert!((d - glam::DVec3::Y).length() < 1e-12);
/// ```
#[must_use]
pub fn direction(face: Face, u: f64, v: f64) -> DVec3 {
    let s = warp(2.0 * u - 1.0);
    let t = warp(2.0 * v - 1.0);
    (face.normal() + s * face.u_axis() + t * face.v_axis()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_face_bases_are_right_handed() {
        for face in Face::ALL {
            let cross = face.u_axis().cross(face.v_axis());
            assert!(
                (cross - face.normal()).length() < EPSILON,
                "u_axis x v_axis != normal for {:?}",
                face
            );
        }
    }

    #[test]
    fn test_face_center_maps_to_normal() {
        for face in Face::ALL {
            let d = direction(face, 0.5, 0.5);
            assert!(
                (d - face.normal()).length() < EPSILON,
                "face center of {:?} did not map to its normal: {:?}",
                face,
                d
            );
        }
    }

    #[test]
    fn test_all_directions_are_unit_length() {
        for face in Face::ALL {
            for ui in 0..=8 {
                for vi in 0..=8 {
                    let d = direction(face, ui as f64 / 8.0, vi as f64 / 8.0);
                    assert!(
                        (d.length() - 1.0).abs() < EPSILON,
                        "non-unit direction on {:?} at ({}, {})",
                        face,
                        ui,
                        vi
                    );
                }
            }
        }
    }

    #[test]
    fn test_warp_spreads_density() {
        // Without the warp, equal parameter steps bunch up near corners;
        // with it, the arc from center to mid-edge and from mid-edge to the
        // edge should be close to equal.
        let a = direction(Face::PosZ, 0.5, 0.5);
        let b = direction(Face::PosZ, 0.75, 0.5);
        let c = direction(Face::PosZ, 1.0, 0.5);
        let arc1 = a.dot(b).clamp(-1.0, 1.0).acos();
        let arc2 = b.dot(c).clamp(-1.0, 1.0).acos();
        assert!(
            (arc1 - arc2).abs() / arc1 < 0.01,
            "warped arcs differ: {} vs {}",
            arc1,
            arc2
        );
    }

    #[test]
    fn test_edge_links_never_self_reference() {
        for face in Face::ALL {
            for edge in FaceEdge::ALL {
                assert_ne!(edge_link(face, edge).face, face);
            }
        }
    }

    #[test]
    fn test_edge_links_are_symmetric() {
        for face in Face::ALL {
            for edge in FaceEdge::ALL {
                let link = edge_link(face, edge);
                let back = edge_link(link.face, link.edge);
                assert_eq!(
                    back.face, face,
                    "asymmetric link: {:?}/{:?} -> {:?}/{:?} -> {:?}",
                    face, edge, link.face, link.edge, back.face
                );
                assert_eq!(back.edge, edge);
                assert_eq!(
                    back.reversed, link.reversed,
                    "reversal must agree from both sides of {:?}/{:?}",
                    face, edge
                );
            }
        }
    }

    #[test]
    fn test_each_face_touches_four_distinct_faces() {
        for face in Face::ALL {
            let mut neighbors: Vec<Face> = FaceEdge::ALL
                .iter()
                .map(|&e| edge_link(face, e).face)
                .collect();
            neighbors.sort();
            neighbors.dedup();
            assert_eq!(neighbors.len(), 4, "{:?} should touch 4 faces", face);
        }
    }

    /// Parameter point on a given edge, `t` running along the edge
    fn edge_point(edge: FaceEdge, t: f64) -> (f64, f64) {
        match edge {
            FaceEdge::West => (0.0, t),
            FaceEdge::East => (1.0, t),
            FaceEdge::South => (t, 0.0),
            FaceEdge::North => (t, 1.0),
        }
    }

    #[test]
    fn test_linked_edges_produce_identical_directions() {
        // The load-bearing determinism property: a point on a shared cube
        // edge must project to the same direction from both adjacent faces,
        // bit for bit.
        for face in Face::ALL {
            for edge in FaceEdge::ALL {
                let link = edge_link(face, edge);
                for i in 0..=16 {
                    let t = i as f64 / 16.0;
                    let nt = if link.reversed { 1.0 - t } else { t };
                    let (u, v) = edge_point(edge, t);
                    let (nu, nv) = edge_point(link.edge, nt);
                    let a = direction(face, u, v);
                    let b = direction(link.face, nu, nv);
                    assert_eq!(
                        (a.x.to_bits(), a.y.to_bits(), a.z.to_bits()),
                        (b.x.to_bits(), b.y.to_bits(), b.z.to_bits()),
                        "edge mismatch across {:?}/{:?} at t={}",
                        face,
                        edge,
                        t
                    );
                }
            }
        }
    }
}
