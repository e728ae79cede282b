//! Triangle mesh types
//!
//! A mesh here is a plain ordered triangle list, matching both the STL
//! output layout and the append-only way the triangulator produces geometry.

mod stl;

pub use stl::{load_stl, read_stl, save_stl, write_stl};

use glam::DVec3;

/// One triangle with an explicit winding order
///
/// Vertex order defines the outward-facing side: the face normal is the
/// normalized `(b - a) × (c - a)`. Vertices are positions only; two vertices
/// from different subdivision paths that land on the same coordinates
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub a: DVec3,
    /// Second vertex
    pub b: DVec3,
    /// Third vertex
    pub c: DVec3,
}

impl Triangle {
    /// Create a triangle from three vertices in winding order
    #[inline]
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self { a, b, c }
    }

    /// The unnormalized face normal `(b - a) × (c - a)`
    ///
    /// Its length is twice the triangle's area, so a zero vector means the
    /// vertices are collinear.
    #[inline]
    pub fn normal_direction(&self) -> DVec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    /// Whether the three vertices are (numerically) collinear
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal_direction().length_squared() == 0.0
    }

    /// The same triangle with opposite winding (first and last vertex swapped)
    #[inline]
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            a: self.c,
            b: self.b,
            c: self.a,
        }
    }

    /// Arithmetic center of the three vertices
    #[inline]
    pub fn centroid(&self) -> DVec3 {
        (self.a + self.b + self.c) / 3.0
    }
}

/// An ordered sequence of triangles
///
/// Append-only during generation, read-only afterwards. Ordering is
/// significant: it is what makes repeated runs byte-reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with reserved capacity
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Append one triangle
    #[inline]
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Append all triangles of another mesh, preserving order
    pub fn append(&mut self, other: &mut Mesh) {
        self.triangles.append(&mut other.triangles);
    }

    /// Get the number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All triangles in order
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// A copy of this mesh with every triangle's winding reversed
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            triangles: self.triangles.iter().map(Triangle::reversed).collect(),
        }
    }
}

impl FromIterator<Triangle> for Mesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self {
            triangles: iter.into_iter().collect(),
        }
    }
}
