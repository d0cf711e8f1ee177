//! Indexed triangle mesh for feature output.

use nalgebra::Point3;

/// A triangle mesh with indexed vertices, in meters.
///
/// Faces are counter-clockwise when viewed from the side they face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl TerrainMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Whether the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Append another mesh, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
    }

    /// Lowest and highest vertex z, or `None` for an empty mesh.
    #[must_use]
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.vertices.iter().fold(None, |acc, v| match acc {
            None => Some((v.z, v.z)),
            Some((lo, hi)) => Some((lo.min(v.z), hi.max(v.z))),
        })
    }

    /// Sum of triangle areas.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let a = self.vertices[f[0] as usize];
                let b = self.vertices[f[1] as usize];
                let c = self.vertices[f[2] as usize];
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }
}
