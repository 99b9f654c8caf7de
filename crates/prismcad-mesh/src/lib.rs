#![warn(missing_docs)]

//! Triangle meshes for prismcad.
//!
//! Converts polyhedral solids into triangle meshes by projecting each planar
//! face onto its dominant axis plane and ear-clipping it, reads and writes
//! STL through `stl_io`, and rebuilds faceted solids from meshes by welding
//! nearby vertices.

mod stl;
mod tessellate;
mod weld;

pub use stl::{export_stl, import_stl, read_stl, write_stl};
pub use tessellate::{tessellate_face, tessellate_shape, tessellate_solid};
pub use weld::{mesh_to_solid, MESH_SOLID_NAME};

use prismcad_math::{Aabb3, Point3};
use thiserror::Error;

/// Errors from mesh conversion and STL I/O.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Reading or writing failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh has no usable triangles.
    #[error("mesh has no triangles")]
    Empty,

    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} refers to missing vertex {vertex}")]
    InvalidIndex {
        /// Triangle number.
        triangle: usize,
        /// Offending vertex index.
        vertex: usize,
    },
}

/// Indexed triangles in single precision, the form STL export consumes.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Positions, three floats per vertex.
    pub vertices: Vec<f32>,
    /// Vertex indices, three per triangle, counter-clockwise seen from outside.
    pub indices: Vec<u32>,
    /// Per-vertex normals, parallel to `vertices`.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Mesh with nothing in it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangle count.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex count, shared or not.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex with its normal, returning its index.
    pub fn push_vertex(&mut self, p: &Point3, normal: [f32; 3]) -> u32 {
        let index = self.num_vertices() as u32;
        self.vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.normals.extend_from_slice(&normal);
        index
    }

    /// Position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Point3 {
        let v = &self.vertices[i * 3..i * 3 + 3];
        Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    /// Corner positions of triangle `t`.
    pub fn triangle(&self, t: usize) -> [Point3; 3] {
        let idx = &self.indices[t * 3..t * 3 + 3];
        [
            self.vertex(idx[0] as usize),
            self.vertex(idx[1] as usize),
            self.vertex(idx[2] as usize),
        ]
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Aabb3 {
        let mut bb = Aabb3::empty();
        for i in 0..self.num_vertices() {
            bb.include_point(&self.vertex(i));
        }
        bb
    }

    /// Append `other`, renumbering its indices past ours.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let base = self.num_vertices() as u32;
        self.vertices.extend(&other.vertices);
        self.normals.extend(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }
}
