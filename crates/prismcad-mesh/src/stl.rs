//! STL reading and writing.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use stl_io::{Normal, Triangle, Vertex};

use crate::{MeshError, TriangleMesh};

/// Write a mesh as binary STL.
///
/// Facet normals are recomputed from the triangle winding.
pub fn write_stl<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<(), MeshError> {
    let triangles: Vec<Triangle> = (0..mesh.num_triangles())
        .map(|t| {
            let [a, b, c] = mesh.triangle(t);
            let n = (b - a).cross(&(c - a));
            let len = n.norm();
            let n = if len > 1e-12 { n / len } else { n };
            let v = |p: prismcad_math::Point3| Vertex::new([p.x as f32, p.y as f32, p.z as f32]);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [v(a), v(b), v(c)],
            }
        })
        .collect();
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Write a mesh to a binary STL file.
pub fn export_stl(mesh: &TriangleMesh, path: &Path) -> Result<(), MeshError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_stl(mesh, &mut out)?;
    out.flush()?;
    tracing::debug!(
        "wrote {} triangles to {}",
        mesh.num_triangles(),
        path.display()
    );
    Ok(())
}

/// Read an ASCII or binary STL stream.
///
/// Vertices shared by index in the file stay shared in the mesh; per-vertex
/// normals are left zero.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<TriangleMesh, MeshError> {
    let indexed = stl_io::read_stl(reader)?;
    let mut mesh = TriangleMesh::new();
    for v in &indexed.vertices {
        mesh.vertices.extend_from_slice(&[v[0], v[1], v[2]]);
        mesh.normals.extend_from_slice(&[0.0; 3]);
    }
    let n_verts = indexed.vertices.len();
    for (t, face) in indexed.faces.iter().enumerate() {
        for &vertex in &face.vertices {
            if vertex >= n_verts {
                return Err(MeshError::InvalidIndex { triangle: t, vertex });
            }
            mesh.indices.push(vertex as u32);
        }
    }
    Ok(mesh)
}

/// Read an STL file.
pub fn import_stl(path: &Path) -> Result<TriangleMesh, MeshError> {
    let mut file = File::open(path)?;
    let mesh = read_stl(&mut file)?;
    tracing::debug!(
        "read {} triangles from {}",
        mesh.num_triangles(),
        path.display()
    );
    Ok(mesh)
}
