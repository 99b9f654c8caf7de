//! Rebuilding faceted solids from triangle meshes.

use prismcad_brep::{PolyFace, Solid};
use prismcad_math::Point3;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::{MeshError, TriangleMesh};

/// Name given to solids rebuilt from meshes.
pub const MESH_SOLID_NAME: &str = "SolidFromMesh";

type WeldPoint = GeomWithData<[f64; 3], usize>;

/// Build a faceted solid with one planar face per triangle.
///
/// Vertices closer than `tolerance` are welded to the first one seen, so
/// adjacent facets share exact corner positions. Triangles that collapse
/// after welding are dropped.
pub fn mesh_to_solid(mesh: &TriangleMesh, tolerance: f64) -> Result<Solid, MeshError> {
    if mesh.is_empty() {
        return Err(MeshError::Empty);
    }

    let mut tree: RTree<WeldPoint> = RTree::new();
    let mut welded: Vec<Point3> = Vec::new();
    let mut remap = Vec::with_capacity(mesh.num_vertices());
    let tol2 = tolerance * tolerance;
    for i in 0..mesh.num_vertices() {
        let p = mesh.vertex(i);
        let q = [p.x, p.y, p.z];
        let hit = tree.nearest_neighbor(&q).filter(|n| {
            let g = n.geom();
            let d2 = (g[0] - q[0]).powi(2) + (g[1] - q[1]).powi(2) + (g[2] - q[2]).powi(2);
            d2 <= tol2
        });
        let id = match hit {
            Some(n) => n.data,
            None => {
                tree.insert(GeomWithData::new(q, welded.len()));
                welded.push(p);
                welded.len() - 1
            }
        };
        remap.push(id);
    }

    let mut faces = Vec::with_capacity(mesh.num_triangles());
    let mut dropped = 0usize;
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [
            remap[tri[0] as usize],
            remap[tri[1] as usize],
            remap[tri[2] as usize],
        ];
        if a == b || b == c || a == c {
            dropped += 1;
            continue;
        }
        let face = PolyFace::new(vec![welded[a], welded[b], welded[c]]);
        if face.normal().is_none() {
            dropped += 1;
            continue;
        }
        faces.push(face);
    }

    if dropped > 0 {
        tracing::debug!("dropped {} degenerate triangles", dropped);
    }
    if faces.is_empty() {
        return Err(MeshError::Empty);
    }
    tracing::debug!(
        "welded {} vertices into {}, {} facets",
        mesh.num_vertices(),
        welded.len(),
        faces.len()
    );
    Ok(Solid::new(MESH_SOLID_NAME, faces))
}
