//! Kernel implementation on top of the prismcad crates.

use std::path::Path;

use dxf::Drawing;
use prismcad_brep::{Shape, Solid};
use prismcad_math::{Point2, Vec3};
use prismcad_mesh::{export_stl, import_stl, tessellate_shape, TriangleMesh};
use prismcad_sketch::{sort_into_wires, ClosedLoop, Edge, EdgeSet, Face, Wire};
use prismcad_step::{read_step, write_step};
use tracing::{debug, info};

use crate::{ConvertSettings, GeometryKernel, ImportSettings, Result, Session};

/// The built-in geometry kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeKernel {
    /// Factor applied to drawing coordinates on import.
    pub unit_scale: f64,
    /// Chords per full turn for arcs in face boundaries.
    pub arc_segments: u32,
    /// Coincidence tolerance for vertices and degenerate edges.
    pub tolerance: f64,
}

impl NativeKernel {
    /// Kernel configured from conversion settings.
    pub fn new(settings: &ConvertSettings) -> Self {
        Self {
            unit_scale: settings.import.unit_scale,
            arc_segments: settings.import.arc_segments,
            tolerance: settings.wire.tolerance,
        }
    }
}

impl Default for NativeKernel {
    fn default() -> Self {
        Self::new(&ConvertSettings::default())
    }
}

impl GeometryKernel for NativeKernel {
    fn load_planar_drawing(&self, session: &mut Session, path: &Path) -> Result<EdgeSet> {
        let drawing = Drawing::load_file(path)?;
        debug!(
            units = ?drawing.header.default_drawing_units,
            "loaded drawing {}",
            path.display()
        );
        let import = ImportSettings {
            unit_scale: self.unit_scale,
            arc_segments: self.arc_segments,
        };
        let (edges, skipped) = crate::edges_from_drawing(&drawing, &import, self.tolerance);
        info!(
            session = session.name(),
            edges = edges.len(),
            skipped,
            "imported planar edges"
        );
        if let Some(stem) = path.file_stem() {
            session.add_object(stem.to_string_lossy());
        }
        Ok(edges)
    }

    fn sort_into_wires(&self, edges: &EdgeSet, tolerance: f64) -> Vec<Vec<Edge>> {
        sort_into_wires(edges.edges(), tolerance)
    }

    fn build_wire(&self, edges: Vec<Edge>) -> Wire {
        Wire::new(edges)
    }

    fn build_face(&self, closed: &ClosedLoop) -> Result<Face> {
        Ok(Face::from_loop(closed, self.arc_segments, self.tolerance)?)
    }

    fn point_inside(&self, face: &Face, point: Point2, tolerance: f64, strict: bool) -> bool {
        face.contains_point(&point, tolerance, strict)
    }

    fn extrude(&self, face: &Face, height: Vec3) -> Result<Solid> {
        Ok(prismcad_sketch::extrude(face, height)?)
    }

    fn export_step(&self, session: &mut Session, shape: &Shape, path: &Path) -> Result<()> {
        write_step(shape, path)?;
        session.add_object(path.display().to_string());
        Ok(())
    }

    fn import_step(&self, session: &mut Session, path: &Path) -> Result<Shape> {
        let shape = read_step(path)?;
        for solid in shape.solids() {
            session.add_object(solid.name.clone());
        }
        Ok(shape)
    }

    fn tessellate_to_mesh(&self, shape: &Shape) -> TriangleMesh {
        tessellate_shape(shape)
    }

    fn export_mesh(&self, mesh: &TriangleMesh, path: &Path) -> Result<()> {
        Ok(export_stl(mesh, path)?)
    }

    fn import_mesh(&self, path: &Path) -> Result<TriangleMesh> {
        Ok(import_stl(path)?)
    }

    fn mesh_to_solid(&self, mesh: &TriangleMesh, tolerance: f64) -> Result<Shape> {
        let solid = prismcad_mesh::mesh_to_solid(mesh, tolerance)?;
        Ok(Shape::Solid(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelError;
    use prismcad_sketch::WireSettings;

    fn square(size: f64) -> EdgeSet {
        let p = [
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ];
        (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_face_and_containment() {
        let kernel = NativeKernel::default();
        let chains = kernel.sort_into_wires(&square(10.0), 1e-6);
        assert_eq!(chains.len(), 1);
        let closed = kernel
            .build_wire(chains[0].clone())
            .close(0, &WireSettings::default())
            .unwrap();
        let face = kernel.build_face(&closed).unwrap();

        assert!(kernel.point_inside(&face, Point2::new(5.0, 5.0), 0.001, true));
        assert!(!kernel.point_inside(&face, Point2::new(0.0, 5.0), 0.001, true));
        assert!(kernel.point_inside(&face, Point2::new(0.0, 5.0), 0.001, false));
    }

    #[test]
    fn test_extrude_in_plane_is_an_error() {
        let kernel = NativeKernel::default();
        let face = Face::from_points(
            0,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            1e-6,
        )
        .unwrap();
        let err = kernel.extrude(&face, Vec3::new(1.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, KernelError::Sketch(_)));
    }

    #[test]
    fn test_step_and_stl_files() {
        let kernel = NativeKernel::default();
        let dir = tempfile::tempdir().unwrap();
        let face = Face::from_points(
            0,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
            1e-6,
        )
        .unwrap();
        let solid = kernel.extrude(&face, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let shape = Shape::Solid(solid);

        let mut session = Session::new(Session::STEP_TO_STL);
        let step = dir.path().join("block.step");
        kernel.export_step(&mut session, &shape, &step).unwrap();
        let back = kernel.import_step(&mut session, &step).unwrap();
        assert_eq!(back.num_faces(), 6);
        assert!(session.objects().iter().any(|o| o == "SolidFrom_Wire0"));

        let mesh = kernel.tessellate_to_mesh(&back);
        assert_eq!(mesh.num_triangles(), 12);
        let stl = dir.path().join("block.stl");
        kernel.export_mesh(&mesh, &stl).unwrap();
        let read = kernel.import_mesh(&stl).unwrap();
        assert_eq!(read.num_triangles(), 12);

        let rebuilt = kernel.mesh_to_solid(&read, 0.1).unwrap();
        assert_eq!(rebuilt.solids()[0].name, "SolidFromMesh");
    }

    #[test]
    fn test_missing_drawing() {
        let kernel = NativeKernel::default();
        let mut session = Session::new(Session::DXF_TO_STEP);
        let err = kernel
            .load_planar_drawing(&mut session, Path::new("/nonexistent/part.dxf"))
            .unwrap_err();
        assert!(matches!(err, KernelError::Dxf(_)));
    }
}
