//! The geometry kernel seam and the per-run session.

use std::path::Path;

use prismcad_brep::{Shape, Solid};
use prismcad_math::{Point2, Vec3};
use prismcad_mesh::TriangleMesh;
use prismcad_sketch::{ClosedLoop, Edge, EdgeSet, Face, Wire};

use crate::Result;

/// Per-run document handle.
///
/// A session is opened for one conversion and records the names of the
/// objects the kernel adds to it, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    name: String,
    objects: Vec<String>,
}

impl Session {
    /// Session name used by the DXF to STEP pipeline.
    pub const DXF_TO_STEP: &'static str = "DXFtoSTEP";
    /// Session name used by the STEP to STL pipeline.
    pub const STEP_TO_STL: &'static str = "STEPtoSTL";
    /// Session name used by the STL to STEP pipeline.
    pub const STL_TO_STEP: &'static str = "STLtoSTEP";

    /// Open an empty session.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Session name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a named object.
    pub fn add_object(&mut self, name: impl Into<String>) {
        self.objects.push(name.into());
    }

    /// Names of the recorded objects.
    pub fn objects(&self) -> &[String] {
        &self.objects
    }
}

/// Geometry operations the conversion pipelines depend on.
///
/// The reconstruction logic never touches files or shapes directly; it goes
/// through this trait so another kernel can stand in for [`NativeKernel`].
///
/// [`NativeKernel`]: crate::NativeKernel
pub trait GeometryKernel {
    /// Load the 2D edges of a drawing file, projected onto the XY plane.
    fn load_planar_drawing(&self, session: &mut Session, path: &Path) -> Result<EdgeSet>;

    /// Group edges into connected chains.
    fn sort_into_wires(&self, edges: &EdgeSet, tolerance: f64) -> Vec<Vec<Edge>>;

    /// Turn an ordered chain into a wire.
    fn build_wire(&self, edges: Vec<Edge>) -> Wire;

    /// Fill a closed loop with a planar face.
    fn build_face(&self, closed: &ClosedLoop) -> Result<Face>;

    /// Point-in-face test; with `strict`, points within `tolerance` of the
    /// boundary are outside.
    fn point_inside(&self, face: &Face, point: Point2, tolerance: f64, strict: bool) -> bool;

    /// Sweep a face along `height` into a solid.
    fn extrude(&self, face: &Face, height: Vec3) -> Result<Solid>;

    /// Write a shape as STEP.
    fn export_step(&self, session: &mut Session, shape: &Shape, path: &Path) -> Result<()>;

    /// Read the solids of a STEP file.
    fn import_step(&self, session: &mut Session, path: &Path) -> Result<Shape>;

    /// Triangulate every face of a shape.
    fn tessellate_to_mesh(&self, shape: &Shape) -> TriangleMesh;

    /// Write a mesh as STL.
    fn export_mesh(&self, mesh: &TriangleMesh, path: &Path) -> Result<()>;

    /// Read an STL file.
    fn import_mesh(&self, path: &Path) -> Result<TriangleMesh>;

    /// Rebuild a faceted solid from a mesh, welding vertices within `tolerance`.
    fn mesh_to_solid(&self, mesh: &TriangleMesh, tolerance: f64) -> Result<Shape>;
}
