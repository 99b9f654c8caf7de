//! Conversion pipelines.
//!
//! [`reconstruct`] is the heart of `dxf2step`: it chains loose drawing edges
//! into wires, closes or repairs them, fills faces, counts how deeply each
//! face is nested in the others and extrudes it to a height chosen by the
//! parity of that depth. Per-entity failures never abort a run; they are
//! logged and collected as [`Diagnostic`]s.

use std::fmt;
use std::path::Path;

use prismcad_brep::{Shape, Solid};
use prismcad_math::{Transform, Vec3};
use prismcad_sketch::{
    base_plate_bounds, height_for_depth, nesting_depths, ClosedLoop, EdgeSet, Face,
    BASE_PLATE_HEIGHT_FACTOR,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{ConvertSettings, GeometryKernel, KernelError, Session};

/// Name of the optional plate under the drawing.
pub const BASE_PLATE_NAME: &str = "BasePlate";

/// Name recorded for a compound of several solids.
pub const COMPOUND_NAME: &str = "FusedSolids";

/// Errors that end a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Nothing survived reconstruction; no file was written.
    #[error("no extrudable geometry found")]
    NoGeometry,

    /// A kernel operation failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Pipeline stage at which an entity was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Closing the wire.
    Wire,
    /// Filling the face.
    Face,
    /// Extruding the face.
    Extrude,
    /// Building the base plate.
    BasePlate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Wire => write!(f, "wire"),
            Stage::Face => write!(f, "face"),
            Stage::Extrude => write!(f, "extrude"),
            Stage::BasePlate => write!(f, "base-plate"),
        }
    }
}

/// A skipped entity and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Entity name, e.g. `Wire3`.
    pub entity: String,
    /// Stage that failed.
    pub stage: Stage,
    /// Failure message.
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.entity, self.stage, self.reason)
    }
}

/// Outcome of closing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopStatus {
    /// Closed as drawn.
    Closed,
    /// Closed by a synthesized segment.
    Repaired,
    /// Left open.
    Rejected,
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopStatus::Closed => write!(f, "closed"),
            LoopStatus::Repaired => write!(f, "repaired"),
            LoopStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// What happened to one wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopRecord {
    /// Discovery index.
    pub index: usize,
    /// Edge count, including a repair segment.
    pub edges: usize,
    /// Closure outcome.
    pub status: LoopStatus,
    /// Face area, when a face was filled.
    pub area: Option<f64>,
    /// Nesting depth, when a face was filled.
    pub depth: Option<usize>,
    /// Extrusion height, when a face was filled.
    pub height: Option<f64>,
}

/// Per-run summary of a reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Number of edges loaded.
    pub edges: usize,
    /// One record per wire, in discovery order.
    pub loops: Vec<LoopRecord>,
    /// Names of the solids produced, in export order.
    pub solids: Vec<String>,
    /// Skipped entities.
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    /// Number of wires with the given status.
    pub fn count(&self, status: LoopStatus) -> usize {
        self.loops.iter().filter(|l| l.status == status).count()
    }

    fn diagnose(&mut self, entity: String, stage: Stage, reason: impl fmt::Display) {
        warn!(entity = %entity, stage = %stage, "skipped: {}", reason);
        self.diagnostics.push(Diagnostic {
            entity,
            stage,
            reason: reason.to_string(),
        });
    }
}

/// Solids and report produced by [`reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Extruded solids, base plate first.
    pub solids: Vec<Solid>,
    /// What happened along the way.
    pub report: ConversionReport,
}

/// Summary of a mesh conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshReport {
    /// Solids converted.
    pub solids: usize,
    /// Planar faces on the B-rep side.
    pub faces: usize,
    /// Triangles on the mesh side.
    pub triangles: usize,
}

/// Rebuild extruded solids from loose planar edges.
///
/// Wires that cannot be closed, faces that cannot be filled and failed
/// extrusions are skipped and reported. The result may be empty.
pub fn reconstruct<K: GeometryKernel>(
    kernel: &K,
    edges: &EdgeSet,
    settings: &ConvertSettings,
) -> Reconstruction {
    let mut report = ConversionReport {
        edges: edges.len(),
        ..Default::default()
    };

    let chains = kernel.sort_into_wires(edges, settings.wire.tolerance);
    debug!("{} edges form {} wires", edges.len(), chains.len());

    let mut faces: Vec<Face> = Vec::new();
    let mut face_records: Vec<usize> = Vec::new();
    for (index, chain) in chains.into_iter().enumerate() {
        let mut record = LoopRecord {
            index,
            edges: chain.len(),
            status: LoopStatus::Rejected,
            area: None,
            depth: None,
            height: None,
        };
        match kernel.build_wire(chain).close(index, &settings.wire) {
            Ok(closed) => {
                record.edges = closed.len();
                record.status = if closed.repaired {
                    debug!("Wire{} repaired with a closing segment", index);
                    LoopStatus::Repaired
                } else {
                    LoopStatus::Closed
                };
                match kernel.build_face(&closed) {
                    Ok(face) => {
                        record.area = Some(face.area());
                        face_records.push(report.loops.len());
                        faces.push(face);
                    }
                    Err(e) => report.diagnose(format!("Face{index}"), Stage::Face, e),
                }
            }
            Err(e) => report.diagnose(format!("Wire{index}"), Stage::Wire, e),
        }
        report.loops.push(record);
    }

    let tolerance = settings.classify.tolerance;
    let depths = nesting_depths(&faces, settings.classify.sample, |face, p| {
        kernel.point_inside(face, p, tolerance, true)
    });

    let mut solids = Vec::with_capacity(faces.len() + 1);
    let base_height = settings.extrude.base_height;
    if settings.extrude.base_plate {
        if let Some(bounds) = base_plate_bounds(&faces) {
            let plate = ClosedLoop::rectangle(report.loops.len(), &bounds);
            let height = Vec3::new(0.0, 0.0, base_height * BASE_PLATE_HEIGHT_FACTOR);
            match kernel
                .build_face(&plate)
                .and_then(|face| kernel.extrude(&face, height))
            {
                Ok(mut solid) => {
                    solid.name = BASE_PLATE_NAME.to_string();
                    solids.push(solid);
                }
                Err(e) => report.diagnose(BASE_PLATE_NAME.to_string(), Stage::BasePlate, e),
            }
        }
    }

    for ((face, depth), &slot) in faces.iter().zip(&depths).zip(&face_records) {
        let height = height_for_depth(base_height, *depth);
        let record = &mut report.loops[slot];
        record.depth = Some(*depth);
        record.height = Some(height);
        match kernel.extrude(face, Vec3::new(0.0, 0.0, height)) {
            Ok(solid) => solids.push(solid),
            Err(e) => report.diagnose(
                format!("SolidFrom_Wire{}", face.loop_index),
                Stage::Extrude,
                e,
            ),
        }
    }

    report.solids = solids.iter().map(|s| s.name.clone()).collect();
    Reconstruction { solids, report }
}

/// Load a drawing and reconstruct it without exporting anything.
pub fn analyze_loops<K: GeometryKernel>(
    kernel: &K,
    input: &Path,
    settings: &ConvertSettings,
) -> Result<ConversionReport, ConvertError> {
    let mut session = Session::new(Session::DXF_TO_STEP);
    let edges = kernel.load_planar_drawing(&mut session, input)?;
    Ok(reconstruct(kernel, &edges, settings).report)
}

/// Convert a 2D drawing into extruded STEP solids.
///
/// # Errors
///
/// [`ConvertError::NoGeometry`] when no solid survives; nothing is written
/// in that case.
pub fn dxf_to_step<K: GeometryKernel>(
    kernel: &K,
    input: &Path,
    output: &Path,
    settings: &ConvertSettings,
) -> Result<ConversionReport, ConvertError> {
    let mut session = Session::new(Session::DXF_TO_STEP);
    let edges = kernel.load_planar_drawing(&mut session, input)?;
    let Reconstruction { solids, report } = reconstruct(kernel, &edges, settings);

    let Some(shape) = Shape::from_solids(solids) else {
        return Err(ConvertError::NoGeometry);
    };
    for solid in shape.solids() {
        session.add_object(solid.name.clone());
    }
    if shape.is_compound() {
        session.add_object(COMPOUND_NAME);
    }
    kernel.export_step(&mut session, &shape, output)?;
    info!(
        solids = shape.solids().len(),
        skipped = report.diagnostics.len(),
        "wrote {}",
        output.display()
    );
    Ok(report)
}

/// Tessellate the solids of a STEP file into an STL, scaled by `scale_factor`.
pub fn step_to_stl<K: GeometryKernel>(
    kernel: &K,
    input: &Path,
    output: &Path,
    scale_factor: f64,
) -> Result<MeshReport, ConvertError> {
    let mut session = Session::new(Session::STEP_TO_STL);
    let shape = kernel.import_step(&mut session, input)?;
    let scaled = shape.transformed(&Transform::uniform_scale(scale_factor));
    session.add_object("Scaled");

    let mesh = kernel.tessellate_to_mesh(&scaled);
    if mesh.is_empty() {
        return Err(ConvertError::NoGeometry);
    }
    kernel.export_mesh(&mesh, output)?;
    info!(triangles = mesh.num_triangles(), "wrote {}", output.display());
    Ok(MeshReport {
        solids: scaled.solids().len(),
        faces: scaled.num_faces(),
        triangles: mesh.num_triangles(),
    })
}

/// Rebuild a faceted solid from an STL file and write it as STEP.
pub fn stl_to_step<K: GeometryKernel>(
    kernel: &K,
    input: &Path,
    output: &Path,
    tolerance: f64,
) -> Result<MeshReport, ConvertError> {
    let mut session = Session::new(Session::STL_TO_STEP);
    let mesh = kernel.import_mesh(input)?;
    let shape = kernel.mesh_to_solid(&mesh, tolerance)?;
    for solid in shape.solids() {
        session.add_object(solid.name.clone());
    }
    kernel.export_step(&mut session, &shape, output)?;
    info!(faces = shape.num_faces(), "wrote {}", output.display());
    Ok(MeshReport {
        solids: shape.solids().len(),
        faces: shape.num_faces(),
        triangles: mesh.num_triangles(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{NativeKernel, Result};
    use approx::assert_relative_eq;
    use prismcad_math::Point2;
    use prismcad_mesh::TriangleMesh;
    use prismcad_sketch::{Edge, SamplePoint, Wire};

    fn square(x: f64, y: f64, size: f64) -> Vec<Edge> {
        let p = [
            Point2::new(x, y),
            Point2::new(x + size, y),
            Point2::new(x + size, y + size),
            Point2::new(x, y + size),
        ];
        (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect()
    }

    /// Unit square whose last edge stops `gap` short of the start.
    fn open_square(gap: f64) -> EdgeSet {
        let mut edges = square(0.0, 0.0, 1.0);
        edges[3] = Edge::line(Point2::new(0.0, 1.0), Point2::new(0.0, gap));
        EdgeSet::new(edges)
    }

    fn top(solid: &Solid) -> f64 {
        solid.bounds().max.z
    }

    /// Serves a fixed edge set and counts exports.
    struct RecordingKernel {
        inner: NativeKernel,
        edges: EdgeSet,
        exports: Cell<usize>,
    }

    impl RecordingKernel {
        fn new(edges: EdgeSet) -> Self {
            Self {
                inner: NativeKernel::default(),
                edges,
                exports: Cell::new(0),
            }
        }
    }

    impl GeometryKernel for RecordingKernel {
        fn load_planar_drawing(&self, _: &mut Session, _: &Path) -> Result<EdgeSet> {
            Ok(self.edges.clone())
        }
        fn sort_into_wires(&self, edges: &EdgeSet, tolerance: f64) -> Vec<Vec<Edge>> {
            self.inner.sort_into_wires(edges, tolerance)
        }
        fn build_wire(&self, edges: Vec<Edge>) -> Wire {
            self.inner.build_wire(edges)
        }
        fn build_face(&self, closed: &ClosedLoop) -> Result<Face> {
            self.inner.build_face(closed)
        }
        fn point_inside(&self, face: &Face, point: Point2, tolerance: f64, strict: bool) -> bool {
            self.inner.point_inside(face, point, tolerance, strict)
        }
        fn extrude(&self, face: &Face, height: Vec3) -> Result<Solid> {
            self.inner.extrude(face, height)
        }
        fn export_step(&self, _: &mut Session, _: &Shape, _: &Path) -> Result<()> {
            self.exports.set(self.exports.get() + 1);
            Ok(())
        }
        fn import_step(&self, session: &mut Session, path: &Path) -> Result<Shape> {
            self.inner.import_step(session, path)
        }
        fn tessellate_to_mesh(&self, shape: &Shape) -> TriangleMesh {
            self.inner.tessellate_to_mesh(shape)
        }
        fn export_mesh(&self, _: &TriangleMesh, _: &Path) -> Result<()> {
            self.exports.set(self.exports.get() + 1);
            Ok(())
        }
        fn import_mesh(&self, path: &Path) -> Result<TriangleMesh> {
            self.inner.import_mesh(path)
        }
        fn mesh_to_solid(&self, mesh: &TriangleMesh, tolerance: f64) -> Result<Shape> {
            self.inner.mesh_to_solid(mesh, tolerance)
        }
    }

    #[test]
    fn test_single_square() {
        let settings = ConvertSettings::default();
        let edges = EdgeSet::new(square(0.0, 0.0, 1.0));
        let result = reconstruct(&NativeKernel::default(), &edges, &settings);

        assert_eq!(result.solids.len(), 1);
        assert_eq!(result.solids[0].name, "SolidFrom_Wire0");
        assert_relative_eq!(top(&result.solids[0]), 1.0);
        let record = &result.report.loops[0];
        assert_eq!(record.status, LoopStatus::Closed);
        assert_eq!(record.edges, 4);
        assert_eq!(record.depth, Some(0));
        assert_relative_eq!(record.area.unwrap(), 1.0, epsilon = 1e-12);
        assert!(result.report.diagnostics.is_empty());
    }

    #[test]
    fn test_nested_squares_raise_the_island() {
        let mut settings = ConvertSettings::default();
        settings.extrude.base_height = 2.0;
        let mut edges = square(0.0, 0.0, 10.0);
        edges.extend(square(4.0, 4.0, 2.0));
        let result = reconstruct(&NativeKernel::default(), &EdgeSet::new(edges), &settings);

        assert_eq!(result.solids.len(), 2);
        assert_eq!(result.report.loops[0].depth, Some(0));
        assert_eq!(result.report.loops[1].depth, Some(1));
        assert_relative_eq!(top(&result.solids[0]), 2.0);
        assert_relative_eq!(top(&result.solids[1]), 3.0);
    }

    #[test]
    fn test_depth_parity_over_three_levels() {
        let mut edges = square(0.0, 0.0, 10.0);
        edges.extend(square(2.0, 2.0, 6.0));
        edges.extend(square(4.0, 4.0, 2.0));
        let result = reconstruct(
            &NativeKernel::default(),
            &EdgeSet::new(edges),
            &ConvertSettings::default(),
        );

        let heights: Vec<f64> = result.report.loops.iter().filter_map(|l| l.height).collect();
        assert_eq!(heights, vec![1.0, 1.5, 1.0]);
    }

    #[test]
    fn test_small_gap_is_repaired() {
        let result = reconstruct(
            &NativeKernel::default(),
            &open_square(0.005),
            &ConvertSettings::default(),
        );
        assert_eq!(result.solids.len(), 1);
        let record = &result.report.loops[0];
        assert_eq!(record.status, LoopStatus::Repaired);
        assert_eq!(record.edges, 5);
    }

    #[test]
    fn test_large_gap_is_rejected() {
        let result = reconstruct(
            &NativeKernel::default(),
            &open_square(0.02),
            &ConvertSettings::default(),
        );
        assert!(result.solids.is_empty());
        assert_eq!(result.report.count(LoopStatus::Rejected), 1);
        let diagnostic = &result.report.diagnostics[0];
        assert_eq!(diagnostic.entity, "Wire0");
        assert_eq!(diagnostic.stage, Stage::Wire);
    }

    #[test]
    fn test_rejected_wire_does_not_stop_the_others() {
        let mut edges = open_square(0.02).edges().to_vec();
        edges.extend(square(5.0, 0.0, 1.0));
        let result = reconstruct(
            &NativeKernel::default(),
            &EdgeSet::new(edges),
            &ConvertSettings::default(),
        );
        assert_eq!(result.solids.len(), 1);
        assert_eq!(result.report.solids, vec!["SolidFrom_Wire1".to_string()]);
        assert_eq!(result.report.diagnostics.len(), 1);
    }

    #[test]
    fn test_base_plate_comes_first() {
        let mut settings = ConvertSettings::default();
        settings.extrude.base_plate = true;
        settings.extrude.base_height = 4.0;
        let mut edges = square(0.0, 0.0, 10.0);
        edges.extend(square(4.0, 4.0, 2.0));
        let result = reconstruct(&NativeKernel::default(), &EdgeSet::new(edges), &settings);

        assert_eq!(result.solids.len(), 3);
        let plate = &result.solids[0];
        assert_eq!(plate.name, BASE_PLATE_NAME);
        let bb = plate.bounds();
        assert_relative_eq!(bb.min.x, -0.5, epsilon = 1e-9);
        assert_relative_eq!(bb.max.y, 10.5, epsilon = 1e-9);
        assert_relative_eq!(bb.min.z, 0.0);
        assert_relative_eq!(bb.max.z, 2.0);
        assert_eq!(result.report.solids[1], "SolidFrom_Wire0");
    }

    #[test]
    fn test_base_plate_skipped_without_faces() {
        let mut settings = ConvertSettings::default();
        settings.extrude.base_plate = true;
        let result = reconstruct(&NativeKernel::default(), &EdgeSet::default(), &settings);
        assert!(result.solids.is_empty());
    }

    #[test]
    fn test_sample_point_on_outer_boundary() {
        // the inner square starts on the outer square's left edge
        let mut edges = square(0.0, 0.0, 10.0);
        edges.extend(square(0.0, 4.0, 2.0));
        let mut settings = ConvertSettings::default();
        let depths = |settings: &ConvertSettings| -> Vec<Option<usize>> {
            reconstruct(&NativeKernel::default(), &EdgeSet::new(edges.clone()), settings)
                .report
                .loops
                .iter()
                .map(|l| l.depth)
                .collect()
        };

        assert_eq!(depths(&settings), vec![Some(0), Some(0)]);
        settings.classify.sample = SamplePoint::Centroid;
        assert_eq!(depths(&settings), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_empty_drawing_exports_nothing() {
        let kernel = RecordingKernel::new(EdgeSet::default());
        let err = dxf_to_step(
            &kernel,
            Path::new("empty.dxf"),
            Path::new("empty.step"),
            &ConvertSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::NoGeometry));
        assert_eq!(kernel.exports.get(), 0);
    }

    #[test]
    fn test_several_solids_export_once() {
        let mut edges = square(0.0, 0.0, 1.0);
        edges.extend(square(3.0, 0.0, 1.0));
        let kernel = RecordingKernel::new(EdgeSet::new(edges));
        let report = dxf_to_step(
            &kernel,
            Path::new("two.dxf"),
            Path::new("two.step"),
            &ConvertSettings::default(),
        )
        .unwrap();
        assert_eq!(report.solids.len(), 2);
        assert_eq!(kernel.exports.get(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let result = reconstruct(
            &NativeKernel::default(),
            &open_square(0.02),
            &ConvertSettings::default(),
        );
        let json = serde_json::to_value(&result.report).unwrap();
        assert_eq!(json["loops"][0]["status"], "rejected");
        assert_eq!(json["diagnostics"][0]["stage"], "wire");
        assert!(json["loops"][0]["area"].is_null());
    }

    mod files {
        use super::*;
        use crate::edges_from_drawing;
        use dxf::entities::{Arc, Entity, EntityType, Insert, Line, LwPolyline};
        use dxf::enums::AcadVersion;
        use dxf::{Block, Drawing, LwPolylineVertex, Point, Vector};
        use prismcad_step::read_step;

        fn closed_square(x: f64, y: f64, size: f64) -> Entity {
            let mut poly = LwPolyline::default();
            for (vx, vy) in [(x, y), (x + size, y), (x + size, y + size), (x, y + size)] {
                poly.vertices.push(LwPolylineVertex {
                    x: vx,
                    y: vy,
                    ..Default::default()
                });
            }
            poly.set_is_closed(true);
            Entity::new(EntityType::LwPolyline(poly))
        }

        fn drawing(squares: &[(f64, f64, f64)]) -> Drawing {
            let mut drawing = Drawing::new();
            drawing.header.version = AcadVersion::R2000;
            for &(x, y, size) in squares {
                drawing.add_entity(closed_square(x, y, size));
            }
            drawing
        }

        #[test]
        fn test_dxf_to_step_file() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("plate.dxf");
            let output = dir.path().join("plate.step");
            drawing(&[(0.0, 0.0, 10.0), (4.0, 4.0, 2.0)])
                .save_file(&input)
                .unwrap();

            let kernel = NativeKernel::default();
            let report =
                dxf_to_step(&kernel, &input, &output, &ConvertSettings::default()).unwrap();
            assert_eq!(report.edges, 8);
            assert_eq!(report.solids.len(), 2);

            let shape = read_step(&output).unwrap();
            assert!(shape.is_compound());
            assert_relative_eq!(shape.bounds().max.z, 1.5, epsilon = 1e-9);

            let loops = analyze_loops(&kernel, &input, &ConvertSettings::default()).unwrap();
            assert_eq!(loops.count(LoopStatus::Closed), 2);
        }

        #[test]
        fn test_blocks_and_mirrored_arcs_reach_the_export() {
            let mut block = Block {
                name: "OUTLINE".to_string(),
                ..Default::default()
            };
            block.entities.push(closed_square(0.0, 0.0, 10.0));
            let mut drawing = Drawing::new();
            drawing.add_block(block);
            drawing.add_entity(Entity::new(EntityType::Insert(Insert {
                name: "OUTLINE".to_string(),
                location: Point::new(100.0, 0.0, 0.0),
                ..Default::default()
            })));
            // D shape whose arc is stored with a downward normal
            drawing.add_entity(Entity::new(EntityType::Line(Line::new(
                Point::new(0.0, 0.0, 0.0),
                Point::new(10.0, 0.0, 0.0),
            ))));
            let mut arc = Arc::new(Point::new(-5.0, 0.0, 0.0), 5.0, 0.0, 180.0);
            arc.normal = Vector::new(0.0, 0.0, -1.0);
            drawing.add_entity(Entity::new(EntityType::Arc(arc)));

            let settings = ConvertSettings::default();
            let (edges, skipped) = edges_from_drawing(&drawing, &settings.import, 1e-6);
            assert_eq!(skipped, 0);
            let kernel = RecordingKernel::new(edges);
            let report =
                dxf_to_step(&kernel, Path::new("in.dxf"), Path::new("out.step"), &settings)
                    .unwrap();
            assert_eq!(report.count(LoopStatus::Closed), 2);
            assert_eq!(report.solids, ["SolidFrom_Wire0", "SolidFrom_Wire1"]);
            assert_eq!(kernel.exports.get(), 1);
        }

        #[test]
        fn test_step_stl_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("block.dxf");
            let step = dir.path().join("block.step");
            let stl = dir.path().join("block.stl");
            let back = dir.path().join("block_mesh.step");
            drawing(&[(0.0, 0.0, 1000.0)]).save_file(&input).unwrap();

            let kernel = NativeKernel::default();
            let mut settings = ConvertSettings::default();
            settings.extrude.base_height = 500.0;
            dxf_to_step(&kernel, &input, &step, &settings).unwrap();

            let mesh = step_to_stl(&kernel, &step, &stl, 0.001).unwrap();
            assert_eq!(mesh.solids, 1);
            assert_eq!(mesh.triangles, 12);
            let stl_mesh = kernel.import_mesh(&stl).unwrap();
            assert_relative_eq!(stl_mesh.bounds().max.x, 1.0, epsilon = 1e-6);

            let rebuilt = stl_to_step(&kernel, &stl, &back, 0.0001).unwrap();
            assert_eq!(rebuilt.faces, 12);
            let shape = read_step(&back).unwrap();
            assert_eq!(shape.solids()[0].name, "SolidFromMesh");
        }
    }
}
