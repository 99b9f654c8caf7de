//! AP214 STEP writer for planar solids.
//!
//! Each solid becomes a `MANIFOLD_SOLID_BREP` over a `CLOSED_SHELL` of
//! `ADVANCED_FACE`s on `PLANE`s with `LINE` edges. Vertices and edges are
//! shared between the faces of a solid. All solids go into one
//! `SHAPE_REPRESENTATION`, which is how a compound is exported.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use prismcad_brep::{PolyFace, Shape, Solid};
use prismcad_math::{Point3, Vec3};

use crate::entities::{
    ref_list, write_advanced_face, write_axis2_placement_3d, write_cartesian_point,
    write_closed_shell, write_direction, write_edge_curve, write_edge_loop, write_face_bound,
    write_line, write_manifold_solid_brep, write_oriented_edge, write_plane, write_vector,
    write_vertex_point,
};
use crate::error::StepError;

/// Write a shape to a STEP file.
pub fn write_step(shape: &Shape, path: impl AsRef<Path>) -> Result<(), StepError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = write_step_with_name(shape, &file_name)?;
    std::fs::write(path, data)?;
    tracing::debug!(
        "wrote {} solids ({} faces) to {}",
        shape.solids().len(),
        shape.num_faces(),
        path.display()
    );
    Ok(())
}

/// Write a shape to an in-memory STEP file.
pub fn write_step_to_buffer(shape: &Shape) -> Result<Vec<u8>, StepError> {
    write_step_with_name(shape, "")
}

fn write_step_with_name(shape: &Shape, file_name: &str) -> Result<Vec<u8>, StepError> {
    let mut writer = StepWriter::new();
    let mut items = Vec::new();
    for solid in shape.solids() {
        if let Some(id) = writer.add_solid(solid) {
            items.push(id);
        }
    }
    if items.is_empty() {
        return Err(StepError::NoSolids);
    }

    let name = match shape {
        Shape::Solid(s) => s.name.as_str(),
        Shape::Compound(_) => "Compound",
    };
    writer.add_product(name, &items);

    let mut out = Vec::new();
    writeln!(out, "ISO-10303-21;")?;
    writeln!(out, "HEADER;")?;
    writeln!(out, "FILE_DESCRIPTION(('prismcad model'),'2;1');")?;
    writeln!(
        out,
        "FILE_NAME('{}','',(''),(''),'prismcad {}','prismcad','');",
        escape(file_name),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "FILE_SCHEMA(('AUTOMOTIVE_DESIGN'));")?;
    writeln!(out, "ENDSEC;")?;
    writeln!(out, "DATA;")?;
    for line in &writer.lines {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "ENDSEC;")?;
    writeln!(out, "END-ISO-10303-21;")?;
    Ok(out)
}

fn escape(s: &str) -> String {
    s.replace('\'', "''")
}

/// Exact coordinate key for vertex sharing (`-0.0` folds onto `0.0`).
fn point_key(p: &Point3) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Unit vector perpendicular to `n`, preferring the direction of `hint`.
fn perpendicular(n: &Vec3, hint: &Vec3) -> Vec3 {
    for seed in [*hint, Vec3::x(), Vec3::y()] {
        let v = seed - n * seed.dot(n);
        let len = v.norm();
        if len > 1e-9 {
            return v / len;
        }
    }
    Vec3::x()
}

struct StepWriter {
    lines: Vec<String>,
    next_id: u64,
}

/// Vertex and edge ids shared by the faces of one solid.
#[derive(Default)]
struct SolidIds {
    /// Point key -> (vertex index, CARTESIAN_POINT id, VERTEX_POINT id).
    vertices: HashMap<[u64; 3], (usize, u64, u64)>,
    points: Vec<Point3>,
    /// (lower vertex index, higher vertex index) -> EDGE_CURVE id.
    edges: HashMap<(usize, usize), u64>,
}

impl StepWriter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_id: 1,
        }
    }

    fn add(&mut self, body: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(format!("#{id}={body};"));
        id
    }

    fn vertex(&mut self, ids: &mut SolidIds, p: &Point3) -> (usize, u64, u64) {
        if let Some(v) = ids.vertices.get(&point_key(p)) {
            return *v;
        }
        let point_id = self.add(write_cartesian_point(p));
        let vertex_id = self.add(write_vertex_point(point_id));
        let v = (ids.points.len(), point_id, vertex_id);
        ids.points.push(*p);
        ids.vertices.insert(point_key(p), v);
        v
    }

    fn edge(&mut self, ids: &mut SolidIds, a: (usize, u64, u64), b: (usize, u64, u64)) -> u64 {
        let (lo, hi) = if a.0 < b.0 { (a, b) } else { (b, a) };
        if let Some(&id) = ids.edges.get(&(lo.0, hi.0)) {
            return id;
        }
        let d = ids.points[hi.0] - ids.points[lo.0];
        let len = d.norm();
        let dir_id = self.add(write_direction(&(d / len)));
        let vec_id = self.add(write_vector(dir_id, len));
        let line_id = self.add(write_line(lo.1, vec_id));
        let edge_id = self.add(write_edge_curve(lo.2, hi.2, line_id, true));
        ids.edges.insert((lo.0, hi.0), edge_id);
        edge_id
    }

    /// Write one loop, returning the EDGE_LOOP id.
    fn add_loop(&mut self, ids: &mut SolidIds, ring: &[Point3]) -> Option<u64> {
        let verts: Vec<_> = ring.iter().map(|p| self.vertex(ids, p)).collect();
        let mut oriented = Vec::with_capacity(verts.len());
        for (i, &a) in verts.iter().enumerate() {
            let b = verts[(i + 1) % verts.len()];
            if a.0 == b.0 {
                continue;
            }
            let edge_id = self.edge(ids, a, b);
            oriented.push(self.add(write_oriented_edge(edge_id, a.0 < b.0)));
        }
        if oriented.len() < 3 {
            return None;
        }
        Some(self.add(write_edge_loop(&oriented)))
    }

    fn add_face(&mut self, ids: &mut SolidIds, face: &PolyFace) -> Option<u64> {
        let normal = face.normal()?;
        let outer_loop = self.add_loop(ids, &face.outer)?;
        let mut bounds = vec![self.add(write_face_bound(outer_loop, true))];
        for hole in &face.holes {
            if let Some(hole_loop) = self.add_loop(ids, hole) {
                bounds.push(self.add(write_face_bound(hole_loop, false)));
            }
        }

        let origin = self.vertex(ids, &face.outer[0]);
        let hint = face.outer[1] - face.outer[0];
        let axis_id = self.add(write_direction(&normal));
        let ref_id = self.add(write_direction(&perpendicular(&normal, &hint)));
        let placement_id = self.add(write_axis2_placement_3d(origin.1, axis_id, ref_id));
        let plane_id = self.add(write_plane(placement_id));
        Some(self.add(write_advanced_face(&bounds, plane_id)))
    }

    /// Write a solid, returning its MANIFOLD_SOLID_BREP id.
    fn add_solid(&mut self, solid: &Solid) -> Option<u64> {
        let mut ids = SolidIds::default();
        let mut face_ids = Vec::with_capacity(solid.faces.len());
        for face in &solid.faces {
            match self.add_face(&mut ids, face) {
                Some(id) => face_ids.push(id),
                None => tracing::debug!("skipping degenerate face in {}", solid.name),
            }
        }
        if face_ids.is_empty() {
            tracing::warn!("solid {} has no writable faces", solid.name);
            return None;
        }
        let shell_id = self.add(write_closed_shell(&face_ids));
        Some(self.add(write_manifold_solid_brep(&solid.name, shell_id)))
    }

    /// Units, context, shape representation and product chain.
    fn add_product(&mut self, name: &str, items: &[u64]) {
        let name = escape(name);
        let origin = self.add(write_cartesian_point(&Point3::origin()));
        let z = self.add(write_direction(&Vec3::z()));
        let x = self.add(write_direction(&Vec3::x()));
        let placement = self.add(write_axis2_placement_3d(origin, z, x));

        let length_unit = self.add("(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.))".into());
        let angle_unit = self.add("(NAMED_UNIT(*)PLANE_ANGLE_UNIT()SI_UNIT($,.RADIAN.))".into());
        let solid_angle_unit =
            self.add("(NAMED_UNIT(*)SI_UNIT($,.STERADIAN.)SOLID_ANGLE_UNIT())".into());
        let uncertainty = self.add(format!(
            "UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-7),#{length_unit},'distance_accuracy_value','confusion accuracy')"
        ));
        let context = self.add(format!(
            "(GEOMETRIC_REPRESENTATION_CONTEXT(3)GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT((#{uncertainty}))GLOBAL_UNIT_ASSIGNED_CONTEXT((#{length_unit},#{angle_unit},#{solid_angle_unit}))REPRESENTATION_CONTEXT('Context #1','3D Context with UNIT and UNCERTAINTY'))"
        ));

        let mut rep_items = vec![placement];
        rep_items.extend_from_slice(items);
        let shape_rep = self.add(format!(
            "SHAPE_REPRESENTATION('{name}',{},#{context})",
            ref_list(&rep_items)
        ));

        let app_context = self.add("APPLICATION_CONTEXT('automotive design')".into());
        self.add(format!(
            "APPLICATION_PROTOCOL_DEFINITION('international standard','automotive_design',2000,#{app_context})"
        ));
        let product_context =
            self.add(format!("PRODUCT_CONTEXT('',#{app_context},'mechanical')"));
        let product = self.add(format!(
            "PRODUCT('{name}','{name}','',(#{product_context}))"
        ));
        let formation = self.add(format!(
            "PRODUCT_DEFINITION_FORMATION('','',#{product})"
        ));
        let def_context = self.add(format!(
            "PRODUCT_DEFINITION_CONTEXT('part definition',#{app_context},'design')"
        ));
        let definition = self.add(format!(
            "PRODUCT_DEFINITION('design','',#{formation},#{def_context})"
        ));
        let def_shape = self.add(format!(
            "PRODUCT_DEFINITION_SHAPE('','',#{definition})"
        ));
        self.add(format!(
            "SHAPE_DEFINITION_REPRESENTATION(#{def_shape},#{shape_rep})"
        ));
    }
}
