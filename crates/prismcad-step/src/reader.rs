//! STEP file reader: converts parsed STEP data to planar solids.

use std::collections::HashMap;
use std::path::Path;

use prismcad_brep::{PolyFace, Shape, Solid};
use prismcad_math::{Point3, Vec3};

use crate::entities::{
    parse_advanced_face, parse_curve, parse_edge_curve, parse_edge_loop,
    parse_manifold_solid_brep, parse_oriented_edge, parse_shell, parse_surface,
    parse_vertex_point, StepCurve,
};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};

/// Segments per full turn when circle edges are flattened into polygons.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Read a STEP file from a path.
///
/// Every `MANIFOLD_SOLID_BREP` becomes one [`Solid`]; several solids are
/// returned as a compound. Faces must lie on planes; line edges are kept
/// exactly and circle edges are faceted with [`CIRCLE_SEGMENTS`] per turn.
pub fn read_step(path: impl AsRef<Path>) -> Result<Shape, StepError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let shape = read_step_from_buffer(&data)?;
    tracing::debug!(
        "read {} solids ({} faces) from {}",
        shape.solids().len(),
        shape.num_faces(),
        path.display()
    );
    Ok(shape)
}

/// Read a STEP file from a byte buffer.
pub fn read_step_from_buffer(data: &[u8]) -> Result<Shape, StepError> {
    let step_file = Parser::parse(data)?;
    let schema = step_file.schema();
    if !schema.is_empty() {
        tracing::debug!("STEP schema: {}", schema.join(", "));
    }
    let mut reader = StepReader::new(&step_file);
    let solids = reader.read_all_solids()?;
    Shape::from_solids(solids).ok_or(StepError::NoSolids)
}

/// Context for reading STEP files and building solids.
struct StepReader<'a> {
    file: &'a StepFile,
    /// Vertex positions by STEP id.
    vertices: HashMap<u64, Point3>,
    /// Curves by STEP id.
    curves: HashMap<u64, StepCurve>,
}

impl<'a> StepReader<'a> {
    fn new(file: &'a StepFile) -> Self {
        Self {
            file,
            vertices: HashMap::new(),
            curves: HashMap::new(),
        }
    }

    fn read_all_solids(&mut self) -> Result<Vec<Solid>, StepError> {
        let solid_entities = self.file.entities_of_type("MANIFOLD_SOLID_BREP");
        if solid_entities.is_empty() {
            return Err(StepError::NoSolids);
        }
        solid_entities
            .iter()
            .map(|entity| self.read_solid(entity.id))
            .collect()
    }

    fn read_solid(&mut self, solid_id: u64) -> Result<Solid, StepError> {
        let (name, shell_id) = parse_manifold_solid_brep(self.file, solid_id)?;
        let face_ids = parse_shell(self.file, shell_id)?;

        let mut faces = Vec::with_capacity(face_ids.len());
        for face_id in face_ids {
            faces.push(self.read_face(face_id)?);
        }

        let name = if name.is_empty() {
            format!("Solid{solid_id}")
        } else {
            name
        };
        let mut solid = Solid::new(name, faces);
        solid.orient_outward();
        Ok(solid)
    }

    fn read_face(&mut self, face_id: u64) -> Result<PolyFace, StepError> {
        let step_face = parse_advanced_face(self.file, face_id)?;
        let plane = parse_surface(self.file, step_face.surface)?;
        let normal = if step_face.same_sense {
            plane.normal
        } else {
            -plane.normal
        };

        let mut outer = None;
        let mut holes = Vec::new();
        for bound in &step_face.bounds {
            let mut ring = self.read_loop(bound.edge_loop)?;
            if !bound.as_stored {
                ring.reverse();
            }
            if ring.len() < 3 {
                return Err(StepError::InvalidTopology(format!(
                    "loop #{} of face #{face_id} has {} vertices",
                    bound.edge_loop,
                    ring.len()
                )));
            }
            if bound.outer && outer.is_none() {
                outer = Some(ring);
            } else {
                holes.push(ring);
            }
        }

        // files without FACE_OUTER_BOUND: the largest loop is the outer one
        let outer = match outer {
            Some(o) => o,
            None => {
                let largest = holes
                    .iter()
                    .enumerate()
                    .max_by(|a, b| loop_area(a.1).total_cmp(&loop_area(b.1)))
                    .map(|(i, _)| i)
                    .ok_or_else(|| {
                        StepError::InvalidTopology(format!("face #{face_id} has no bounds"))
                    })?;
                holes.swap_remove(largest)
            }
        };

        // outer loop follows the face normal, holes run against it
        let outer = wind(outer, &normal, true);
        let holes = holes.into_iter().map(|h| wind(h, &normal, false)).collect();
        Ok(PolyFace::with_holes(outer, holes))
    }

    fn read_loop(&mut self, loop_id: u64) -> Result<Vec<Point3>, StepError> {
        let mut ring: Vec<Point3> = Vec::new();
        for oe_id in parse_edge_loop(self.file, loop_id)? {
            let oe = parse_oriented_edge(self.file, oe_id)?;
            let edge = parse_edge_curve(self.file, oe.edge)?;
            let start = self.vertex(edge.start)?;
            let end = self.vertex(edge.end)?;

            let mut points = vec![start];
            points.extend(self.curve(edge.curve)?.interior_points(
                &start,
                &end,
                edge.same_sense,
                CIRCLE_SEGMENTS,
            ));
            if !oe.forward {
                // walk end -> start, leaving the start for the next edge
                points.push(end);
                points.reverse();
                points.pop();
            }

            for p in points {
                if ring.last().is_some_and(|q| (q - p).norm() < 1e-12) {
                    continue;
                }
                ring.push(p);
            }
        }
        if ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() < 1e-12 {
            ring.pop();
        }
        Ok(ring)
    }

    fn vertex(&mut self, id: u64) -> Result<Point3, StepError> {
        if let Some(p) = self.vertices.get(&id) {
            return Ok(*p);
        }
        let p = parse_vertex_point(self.file, id)?;
        self.vertices.insert(id, p);
        Ok(p)
    }

    fn curve(&mut self, id: u64) -> Result<&StepCurve, StepError> {
        if !self.curves.contains_key(&id) {
            let curve = parse_curve(self.file, id)?;
            self.curves.insert(id, curve);
        }
        self.curves
            .get(&id)
            .ok_or(StepError::MissingEntity(id))
    }
}

fn loop_area(ring: &[Point3]) -> f64 {
    PolyFace::new(ring.to_vec()).area_vector().norm()
}

/// Reverse `ring` if its winding disagrees with `normal` (or agrees, for holes).
fn wind(mut ring: Vec<Point3>, normal: &Vec3, along: bool) -> Vec<Point3> {
    let dot = PolyFace::new(ring.clone()).area_vector().dot(normal);
    if (dot < 0.0) == along {
        ring.reverse();
    }
    ring
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 10 mm cube, one planar face per side, loops wound outward.
    pub(crate) const BOX_STEP: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('10 mm test cube'),'2;1');
FILE_NAME('cube10.stp','2025-03-14T09:30:00',(''),(''),'','','');
FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));
ENDSEC;
DATA;
#1=CARTESIAN_POINT('',(0.,0.,0.));
#2=CARTESIAN_POINT('',(10.,0.,0.));
#3=CARTESIAN_POINT('',(10.,10.,0.));
#4=CARTESIAN_POINT('',(0.,10.,0.));
#5=CARTESIAN_POINT('',(0.,0.,10.));
#6=CARTESIAN_POINT('',(10.,0.,10.));
#7=CARTESIAN_POINT('',(10.,10.,10.));
#8=CARTESIAN_POINT('',(0.,10.,10.));
#11=VERTEX_POINT('',#1);
#12=VERTEX_POINT('',#2);
#13=VERTEX_POINT('',#3);
#14=VERTEX_POINT('',#4);
#15=VERTEX_POINT('',#5);
#16=VERTEX_POINT('',#6);
#17=VERTEX_POINT('',#7);
#18=VERTEX_POINT('',#8);
#20=DIRECTION('',(0.,0.,1.));
#21=DIRECTION('',(1.,0.,0.));
#22=DIRECTION('',(0.,0.,-1.));
#23=DIRECTION('',(0.,1.,0.));
#24=DIRECTION('',(0.,-1.,0.));
#25=DIRECTION('',(-1.,0.,0.));
#30=AXIS2_PLACEMENT_3D('',#1,#22,#21);
#31=AXIS2_PLACEMENT_3D('',#5,#20,#21);
#32=AXIS2_PLACEMENT_3D('',#1,#24,#21);
#33=AXIS2_PLACEMENT_3D('',#4,#23,#21);
#34=AXIS2_PLACEMENT_3D('',#1,#25,#23);
#35=AXIS2_PLACEMENT_3D('',#2,#21,#23);
#40=PLANE('',#30);
#41=PLANE('',#31);
#42=PLANE('',#32);
#43=PLANE('',#33);
#44=PLANE('',#34);
#45=PLANE('',#35);
#60=VECTOR('',#21,10.);
#61=VECTOR('',#23,10.);
#62=VECTOR('',#20,10.);
#70=LINE('',#1,#60);
#71=LINE('',#2,#61);
#72=LINE('',#3,#60);
#73=LINE('',#4,#61);
#75=LINE('',#5,#60);
#76=LINE('',#6,#61);
#77=LINE('',#7,#60);
#78=LINE('',#8,#61);
#79=LINE('',#1,#62);
#80=LINE('',#2,#62);
#81=LINE('',#3,#62);
#82=LINE('',#4,#62);
#100=EDGE_CURVE('',#11,#12,#70,.T.);
#101=EDGE_CURVE('',#12,#13,#71,.T.);
#102=EDGE_CURVE('',#13,#14,#72,.T.);
#103=EDGE_CURVE('',#14,#11,#73,.T.);
#104=EDGE_CURVE('',#15,#16,#75,.T.);
#105=EDGE_CURVE('',#16,#17,#76,.T.);
#106=EDGE_CURVE('',#17,#18,#77,.T.);
#107=EDGE_CURVE('',#18,#15,#78,.T.);
#108=EDGE_CURVE('',#11,#15,#79,.T.);
#109=EDGE_CURVE('',#12,#16,#80,.T.);
#110=EDGE_CURVE('',#13,#17,#81,.T.);
#111=EDGE_CURVE('',#14,#18,#82,.T.);
#120=ORIENTED_EDGE('',*,*,#100,.F.);
#121=ORIENTED_EDGE('',*,*,#103,.F.);
#122=ORIENTED_EDGE('',*,*,#102,.F.);
#123=ORIENTED_EDGE('',*,*,#101,.F.);
#124=ORIENTED_EDGE('',*,*,#104,.T.);
#125=ORIENTED_EDGE('',*,*,#105,.T.);
#126=ORIENTED_EDGE('',*,*,#106,.T.);
#127=ORIENTED_EDGE('',*,*,#107,.T.);
#130=ORIENTED_EDGE('',*,*,#100,.T.);
#131=ORIENTED_EDGE('',*,*,#109,.T.);
#132=ORIENTED_EDGE('',*,*,#104,.F.);
#133=ORIENTED_EDGE('',*,*,#108,.F.);
#134=ORIENTED_EDGE('',*,*,#102,.T.);
#135=ORIENTED_EDGE('',*,*,#111,.T.);
#136=ORIENTED_EDGE('',*,*,#106,.F.);
#137=ORIENTED_EDGE('',*,*,#110,.F.);
#138=ORIENTED_EDGE('',*,*,#103,.T.);
#139=ORIENTED_EDGE('',*,*,#108,.T.);
#140=ORIENTED_EDGE('',*,*,#107,.F.);
#141=ORIENTED_EDGE('',*,*,#111,.F.);
#142=ORIENTED_EDGE('',*,*,#101,.T.);
#143=ORIENTED_EDGE('',*,*,#110,.T.);
#144=ORIENTED_EDGE('',*,*,#105,.F.);
#145=ORIENTED_EDGE('',*,*,#109,.F.);
#150=EDGE_LOOP('',(#120,#121,#122,#123));
#151=EDGE_LOOP('',(#124,#125,#126,#127));
#152=EDGE_LOOP('',(#130,#131,#132,#133));
#153=EDGE_LOOP('',(#134,#135,#136,#137));
#154=EDGE_LOOP('',(#138,#139,#140,#141));
#155=EDGE_LOOP('',(#142,#143,#144,#145));
#160=FACE_OUTER_BOUND('',#150,.T.);
#161=FACE_OUTER_BOUND('',#151,.T.);
#162=FACE_OUTER_BOUND('',#152,.T.);
#163=FACE_OUTER_BOUND('',#153,.T.);
#164=FACE_OUTER_BOUND('',#154,.T.);
#165=FACE_OUTER_BOUND('',#155,.T.);
#170=ADVANCED_FACE('',(#160),#40,.T.);
#171=ADVANCED_FACE('',(#161),#41,.T.);
#172=ADVANCED_FACE('',(#162),#42,.T.);
#173=ADVANCED_FACE('',(#163),#43,.T.);
#174=ADVANCED_FACE('',(#164),#44,.T.);
#175=ADVANCED_FACE('',(#165),#45,.T.);
#180=CLOSED_SHELL('',(#170,#171,#172,#173,#174,#175));
#190=MANIFOLD_SOLID_BREP('Box',#180);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_read_simple_box() {
        let shape = read_step_from_buffer(BOX_STEP.as_bytes()).unwrap();
        assert!(!shape.is_compound());
        let solid = &shape.solids()[0];
        assert_eq!(solid.name, "Box");
        assert_eq!(solid.faces.len(), 6);
        for face in &solid.faces {
            assert_eq!(face.outer.len(), 4);
        }
        assert_relative_eq!(solid.signed_volume(), 1000.0, epsilon = 1e-9);

        // bottom face points down
        let bottom = solid.faces[0].normal().unwrap();
        assert_relative_eq!(bottom, -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_disk_with_circle_edge() {
        let input = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n\
            #1=CARTESIAN_POINT('',(0.,0.,0.));\n\
            #2=DIRECTION('',(0.,0.,1.));\n\
            #3=DIRECTION('',(1.,0.,0.));\n\
            #4=AXIS2_PLACEMENT_3D('',#1,#2,#3);\n\
            #5=CIRCLE('',#4,2.);\n\
            #6=CARTESIAN_POINT('',(2.,0.,0.));\n\
            #7=VERTEX_POINT('',#6);\n\
            #8=EDGE_CURVE('',#7,#7,#5,.T.);\n\
            #9=ORIENTED_EDGE('',*,*,#8,.F.);\n\
            #10=EDGE_LOOP('',(#9));\n\
            #11=FACE_OUTER_BOUND('',#10,.T.);\n\
            #12=PLANE('',#4);\n\
            #13=ADVANCED_FACE('',(#11),#12,.T.);\n\
            #14=OPEN_SHELL('',(#13));\n\
            #15=MANIFOLD_SOLID_BREP('',#14);\n\
            ENDSEC;\nEND-ISO-10303-21;";
        let shape = read_step_from_buffer(input.as_bytes()).unwrap();
        let solid = &shape.solids()[0];
        assert_eq!(solid.name, "Solid15");
        let face = &solid.faces[0];
        assert_eq!(face.outer.len(), CIRCLE_SEGMENTS);
        // clockwise loop re-wound to follow the plane normal
        assert!(face.area_vector().z > 0.0);
    }

    #[test]
    fn test_two_solids_make_a_compound() {
        let second = BOX_STEP
            .replace(
            "#190=MANIFOLD_SOLID_BREP('Box',#180);",
            "#190=MANIFOLD_SOLID_BREP('Box',#180);\n#191=MANIFOLD_SOLID_BREP('Copy',#180);",
        );
        let shape = read_step_from_buffer(second.as_bytes()).unwrap();
        assert!(shape.is_compound());
        let names: Vec<&str> = shape.solids().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Box", "Copy"]);
    }

    #[test]
    fn test_curved_surface_is_rejected() {
        let input = BOX_STEP.replace(
            "#45=PLANE('',#35);",
            "#45=CYLINDRICAL_SURFACE('',#35,5.);",
        );
        let err = read_step_from_buffer(input.as_bytes()).unwrap_err();
        assert!(matches!(err, StepError::UnsupportedEntity(name) if name == "CYLINDRICAL_SURFACE"));
    }

    #[test]
    fn test_missing_reference() {
        let input = BOX_STEP.replace("#18=VERTEX_POINT('',#8);\n", "");
        assert!(matches!(
            read_step_from_buffer(input.as_bytes()),
            Err(StepError::MissingEntity(18))
        ));
    }

    #[test]
    fn test_no_solids() {
        let input = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n\
            #1=CARTESIAN_POINT('',(0.,0.,0.));\n\
            ENDSEC;\nEND-ISO-10303-21;";
        let result = read_step_from_buffer(input.as_bytes());
        assert!(matches!(result, Err(StepError::NoSolids)));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_step("/nonexistent/box.step"),
            Err(StepError::Io(_))
        ));
    }
}
