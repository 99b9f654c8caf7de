//! Boundary topology, from vertices up to `MANIFOLD_SOLID_BREP`.

use prismcad_math::Point3;

use super::{expect_type, logical, parse_cartesian_point, ref_list, Attributes};
use crate::error::StepError;
use crate::parser::StepFile;

/// `EDGE_CURVE(name, start, end, geometry, same_sense)`
#[derive(Debug, Clone, Copy)]
pub struct EdgeCurve {
    /// `VERTEX_POINT` the edge starts at.
    pub start: u64,
    /// `VERTEX_POINT` the edge ends at.
    pub end: u64,
    /// Underlying curve.
    pub curve: u64,
    /// False when the curve runs from `end` to `start`.
    pub same_sense: bool,
}

/// `ORIENTED_EDGE(name, *, *, edge, orientation)`
#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge {
    /// `EDGE_CURVE` being used.
    pub edge: u64,
    /// Loop walks the edge from its start vertex.
    pub forward: bool,
}

/// `FACE_BOUND` or `FACE_OUTER_BOUND`.
#[derive(Debug, Clone, Copy)]
pub struct FaceBound {
    /// `EDGE_LOOP` of the bound.
    pub edge_loop: u64,
    /// Loop is used in its stored direction.
    pub as_stored: bool,
    /// Declared as `FACE_OUTER_BOUND`.
    pub outer: bool,
}

/// `ADVANCED_FACE` or `FACE_SURFACE`.
#[derive(Debug, Clone)]
pub struct AdvancedFace {
    /// Outer bound and holes, in file order.
    pub bounds: Vec<FaceBound>,
    /// Carrier surface.
    pub surface: u64,
    /// Face normal agrees with the surface normal.
    pub same_sense: bool,
}

/// Position of a `VERTEX_POINT`.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let vertex = expect_type(file, id, &["VERTEX_POINT"])?;
    parse_cartesian_point(file, vertex.reference(1)?)
}

/// Read an `EDGE_CURVE`.
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<EdgeCurve, StepError> {
    let e = expect_type(file, id, &["EDGE_CURVE"])?;
    Ok(EdgeCurve {
        start: e.reference(1)?,
        end: e.reference(2)?,
        curve: e.reference(3)?,
        same_sense: e.flag(4)?,
    })
}

/// Read an `ORIENTED_EDGE`; the two derived vertex slots are ignored.
pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<OrientedEdge, StepError> {
    let e = expect_type(file, id, &["ORIENTED_EDGE"])?;
    Ok(OrientedEdge {
        edge: e.reference(3)?,
        forward: e.flag(4)?,
    })
}

/// Oriented edges of an `EDGE_LOOP`, in walking order.
pub fn parse_edge_loop(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    expect_type(file, id, &["EDGE_LOOP"])?.references(1)
}

/// Read a face bound of either kind.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<FaceBound, StepError> {
    let b = expect_type(file, id, &["FACE_BOUND", "FACE_OUTER_BOUND"])?;
    Ok(FaceBound {
        edge_loop: b.reference(1)?,
        as_stored: b.flag(2)?,
        outer: b.type_name.ends_with("OUTER_BOUND"),
    })
}

/// Read a face together with its bounds.
pub fn parse_advanced_face(file: &StepFile, id: u64) -> Result<AdvancedFace, StepError> {
    let f = expect_type(file, id, &["ADVANCED_FACE", "FACE_SURFACE"])?;
    let mut bounds = Vec::new();
    for bound in f.references(1)? {
        bounds.push(parse_face_bound(file, bound)?);
    }
    Ok(AdvancedFace {
        bounds,
        surface: f.reference(2)?,
        same_sense: f.flag(3)?,
    })
}

/// Faces of a `CLOSED_SHELL` or `OPEN_SHELL`.
pub fn parse_shell(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    expect_type(file, id, &["CLOSED_SHELL", "OPEN_SHELL"])?.references(1)
}

/// Name and outer shell of a `MANIFOLD_SOLID_BREP`.
pub fn parse_manifold_solid_brep(file: &StepFile, id: u64) -> Result<(String, u64), StepError> {
    let brep = expect_type(file, id, &["MANIFOLD_SOLID_BREP"])?;
    let name = match brep.args.first() {
        Some(value) => value.as_string().unwrap_or("").to_owned(),
        None => String::new(),
    };
    Ok((name, brep.reference(1)?))
}

/// Format a VERTEX_POINT body.
pub fn write_vertex_point(point_id: u64) -> String {
    format!("VERTEX_POINT('',#{point_id})")
}

/// Format an EDGE_CURVE body.
pub fn write_edge_curve(start_id: u64, end_id: u64, curve_id: u64, same_sense: bool) -> String {
    format!(
        "EDGE_CURVE('',#{start_id},#{end_id},#{curve_id},{})",
        logical(same_sense)
    )
}

/// Format an ORIENTED_EDGE body.
pub fn write_oriented_edge(edge_id: u64, orientation: bool) -> String {
    format!("ORIENTED_EDGE('',*,*,#{edge_id},{})", logical(orientation))
}

/// Format an EDGE_LOOP body.
pub fn write_edge_loop(oriented_edge_ids: &[u64]) -> String {
    format!("EDGE_LOOP('',{})", ref_list(oriented_edge_ids))
}

/// Format a FACE_BOUND or FACE_OUTER_BOUND body.
pub fn write_face_bound(loop_id: u64, is_outer: bool) -> String {
    let entity_type = if is_outer {
        "FACE_OUTER_BOUND"
    } else {
        "FACE_BOUND"
    };
    format!("{entity_type}('',#{loop_id},.T.)")
}

/// Format an ADVANCED_FACE body.
pub fn write_advanced_face(bound_ids: &[u64], surface_id: u64) -> String {
    format!(
        "ADVANCED_FACE('',{},#{surface_id},.T.)",
        ref_list(bound_ids)
    )
}

/// Format a CLOSED_SHELL body.
pub fn write_closed_shell(face_ids: &[u64]) -> String {
    format!("CLOSED_SHELL('',{})", ref_list(face_ids))
}

/// Format a MANIFOLD_SOLID_BREP body.
pub fn write_manifold_solid_brep(name: &str, shell_id: u64) -> String {
    format!(
        "MANIFOLD_SOLID_BREP('{}',#{shell_id})",
        name.replace('\'', "''")
    )
}
