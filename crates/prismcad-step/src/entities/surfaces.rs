//! Face carrier surfaces. Planes only.

use prismcad_math::{Point3, Vec3};

use super::{expect_type, parse_axis2_placement_3d, Attributes};
use crate::error::StepError;
use crate::parser::StepFile;

/// Plane of a face.
#[derive(Debug, Clone, Copy)]
pub struct StepPlane {
    /// Placement origin, on the plane.
    pub origin: Point3,
    /// Placement Z, unit length.
    pub normal: Vec3,
}

/// `PLANE(name, position)`
pub fn parse_plane(file: &StepFile, id: u64) -> Result<StepPlane, StepError> {
    let plane = expect_type(file, id, &["PLANE"])?;
    let placement = parse_axis2_placement_3d(file, plane.reference(1)?)?;
    Ok(StepPlane {
        origin: placement.location,
        normal: placement.z_axis(),
    })
}

/// Surface of a face; curved surfaces are [`StepError::UnsupportedEntity`].
pub fn parse_surface(file: &StepFile, id: u64) -> Result<StepPlane, StepError> {
    let surface = file.require(id)?;
    if surface.type_name == "PLANE" {
        parse_plane(file, id)
    } else {
        Err(StepError::UnsupportedEntity(surface.type_name.clone()))
    }
}

/// `PLANE` body.
pub fn write_plane(placement_id: u64) -> String {
    format!("PLANE('',#{placement_id})")
}
