//! Points, directions and local frames.

use prismcad_math::{Point3, Vec3};

use super::{expect_type, real, Attributes};
use crate::error::StepError;
use crate::parser::StepFile;

/// `CARTESIAN_POINT(name, (x, y, z))`; 2D points land on `z = 0`.
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let point = expect_type(file, id, &["CARTESIAN_POINT"])?;
    match point.reals(1)?.as_slice() {
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        other => Err(StepError::parser(
            Some(id),
            format!("CARTESIAN_POINT needs 3 coordinates, got {}", other.len()),
        )),
    }
}

/// `DIRECTION`, normalized.
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Vec3, StepError> {
    let direction = expect_type(file, id, &["DIRECTION"])?;
    let v = match direction.reals(1)?.as_slice() {
        &[x, y, z, ..] => Vec3::new(x, y, z),
        other => {
            return Err(StepError::parser(
                Some(id),
                format!("DIRECTION with {} components", other.len()),
            ))
        }
    };
    v.try_normalize(1e-15)
        .ok_or_else(|| StepError::InvalidGeometry(format!("direction #{id} has no length")))
}

/// `VECTOR(name, direction, magnitude)` as a scaled direction.
pub fn parse_vector(file: &StepFile, id: u64) -> Result<Vec3, StepError> {
    let vector = expect_type(file, id, &["VECTOR"])?;
    Ok(parse_direction(file, vector.reference(1)?)? * vector.real(2)?)
}

/// Local frame of a surface or circle; omitted directions default.
#[derive(Debug, Clone)]
pub struct AxisPlacement {
    /// Origin of the frame.
    pub location: Point3,
    /// Local Z, when given.
    pub axis: Option<Vec3>,
    /// Approximate local X, when given.
    pub ref_direction: Option<Vec3>,
}

impl AxisPlacement {
    /// Local Z; world Z when omitted.
    pub fn z_axis(&self) -> Vec3 {
        self.axis.unwrap_or_else(Vec3::z)
    }

    /// Local X, projected off Z.
    pub fn x_axis(&self) -> Vec3 {
        let z = self.z_axis();
        let seed = match self.ref_direction {
            Some(x) => x,
            None if z.x.abs() < 0.9 => Vec3::x(),
            None => Vec3::y(),
        };
        let x = seed - seed.dot(&z) * z;
        let len = x.norm();
        if len < 1e-12 {
            // ref_direction parallel to the axis
            let alt = if z.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
            (alt - alt.dot(&z) * z).normalize()
        } else {
            x / len
        }
    }

    /// Local Y completing a right-handed frame.
    pub fn y_axis(&self) -> Vec3 {
        self.z_axis().cross(&self.x_axis())
    }
}

/// `AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)`; the last two may be `$`.
pub fn parse_axis2_placement_3d(file: &StepFile, id: u64) -> Result<AxisPlacement, StepError> {
    let placement = expect_type(file, id, &["AXIS2_PLACEMENT_3D"])?;
    let optional = |idx: usize| -> Result<Option<Vec3>, StepError> {
        if placement.omitted(idx) {
            return Ok(None);
        }
        parse_direction(file, placement.reference(idx)?).map(Some)
    };
    Ok(AxisPlacement {
        location: parse_cartesian_point(file, placement.reference(1)?)?,
        axis: optional(2)?,
        ref_direction: optional(3)?,
    })
}

/// `CARTESIAN_POINT` body.
pub fn write_cartesian_point(p: &Point3) -> String {
    format!(
        "CARTESIAN_POINT('',({},{},{}))",
        real(p.x),
        real(p.y),
        real(p.z)
    )
}

/// `DIRECTION` body.
pub fn write_direction(d: &Vec3) -> String {
    format!("DIRECTION('',({},{},{}))", real(d.x), real(d.y), real(d.z))
}

/// `VECTOR` body.
pub fn write_vector(direction_id: u64, magnitude: f64) -> String {
    format!("VECTOR('',#{direction_id},{})", real(magnitude))
}

/// `AXIS2_PLACEMENT_3D` body with both directions given.
pub fn write_axis2_placement_3d(location_id: u64, axis_id: u64, ref_id: u64) -> String {
    format!("AXIS2_PLACEMENT_3D('',#{location_id},#{axis_id},#{ref_id})")
}
