//! Edge geometry. Lines and circles are understood.

use std::f64::consts::TAU;

use prismcad_math::{Point3, Vec3};

use super::{
    expect_type, parse_axis2_placement_3d, parse_cartesian_point, parse_vector, Attributes,
};
use crate::error::StepError;
use crate::parser::StepFile;

/// Geometry carried by an `EDGE_CURVE`.
#[derive(Debug, Clone)]
pub enum StepCurve {
    /// Unbounded line; the edge vertices cut it.
    Line {
        /// Point on the line.
        origin: Point3,
        /// `VECTOR` of the line, not normalized.
        direction: Vec3,
    },
    /// Circle in the plane spanned by `x_dir` and `y_dir`.
    Circle {
        /// Center.
        center: Point3,
        /// Radius.
        radius: f64,
        /// In-plane reference direction (parameter 0).
        x_dir: Vec3,
        /// In-plane direction at parameter π/2.
        y_dir: Vec3,
    },
}

impl StepCurve {
    /// Points strictly between `start` and `end` along the curve.
    ///
    /// Lines need none. A circle is walked counter-clockwise about its axis
    /// when `same_sense` is set, clockwise otherwise; coincident endpoints
    /// mean a full turn. `segments` is the count per full turn.
    pub fn interior_points(
        &self,
        start: &Point3,
        end: &Point3,
        same_sense: bool,
        segments: usize,
    ) -> Vec<Point3> {
        let StepCurve::Circle {
            center,
            radius,
            x_dir,
            y_dir,
        } = self
        else {
            return Vec::new();
        };

        let angle = |p: &Point3| {
            let d = p - center;
            d.dot(y_dir).atan2(d.dot(x_dir))
        };
        let a0 = angle(start);
        let a1 = angle(end);
        let mut sweep = if same_sense { a1 - a0 } else { a0 - a1 }.rem_euclid(TAU);
        if sweep < 1e-9 {
            sweep = TAU;
        }
        if !same_sense {
            sweep = -sweep;
        }

        let min = if (sweep.abs() - TAU).abs() < 1e-9 { 3 } else { 1 };
        let n = ((sweep.abs() / TAU * segments as f64).ceil() as usize).max(min);
        (1..n)
            .map(|k| {
                let t = a0 + sweep * k as f64 / n as f64;
                center + (x_dir * t.cos() + y_dir * t.sin()) * *radius
            })
            .collect()
    }
}

/// `LINE(name, point, vector)`
pub fn parse_line(file: &StepFile, id: u64) -> Result<StepCurve, StepError> {
    let line = expect_type(file, id, &["LINE"])?;
    Ok(StepCurve::Line {
        origin: parse_cartesian_point(file, line.reference(1)?)?,
        direction: parse_vector(file, line.reference(2)?)?,
    })
}

/// `CIRCLE(name, position, radius)`; the radius must be positive.
pub fn parse_circle(file: &StepFile, id: u64) -> Result<StepCurve, StepError> {
    let circle = expect_type(file, id, &["CIRCLE"])?;
    let placement = parse_axis2_placement_3d(file, circle.reference(1)?)?;
    let radius = circle.real(2)?;
    if radius <= 0.0 {
        return Err(StepError::InvalidGeometry(format!(
            "circle #{id} has radius {radius}"
        )));
    }
    Ok(StepCurve::Circle {
        center: placement.location,
        radius,
        x_dir: placement.x_axis(),
        y_dir: placement.y_axis(),
    })
}

/// Line or circle; splines and conics are [`StepError::UnsupportedEntity`].
pub fn parse_curve(file: &StepFile, id: u64) -> Result<StepCurve, StepError> {
    let curve = file.require(id)?;
    match curve.type_name.as_str() {
        "LINE" => parse_line(file, id),
        "CIRCLE" => parse_circle(file, id),
        _ => Err(StepError::UnsupportedEntity(curve.type_name.clone())),
    }
}

/// `LINE` body.
pub fn write_line(point_id: u64, vector_id: u64) -> String {
    format!("LINE('',#{point_id},#{vector_id})")
}
