//! Extrude operation: create a solid by sweeping a face along a direction.

use prismcad_brep::{PolyFace, Solid};
use prismcad_math::{Aabb2, Point3, Vec3};

use crate::{Face, SketchError};

/// Height multiplier for faces at odd nesting depth.
pub const ODD_DEPTH_HEIGHT_FACTOR: f64 = 1.5;

/// Base plate thickness as a fraction of the base height.
pub const BASE_PLATE_HEIGHT_FACTOR: f64 = 0.5;

/// Base plate margin on each side, as a fraction of the drawing span.
pub const BASE_PLATE_MARGIN: f64 = 0.05;

/// Extrusion height for a face at the given nesting depth.
///
/// Even depths (outer boundaries) use the base height; odd depths (islands
/// inside a cutout) are raised by [`ODD_DEPTH_HEIGHT_FACTOR`].
pub fn height_for_depth(base_height: f64, depth: usize) -> f64 {
    if depth % 2 == 0 {
        base_height
    } else {
        base_height * ODD_DEPTH_HEIGHT_FACTOR
    }
}

/// Padded bounding box of all faces, or `None` when there are none.
pub fn base_plate_bounds(faces: &[Face]) -> Option<Aabb2> {
    let mut bb = Aabb2::empty();
    for face in faces {
        bb.include(&face.bounds());
    }
    if bb.is_empty() {
        None
    } else {
        Some(bb.padded(BASE_PLATE_MARGIN))
    }
}

/// Extrude a face lying in the XY plane along a direction.
///
/// # Returns
///
/// A closed polyhedral solid with a bottom cap at z = 0, a top cap
/// translated by `direction`, and one planar quad per boundary segment.
/// Faces are oriented outward whichever way `direction` points.
///
/// # Errors
///
/// Returns an error if the direction is zero or parallel to the XY plane.
pub fn extrude(face: &Face, direction: Vec3) -> Result<Solid, SketchError> {
    if direction.norm() < 1e-12 {
        return Err(SketchError::ZeroExtrusion);
    }
    if direction.z.abs() < 1e-12 {
        return Err(SketchError::InPlaneExtrusion);
    }

    let bottom: Vec<Point3> = face
        .boundary()
        .iter()
        .map(|p| Point3::new(p.x, p.y, 0.0))
        .collect();
    let top: Vec<Point3> = bottom.iter().map(|p| p + direction).collect();
    let n = bottom.len();

    let mut faces = Vec::with_capacity(n + 2);
    // boundary is CCW seen from +Z, so the bottom cap is reversed
    faces.push(PolyFace::new(bottom.iter().rev().copied().collect()));
    faces.push(PolyFace::new(top.clone()));
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(PolyFace::new(vec![bottom[i], bottom[j], top[j], top[i]]));
    }

    let mut solid = Solid::new(format!("SolidFrom_Wire{}", face.loop_index), faces);
    solid.orient_outward();
    Ok(solid)
}
