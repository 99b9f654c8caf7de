//! Planar face triangulation.

use prismcad_brep::{PolyFace, Shape, Solid};
use prismcad_math::{Point2, Point3};

use crate::TriangleMesh;

/// Triangulate every face of every solid in a shape.
pub fn tessellate_shape(shape: &Shape) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for solid in shape.solids() {
        mesh.merge(&tessellate_solid(solid));
    }
    mesh
}

/// Triangulate every face of a solid.
pub fn tessellate_solid(solid: &Solid) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for face in &solid.faces {
        mesh.merge(&tessellate_face(face));
    }
    mesh
}

/// Triangulate a planar face, keeping its winding.
///
/// The face is projected onto the coordinate plane most perpendicular to its
/// normal, holes are bridged into the outer loop at their closest vertex
/// pair, and the merged polygon is ear-clipped. Degenerate faces give an
/// empty mesh.
pub fn tessellate_face(face: &PolyFace) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let Some(normal) = face.normal() else {
        tracing::debug!("skipping degenerate face with {} vertices", face.outer.len());
        return mesh;
    };
    if face.outer.len() < 3 {
        return mesh;
    }

    let abs = normal.abs();
    let axis = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    // cyclic (u, v) so the projection of a loop facing +axis is counter-clockwise
    let project = |p: &Point3| match axis {
        0 => Point2::new(p.y, p.z),
        1 => Point2::new(p.z, p.x),
        _ => Point2::new(p.x, p.y),
    };
    let ccw = normal[axis] > 0.0;

    let shading = [normal.x as f32, normal.y as f32, normal.z as f32];
    let mut flat = Vec::new();
    let mut ring = Vec::new();
    for (k, p) in face.outer.iter().enumerate() {
        mesh.push_vertex(p, shading);
        flat.push(project(p));
        ring.push(k);
    }
    for hole in &face.holes {
        let start = flat.len();
        for p in hole {
            mesh.push_vertex(p, shading);
            flat.push(project(p));
        }
        if hole.len() >= 3 {
            ring = bridge_hole(&flat, &ring, start, hole.len());
        }
    }

    clip_ears(&flat, ring, if ccw { 1.0 } else { -1.0 }, &mut mesh.indices);
    mesh
}

/// Splice a hole into the polygon at the closest (polygon, hole) vertex pair.
fn bridge_hole(flat: &[Point2], ring: &[usize], start: usize, len: usize) -> Vec<usize> {
    let hole = start..start + len;
    let (_, h, r) = hole
        .flat_map(|h| ring.iter().enumerate().map(move |(r, &o)| (h, r, o)))
        .map(|(h, r, o)| ((flat[o] - flat[h]).norm_squared(), h, r))
        .fold((f64::INFINITY, start, 0), |best, cand| if cand.0 < best.0 { cand } else { best });

    let mut merged = Vec::with_capacity(ring.len() + len + 2);
    merged.extend_from_slice(&ring[..=r]);
    merged.extend((0..=len).map(|k| start + (h - start + k) % len));
    merged.push(ring[r]);
    merged.extend_from_slice(&ring[r + 1..]);
    merged
}

/// Twice the signed area of `abc`, positive when counter-clockwise.
fn turn(a: Point2, b: Point2, c: Point2) -> f64 {
    (b - a).perp(&(c - a))
}

/// Interior test that excludes the triangle's edges and corners.
fn strictly_inside(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    const EPS: f64 = 1e-12;
    let s = turn(a, b, c).signum();
    turn(a, b, p) * s > EPS && turn(b, c, p) * s > EPS && turn(c, a, p) * s > EPS
}

/// Ear clipping of `ring`, whose orientation in the plane is `sign`
/// (+1 counter-clockwise). Triangles keep the ring's winding; if no ear
/// can be found the rest is fanned.
fn clip_ears(flat: &[Point2], mut ring: Vec<usize>, sign: f64, out: &mut Vec<u32>) {
    let emit = |out: &mut Vec<u32>, tri: [usize; 3]| out.extend(tri.map(|i| i as u32));

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| {
            let tri = [ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]];
            let [a, b, c] = tri.map(|k| flat[k]);
            turn(a, b, c) * sign > 0.0
                && !ring
                    .iter()
                    .filter(|&&k| !tri.contains(&k))
                    .any(|&k| strictly_inside(flat[k], a, b, c))
        });

        match ear {
            Some(i) => {
                emit(out, [ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
                ring.remove(i);
            }
            None => {
                tracing::debug!("no ear among {n} vertices, fanning the remainder");
                for k in 1..n - 1 {
                    emit(out, [ring[0], ring[k], ring[k + 1]]);
                }
                return;
            }
        }
    }

    if let [a, b, c] = ring[..] {
        emit(out, [a, b, c]);
    }
}
