//! Planar faces filled from closed loops.

use prismcad_math::{Aabb2, Point2};

use crate::{ClosedLoop, SketchError};

/// A simple polygonal region in the drawing plane.
///
/// The boundary is stored counter-clockwise and implicitly closed. Its first
/// vertex is the start point of the loop's first edge, which is what the
/// nesting classifier samples by default.
#[derive(Debug, Clone)]
pub struct Face {
    /// Discovery index of the loop this face was filled from.
    pub loop_index: usize,
    boundary: Vec<Point2>,
    area: f64,
}

impl Face {
    /// Fill a closed loop, discretizing arcs with `arc_segments` chords per turn.
    ///
    /// Fails when the boundary has fewer than three distinct vertices,
    /// encloses no area, or crosses itself.
    pub fn from_loop(
        closed: &ClosedLoop,
        arc_segments: u32,
        tolerance: f64,
    ) -> Result<Self, SketchError> {
        let mut points: Vec<Point2> = Vec::new();
        for edge in closed.edges() {
            for p in edge.sample(arc_segments) {
                if points.last().is_some_and(|q| (p - q).norm() <= tolerance) {
                    continue;
                }
                points.push(p);
            }
        }
        while points.len() > 1
            && points
                .last()
                .zip(points.first())
                .is_some_and(|(l, f)| (l - f).norm() <= tolerance)
        {
            points.pop();
        }
        Self::from_points(closed.index, points, tolerance)
    }

    /// Build a face from an explicit boundary polygon.
    pub fn from_points(
        loop_index: usize,
        mut points: Vec<Point2>,
        tolerance: f64,
    ) -> Result<Self, SketchError> {
        if points.len() < 3 {
            return Err(SketchError::TooFewVertices(points.len()));
        }
        let signed = signed_area(&points);
        if signed.abs() <= tolerance * tolerance {
            return Err(SketchError::ZeroArea(signed.abs()));
        }
        if let Some((first, second)) = find_self_intersection(&points) {
            return Err(SketchError::SelfIntersecting { first, second });
        }
        if signed < 0.0 {
            points[1..].reverse();
        }
        Ok(Self {
            loop_index,
            boundary: points,
            area: signed.abs(),
        })
    }

    /// Boundary vertices, counter-clockwise.
    pub fn boundary(&self) -> &[Point2] {
        &self.boundary
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// First boundary vertex.
    pub fn first_vertex(&self) -> Point2 {
        self.boundary[0]
    }

    /// Area centroid of the boundary polygon.
    pub fn centroid(&self) -> Point2 {
        let n = self.boundary.len();
        let (mut cx, mut cy, mut a2) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let p = self.boundary[i];
            let q = self.boundary[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
            a2 += cross;
        }
        Point2::new(cx / (3.0 * a2), cy / (3.0 * a2))
    }

    /// Bounding box of the boundary.
    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_points(self.boundary.iter())
    }

    /// Shortest distance from `p` to the boundary.
    pub fn distance_to_boundary(&self, p: &Point2) -> f64 {
        let n = self.boundary.len();
        (0..n)
            .map(|i| point_segment_distance(p, &self.boundary[i], &self.boundary[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Point-in-polygon test.
    ///
    /// Points within `tolerance` of the boundary are on it: inside unless
    /// `strict` is set. Everything else uses the even-odd crossing rule.
    pub fn contains_point(&self, p: &Point2, tolerance: f64, strict: bool) -> bool {
        if self.distance_to_boundary(p) <= tolerance {
            return !strict;
        }
        let n = self.boundary.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.boundary[i];
            let b = self.boundary[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut a2 = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        a2 += p.x * q.y - q.x * p.y;
    }
    a2 / 2.0
}

fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: &Point2, a: &Point2, b: &Point2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_intersect(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(a, c, d))
        || (d2 == 0.0 && on_segment(b, c, d))
        || (d3 == 0.0 && on_segment(c, a, b))
        || (d4 == 0.0 && on_segment(d, a, b))
}

/// First pair of non-adjacent boundary segments that touch or cross.
fn find_self_intersection(points: &[Point2]) -> Option<(usize, usize)> {
    let n = points.len();
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (&points[j], &points[(j + 1) % n]);
            if segments_intersect(a, b, c, d) {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Wire, WireSettings};
    use approx::assert_relative_eq;

    fn square_loop(x: f64, y: f64, s: f64, clockwise: bool) -> ClosedLoop {
        let mut p = vec![
            Point2::new(x, y),
            Point2::new(x + s, y),
            Point2::new(x + s, y + s),
            Point2::new(x, y + s),
        ];
        if clockwise {
            p[1..].reverse();
        }
        let edges = (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect();
        Wire::new(edges).close(0, &WireSettings::default()).unwrap()
    }

    #[test]
    fn test_square_face() {
        let face = Face::from_loop(&square_loop(0.0, 0.0, 10.0, false), 32, 1e-6).unwrap();
        assert_eq!(face.boundary().len(), 4);
        assert_relative_eq!(face.area(), 100.0, epsilon = 1e-9);
        let c = face.centroid();
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clockwise_loop_keeps_first_vertex() {
        let face = Face::from_loop(&square_loop(2.0, 3.0, 1.0, true), 32, 1e-6).unwrap();
        assert_relative_eq!(face.first_vertex().x, 2.0);
        assert_relative_eq!(face.first_vertex().y, 3.0);
        assert_relative_eq!(signed_area(face.boundary()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_circle_face_area() {
        let wire = Wire::new(vec![Edge::circle(Point2::origin(), 1.0)]);
        let closed = wire.close(0, &WireSettings::default()).unwrap();
        let face = Face::from_loop(&closed, 256, 1e-6).unwrap();
        assert_eq!(face.boundary().len(), 256);
        assert_relative_eq!(face.area(), std::f64::consts::PI, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_boundaries() {
        let flat = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(matches!(
            Face::from_points(0, flat, 1e-6),
            Err(SketchError::ZeroArea(_))
        ));
        let two = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert_eq!(
            Face::from_points(0, two, 1e-6).unwrap_err(),
            SketchError::TooFewVertices(2)
        );
    }

    #[test]
    fn test_bow_tie_rejected() {
        let bow = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(matches!(
            Face::from_points(0, bow, 1e-6),
            Err(SketchError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_contains_point_boundary_modes() {
        let face = Face::from_loop(&square_loop(0.0, 0.0, 10.0, false), 32, 1e-6).unwrap();
        assert!(face.contains_point(&Point2::new(5.0, 5.0), 1e-3, true));
        assert!(!face.contains_point(&Point2::new(15.0, 5.0), 1e-3, true));

        let edge = Point2::new(0.0, 5.0);
        assert!(!face.contains_point(&edge, 1e-3, true));
        assert!(face.contains_point(&edge, 1e-3, false));
        // just outside but within tolerance
        let near = Point2::new(-0.0005, 5.0);
        assert!(face.contains_point(&near, 1e-3, false));
    }

    #[test]
    fn test_concave_containment() {
        // L-shape: the notch corner is outside
        let l = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let face = Face::from_points(0, l, 1e-6).unwrap();
        assert!(face.contains_point(&Point2::new(0.5, 3.0), 1e-3, true));
        assert!(!face.contains_point(&Point2::new(3.0, 3.0), 1e-3, true));
        assert_relative_eq!(face.area(), 7.0, epsilon = 1e-12);
    }
}
