//! 2D drawing edges.

use std::f64::consts::{PI, TAU};

use prismcad_math::{Placement2, Point2, Vec2};

/// A planar edge of an imported drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    /// A straight segment.
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// A circular arc.
    ///
    /// The arc runs from `start_angle` through a signed `sweep` (radians,
    /// positive = counter-clockwise). A full circle has `|sweep| == 2π`.
    Arc {
        /// Arc center.
        center: Point2,
        /// Arc radius.
        radius: f64,
        /// Angle of the start point (radians).
        start_angle: f64,
        /// Signed angular extent (radians).
        sweep: f64,
    },
}

impl Edge {
    /// Straight segment between two points.
    pub fn line(start: Point2, end: Point2) -> Self {
        Edge::Line { start, end }
    }

    /// Counter-clockwise arc between two angles given in degrees.
    ///
    /// Equal start and end angles describe a full circle.
    pub fn arc_degrees(center: Point2, radius: f64, start_deg: f64, end_deg: f64) -> Self {
        let mut sweep = (end_deg - start_deg).rem_euclid(360.0);
        if sweep == 0.0 {
            sweep = 360.0;
        }
        Edge::Arc {
            center,
            radius,
            start_angle: start_deg.to_radians(),
            sweep: sweep.to_radians(),
        }
    }

    /// Full counter-clockwise circle starting at angle zero.
    pub fn circle(center: Point2, radius: f64) -> Self {
        Edge::Arc {
            center,
            radius,
            start_angle: 0.0,
            sweep: TAU,
        }
    }

    /// Segment of a polyline with a bulge factor.
    ///
    /// The bulge is the tangent of a quarter of the included angle; positive
    /// bulges turn counter-clockwise. A zero bulge yields a straight line.
    pub fn from_bulge(start: Point2, end: Point2, bulge: f64) -> Self {
        let chord = end - start;
        let c = chord.norm();
        if bulge.abs() < 1e-12 || c < 1e-12 {
            return Edge::line(start, end);
        }
        let theta = 4.0 * bulge.atan();
        let u = chord / c;
        let left = Vec2::new(-u.y, u.x);
        let mid = start + chord / 2.0;
        let center = mid + left * (c / (2.0 * (theta / 2.0).tan()));
        let radius = (c / (2.0 * (theta / 2.0).sin())).abs();
        let d = start - center;
        Edge::Arc {
            center,
            radius,
            start_angle: d.y.atan2(d.x),
            sweep: theta,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            Edge::Line { start, end } => start + (end - start) * t,
            Edge::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let a = start_angle + sweep * t;
                Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            }
        }
    }

    /// Get the start point of this edge.
    pub fn start(&self) -> Point2 {
        match self {
            Edge::Line { start, .. } => *start,
            Edge::Arc { .. } => self.point_at(0.0),
        }
    }

    /// Get the end point of this edge.
    pub fn end(&self) -> Point2 {
        match self {
            Edge::Line { end, .. } => *end,
            Edge::Arc { .. } => self.point_at(1.0),
        }
    }

    /// Get the length of this edge.
    pub fn length(&self) -> f64 {
        match self {
            Edge::Line { start, end } => (end - start).norm(),
            Edge::Arc { radius, sweep, .. } => radius * sweep.abs(),
        }
    }

    /// True for an arc covering a whole turn.
    pub fn is_full_circle(&self) -> bool {
        matches!(self, Edge::Arc { sweep, .. } if sweep.abs() >= TAU - 1e-12)
    }

    /// Check if this edge is shorter than `tolerance`.
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        match self {
            Edge::Line { .. } => self.length() <= tolerance,
            Edge::Arc { radius, .. } => *radius <= tolerance || self.length() <= tolerance,
        }
    }

    /// The same edge traversed the other way.
    pub fn reversed(&self) -> Self {
        match self {
            Edge::Line { start, end } => Edge::line(*end, *start),
            Edge::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Edge::Arc {
                center: *center,
                radius: *radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
        }
    }

    /// Map through a placement.
    ///
    /// Arcs stay arcs under maps that keep circles round, with the sweep
    /// flipped by mirroring maps. Under any other map an arc becomes chords,
    /// `segments_per_turn` per full turn.
    pub fn placed(&self, placement: &Placement2, segments_per_turn: u32) -> Vec<Edge> {
        match self {
            Edge::Line { start, end } => vec![Edge::line(
                placement.apply_point(start),
                placement.apply_point(end),
            )],
            Edge::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => match placement.similarity_scale() {
                Some(scale) => {
                    let d = placement.apply_vec(&Vec2::new(start_angle.cos(), start_angle.sin()));
                    let turn = if placement.is_mirroring() { -1.0 } else { 1.0 };
                    vec![Edge::Arc {
                        center: placement.apply_point(center),
                        radius: radius * scale,
                        start_angle: d.y.atan2(d.x),
                        sweep: sweep * turn,
                    }]
                }
                None => {
                    let mut points: Vec<Point2> = self
                        .sample(segments_per_turn)
                        .iter()
                        .map(|p| placement.apply_point(p))
                        .collect();
                    points.push(placement.apply_point(&self.end()));
                    points.windows(2).map(|w| Edge::line(w[0], w[1])).collect()
                }
            },
        }
    }

    /// Discretize into points from the start up to, but excluding, the end.
    ///
    /// Arcs use `segments_per_turn` chords per full turn, with at least two
    /// chords per arc and three per full circle so closed loops made only of
    /// arcs still enclose area.
    pub fn sample(&self, segments_per_turn: u32) -> Vec<Point2> {
        match self {
            Edge::Line { start, .. } => vec![*start],
            Edge::Arc { sweep, .. } => {
                let turns = sweep.abs() / TAU;
                let min = if self.is_full_circle() { 3 } else { 2 };
                let n = ((turns * segments_per_turn as f64).ceil() as usize).max(min);
                (0..n).map(|i| self.point_at(i as f64 / n as f64)).collect()
            }
        }
    }

    /// Angular extent in degrees, zero for lines.
    pub fn sweep_degrees(&self) -> f64 {
        match self {
            Edge::Line { .. } => 0.0,
            Edge::Arc { sweep, .. } => sweep * 180.0 / PI,
        }
    }
}

/// An unordered collection of edges loaded from a drawing.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    /// Wrap a list of edges.
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Append an edge.
    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// The edges in load order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when no edges were loaded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arc_degrees_wraps() {
        let arc = Edge::arc_degrees(Point2::origin(), 1.0, 270.0, 90.0);
        assert_relative_eq!(arc.sweep_degrees(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(arc.start().y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.end().y, 1.0, epsilon = 1e-12);

        let full = Edge::arc_degrees(Point2::origin(), 1.0, 45.0, 45.0);
        assert!(full.is_full_circle());
    }

    #[test]
    fn test_bulge_semicircle() {
        // bulge 1 = half circle turning left
        let e = Edge::from_bulge(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), 1.0);
        match &e {
            Edge::Arc { center, radius, .. } => {
                assert_relative_eq!(center.x, 1.0, epsilon = 1e-12);
                assert_relative_eq!(center.y, 0.0, epsilon = 1e-12);
                assert_relative_eq!(*radius, 1.0, epsilon = 1e-12);
            }
            other => panic!("expected arc, got {other:?}"),
        }
        assert_relative_eq!(e.end().x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(e.end().y, 0.0, epsilon = 1e-12);
        // counter-clockwise from (0,0) to (2,0) about (1,0) passes below
        assert_relative_eq!(e.point_at(0.5).y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_bulge_is_line() {
        let e = Edge::from_bulge(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), 0.0);
        assert!(matches!(e, Edge::Line { .. }));
    }

    #[test]
    fn test_reversed_arc_swaps_ends() {
        let arc = Edge::arc_degrees(Point2::new(1.0, 1.0), 2.0, 0.0, 90.0);
        let rev = arc.reversed();
        assert_relative_eq!((rev.start() - arc.end()).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((rev.end() - arc.start()).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(rev.length(), arc.length(), epsilon = 1e-12);
    }

    #[test]
    fn test_sample_counts() {
        let line = Edge::line(Point2::origin(), Point2::new(1.0, 0.0));
        assert_eq!(line.sample(32).len(), 1);

        let circle = Edge::circle(Point2::origin(), 1.0);
        assert_eq!(circle.sample(32).len(), 32);
        assert_eq!(circle.sample(1).len(), 3);

        let small = Edge::arc_degrees(Point2::origin(), 1.0, 0.0, 1.0);
        assert_eq!(small.sample(32).len(), 2);
    }

    #[test]
    fn test_degenerate() {
        let e = Edge::line(Point2::origin(), Point2::new(1e-9, 0.0));
        assert!(e.is_degenerate(1e-6));
        let c = Edge::circle(Point2::origin(), 0.0);
        assert!(c.is_degenerate(1e-6));
    }

    #[test]
    fn test_mirrored_arc_keeps_its_ends() {
        let arc = Edge::arc_degrees(Point2::new(-5.0, 0.0), 5.0, 0.0, 180.0);
        let placed = arc.placed(&Placement2::scale(-1.0, 1.0), 32);
        assert_eq!(placed.len(), 1);
        let mirrored = &placed[0];
        assert_relative_eq!(mirrored.start().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(mirrored.end().x, 10.0, epsilon = 1e-9);
        // still bulges upward, now turning clockwise
        assert_relative_eq!(mirrored.point_at(0.5).y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(mirrored.sweep_degrees(), -180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stretched_arc_becomes_chords() {
        let arc = Edge::arc_degrees(Point2::new(0.0, 0.0), 1.0, 0.0, 90.0);
        let placed = arc.placed(&Placement2::scale(2.0, 1.0), 32);
        assert_eq!(placed.len(), 8);
        assert_relative_eq!(placed[0].start().x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(placed[7].end().y, 1.0, epsilon = 1e-9);
        assert!(placed.iter().all(|e| matches!(e, Edge::Line { .. })));
    }

    #[test]
    fn test_uniform_scale_keeps_circles() {
        let circle = Edge::circle(Point2::new(1.0, 0.0), 2.0);
        let scaled = circle.placed(&Placement2::scale(10.0, 10.0), 32);
        assert!(scaled[0].is_full_circle());
        match &scaled[0] {
            Edge::Arc { center, radius, .. } => {
                assert_relative_eq!(center.x, 10.0);
                assert_relative_eq!(*radius, 20.0);
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }
}
