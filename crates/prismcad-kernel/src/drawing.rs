//! Edge extraction from DXF drawings.

use std::collections::HashMap;

use dxf::entities::{Entity, EntityType, Insert};
use dxf::{Block, Drawing, Point, Vector};
use prismcad_math::{Placement2, Point2, Vec2, Vec3};
use prismcad_sketch::{Edge, EdgeSet};
use tracing::{debug, warn};

use crate::ImportSettings;

/// Block references nested deeper than this are not expanded.
pub const MAX_BLOCK_DEPTH: usize = 16;

/// Collect the planar edges of a drawing in world coordinates.
///
/// `LINE`, `ARC`, `CIRCLE`, `LWPOLYLINE` and `POLYLINE` entities contribute
/// edges; polyline bulges become arcs and closed polylines get their closing
/// segment. Entity coordinate systems and `INSERT` block references are
/// resolved, Z coordinates are dropped and every coordinate is multiplied by
/// `settings.unit_scale`. Segments no longer than `tolerance` after scaling
/// are discarded.
///
/// Returns the edges together with the number of entities that were skipped
/// because they carry no planar edge geometry (text, dimensions, ...).
pub fn edges_from_drawing(
    drawing: &Drawing,
    settings: &ImportSettings,
    tolerance: f64,
) -> (EdgeSet, usize) {
    let mut collector = Collector {
        blocks: drawing.blocks().map(|b| (b.name.as_str(), b)).collect(),
        arc_segments: settings.arc_segments,
        edges: Vec::new(),
        skipped: 0,
    };
    let world = Placement2::scale(settings.unit_scale, settings.unit_scale);
    for entity in drawing.entities() {
        collector.entity(entity, &world, 0);
    }

    let edges = collector
        .edges
        .into_iter()
        .filter(|e| !e.is_degenerate(tolerance))
        .collect();
    (edges, collector.skipped)
}

struct Collector<'a> {
    blocks: HashMap<&'a str, &'a Block>,
    arc_segments: u32,
    edges: Vec<Edge>,
    skipped: usize,
}

impl<'a> Collector<'a> {
    fn push(&mut self, edge: Edge, placement: &Placement2) {
        self.edges.extend(edge.placed(placement, self.arc_segments));
    }

    fn entity(&mut self, entity: &'a Entity, outer: &Placement2, depth: usize) {
        match entity.specific {
            EntityType::Line(ref line) => {
                self.push(Edge::line(xy(&line.p1), xy(&line.p2)), outer);
            }
            EntityType::Arc(ref arc) => {
                let frame = ocs(&arc.normal, arc.center.z).then(outer);
                let edge =
                    Edge::arc_degrees(xy(&arc.center), arc.radius, arc.start_angle, arc.end_angle);
                self.push(edge, &frame);
            }
            EntityType::Circle(ref circle) => {
                let frame = ocs(&circle.normal, circle.center.z).then(outer);
                self.push(Edge::circle(xy(&circle.center), circle.radius), &frame);
            }
            EntityType::LwPolyline(ref poly) => {
                let frame = ocs(&poly.extrusion_direction, 0.0).then(outer);
                let vertices: Vec<(Point2, f64)> = poly
                    .vertices
                    .iter()
                    .map(|v| (Point2::new(v.x, v.y), v.bulge))
                    .collect();
                self.polyline(&vertices, poly.is_closed(), &frame);
            }
            EntityType::Polyline(ref poly) => {
                // 3D polylines are stored in world coordinates
                let frame = if poly.is_3d_polyline() {
                    *outer
                } else {
                    ocs(&poly.normal, poly.location.z).then(outer)
                };
                let vertices: Vec<(Point2, f64)> = poly
                    .vertices()
                    .map(|v| (xy(&v.location), v.bulge))
                    .collect();
                self.polyline(&vertices, poly.is_closed(), &frame);
            }
            EntityType::Insert(ref insert) => self.insert(insert, outer, depth),
            ref other => {
                debug!(kind = entity_kind(other), "skipping entity without edge geometry");
                self.skipped += 1;
            }
        }
    }

    /// One edge per polyline segment, plus the closing segment for closed ones.
    fn polyline(&mut self, vertices: &[(Point2, f64)], closed: bool, placement: &Placement2) {
        for pair in vertices.windows(2) {
            let (start, bulge) = pair[0];
            self.push(Edge::from_bulge(start, pair[1].0, bulge), placement);
        }
        if closed && vertices.len() > 2 {
            if let (Some(&(last, bulge)), Some(&(first, _))) = (vertices.last(), vertices.first()) {
                self.push(Edge::from_bulge(last, first, bulge), placement);
            }
        }
    }

    /// Expand a block reference, including its column/row array.
    fn insert(&mut self, insert: &Insert, outer: &Placement2, depth: usize) {
        let Some(block) = self.blocks.get(insert.name.as_str()).copied() else {
            warn!(block = %insert.name, "INSERT of an undefined block");
            self.skipped += 1;
            return;
        };
        if depth >= MAX_BLOCK_DEPTH {
            warn!(block = %insert.name, "block references nested too deeply");
            self.skipped += 1;
            return;
        }

        let local = Placement2::translation(-xy(&block.base_point).coords)
            .then(&Placement2::scale(insert.x_scale_factor, insert.y_scale_factor));
        let turn = Placement2::rotation(insert.rotation.to_radians())
            .then(&Placement2::translation(xy(&insert.location).coords))
            .then(&ocs(&insert.extrusion_direction, insert.location.z))
            .then(outer);
        for row in 0..insert.row_count.max(1) {
            for column in 0..insert.column_count.max(1) {
                let cell = Vec2::new(
                    f64::from(column) * insert.column_spacing,
                    f64::from(row) * insert.row_spacing,
                );
                let placement = local.then(&Placement2::translation(cell)).then(&turn);
                for entity in &block.entities {
                    self.entity(entity, &placement, depth + 1);
                }
            }
        }
    }
}

fn xy(p: &Point) -> Point2 {
    Point2::new(p.x, p.y)
}

/// An entity's object coordinate system seen from above.
///
/// Follows the DXF arbitrary axis algorithm: the OCS X axis is `Wy × N` when
/// the normal lies within 1/64 of world Z, `Wz × N` otherwise. A zero normal
/// falls back to the world frame.
fn ocs(normal: &Vector, elevation: f64) -> Placement2 {
    let Some(n) = Vec3::new(normal.x, normal.y, normal.z).try_normalize(1e-12) else {
        return Placement2::default();
    };
    let seed = if n.x.abs() < 1.0 / 64.0 && n.y.abs() < 1.0 / 64.0 {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let ax = seed.cross(&n).normalize();
    let ay = n.cross(&ax).normalize();
    Placement2::from_axes(
        Vec2::new(ax.x, ax.y),
        Vec2::new(ay.x, ay.y),
        Vec2::new(n.x, n.y) * elevation,
    )
}

fn entity_kind(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::Spline(_) => "SPLINE",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::ModelPoint(_) => "POINT",
        _ => "other",
    }
}
