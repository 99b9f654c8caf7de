//! Chaining loose edges into wires and closing them.

use std::collections::VecDeque;

use prismcad_math::{Aabb2, Point2, Tolerance};
use rstar::{RTree, AABB};
use serde::{Deserialize, Serialize};

use crate::{Edge, SketchError};

/// Tolerances for wire building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireSettings {
    /// Endpoints closer than this are the same vertex.
    pub tolerance: f64,
    /// Open wires whose end gap is strictly below this are closed with a
    /// straight segment.
    pub repair_tolerance: f64,
}

impl Default for WireSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.linear,
            repair_tolerance: 0.01,
        }
    }
}

/// Edge endpoint stored in the spatial index.
#[derive(Debug, Clone, Copy)]
struct EndpointEnvelope {
    point: [f64; 2],
    index: usize,
}

impl rstar::RTreeObject for EndpointEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl rstar::PointDistance for EndpointEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Union-find over endpoint slots.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // keep the lowest slot as root so numbering follows load order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Group edges into chains of edges meeting end to start.
///
/// Endpoints within `tolerance` of each other are merged into one vertex
/// (transitively). Each chain is grown from the lowest-index unused edge,
/// first forward from its end and then backward from its start, always
/// taking the lowest-index unused edge at the current vertex and reversing
/// it when it points the wrong way. Branching vertices therefore split into
/// several chains. Full circles always form a chain of their own.
///
/// The result depends only on the input order, never on hashing.
pub fn sort_into_wires(edges: &[Edge], tolerance: f64) -> Vec<Vec<Edge>> {
    if edges.is_empty() {
        return Vec::new();
    }

    // slot 2i = start of edge i, slot 2i+1 = end of edge i
    let slots: Vec<Point2> = edges.iter().flat_map(|e| [e.start(), e.end()]).collect();
    let tree = RTree::bulk_load(
        slots
            .iter()
            .enumerate()
            .map(|(index, p)| EndpointEnvelope {
                point: [p.x, p.y],
                index,
            })
            .collect(),
    );

    let mut sets = DisjointSet::new(slots.len());
    let r2 = tolerance * tolerance;
    for (i, p) in slots.iter().enumerate() {
        for hit in tree.locate_within_distance([p.x, p.y], r2) {
            sets.union(i, hit.index);
        }
    }

    // dense vertex ids in order of first appearance
    let mut node_of_root = vec![usize::MAX; slots.len()];
    let mut next_node = 0;
    let mut node = |sets: &mut DisjointSet, slot: usize| {
        let root = sets.find(slot);
        if node_of_root[root] == usize::MAX {
            node_of_root[root] = next_node;
            next_node += 1;
        }
        node_of_root[root]
    };
    let ends: Vec<(usize, usize)> = (0..edges.len())
        .map(|i| (node(&mut sets, 2 * i), node(&mut sets, 2 * i + 1)))
        .collect();

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); next_node];
    for (i, &(a, b)) in ends.iter().enumerate() {
        incident[a].push(i);
        if b != a {
            incident[b].push(i);
        }
    }

    let is_loop = |i: usize| ends[i].0 == ends[i].1 || edges[i].is_full_circle();
    let mut used = vec![false; edges.len()];
    let next_unused = |used: &mut Vec<bool>, at: usize| -> Option<usize> {
        let found = incident[at]
            .iter()
            .copied()
            .find(|&e| !used[e] && !is_loop(e))?;
        used[found] = true;
        Some(found)
    };

    let mut wires = Vec::new();
    for seed in 0..edges.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        if is_loop(seed) {
            wires.push(vec![edges[seed].clone()]);
            continue;
        }
        let mut chain: VecDeque<(usize, bool)> = VecDeque::from([(seed, true)]);
        let (mut head, mut tail) = ends[seed];

        while tail != head {
            let Some(e) = next_unused(&mut used, tail) else {
                break;
            };
            let forward = ends[e].0 == tail;
            tail = if forward { ends[e].1 } else { ends[e].0 };
            chain.push_back((e, forward));
        }
        while tail != head {
            let Some(e) = next_unused(&mut used, head) else {
                break;
            };
            let forward = ends[e].1 == head;
            head = if forward { ends[e].0 } else { ends[e].1 };
            chain.push_front((e, forward));
        }

        wires.push(
            chain
                .into_iter()
                .map(|(e, forward)| {
                    if forward {
                        edges[e].clone()
                    } else {
                        edges[e].reversed()
                    }
                })
                .collect(),
        );
    }
    wires
}

/// An ordered chain of edges, possibly open.
#[derive(Debug, Clone, Default)]
pub struct Wire {
    edges: Vec<Edge>,
}

impl Wire {
    /// Wrap an ordered edge chain.
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// The edges in traversal order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Start point of the first edge.
    pub fn first_vertex(&self) -> Option<Point2> {
        self.edges.first().map(Edge::start)
    }

    /// End point of the last edge.
    pub fn last_vertex(&self) -> Option<Point2> {
        self.edges.last().map(Edge::end)
    }

    /// Distance between the last and first vertex (infinite when empty).
    pub fn gap(&self) -> f64 {
        match (self.first_vertex(), self.last_vertex()) {
            (Some(first), Some(last)) => (last - first).norm(),
            _ => f64::INFINITY,
        }
    }

    /// True if the wire ends where it starts, within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        self.gap() <= tolerance
    }

    /// Bounding box of the edge endpoints.
    pub fn bounds(&self) -> Aabb2 {
        let mut bb = Aabb2::empty();
        for e in &self.edges {
            bb.include_point(&e.start());
            bb.include_point(&e.end());
        }
        bb
    }

    /// Accept a closed wire, or repair a small gap with a straight segment.
    ///
    /// `index` is the wire's discovery order and is carried into the result.
    pub fn close(mut self, index: usize, settings: &WireSettings) -> Result<ClosedLoop, SketchError> {
        let (Some(first), Some(last)) = (self.first_vertex(), self.last_vertex()) else {
            return Err(SketchError::EmptyWire);
        };
        if self.is_closed(settings.tolerance) {
            return Ok(ClosedLoop {
                index,
                edges: self.edges,
                repaired: false,
            });
        }

        let gap = (last - first).norm();
        if gap >= settings.repair_tolerance {
            return Err(SketchError::GapTooLarge {
                gap,
                tolerance: settings.repair_tolerance,
            });
        }
        self.edges.push(Edge::line(last, first));
        if !self.is_closed(settings.tolerance) {
            return Err(SketchError::NotClosed(self.gap()));
        }
        Ok(ClosedLoop {
            index,
            edges: self.edges,
            repaired: true,
        })
    }
}

/// A wire known to be closed.
#[derive(Debug, Clone)]
pub struct ClosedLoop {
    /// Discovery order of the wire this loop came from.
    pub index: usize,
    edges: Vec<Edge>,
    /// True when a closing segment was added.
    pub repaired: bool,
}

impl ClosedLoop {
    /// Axis-aligned rectangle loop, counter-clockwise from `bounds.min`.
    pub fn rectangle(index: usize, bounds: &Aabb2) -> Self {
        let p = [
            bounds.min,
            Point2::new(bounds.max.x, bounds.min.y),
            bounds.max,
            Point2::new(bounds.min.x, bounds.max.y),
        ];
        Self {
            index,
            edges: (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect(),
            repaired: false,
        }
    }

    /// The edges in traversal order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Always false for loops built by [`Wire::close`].
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
