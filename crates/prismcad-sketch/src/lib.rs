#![warn(missing_docs)]

//! Planar drawing reconstruction for prismcad.
//!
//! Turns an unordered soup of 2D edges into extruded solids:
//!
//! 1. [`sort_into_wires`] chains edges whose endpoints meet within a tolerance.
//! 2. [`Wire::close`] accepts closed chains and repairs small gaps.
//! 3. [`Face::from_loop`] fills each closed loop; [`nesting_depths`] counts
//!    how many other faces contain a sample point of each face.
//! 4. [`extrude`] sweeps a face along a height vector chosen by
//!    [`height_for_depth`]; [`base_plate_bounds`] sizes the optional plate.
//!
//! # Example
//!
//! ```
//! use prismcad_math::{Point2, Vec3};
//! use prismcad_sketch::{sort_into_wires, extrude, Edge, Face, Wire, WireSettings};
//!
//! let p = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let edges: Vec<Edge> = (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect();
//!
//! let chains = sort_into_wires(&edges, 1e-6);
//! let closed = Wire::new(chains[0].clone())
//!     .close(0, &WireSettings::default())
//!     .unwrap();
//! let face = Face::from_loop(&closed, 32, 1e-6).unwrap();
//! let solid = extrude(&face, Vec3::new(0.0, 0.0, 1.0)).unwrap();
//! assert_eq!(solid.faces.len(), 6);
//! ```

mod classify;
mod edge;
mod extrude;
mod face;
mod wire;

pub use classify::{classify, nesting_depths, ClassifySettings, SamplePoint};
pub use edge::{Edge, EdgeSet};
pub use extrude::{
    base_plate_bounds, extrude, height_for_depth, BASE_PLATE_HEIGHT_FACTOR, BASE_PLATE_MARGIN,
    ODD_DEPTH_HEIGHT_FACTOR,
};
pub use face::Face;
pub use wire::{sort_into_wires, ClosedLoop, Wire, WireSettings};

use thiserror::Error;

/// Errors from wire, face and extrusion construction.
///
/// All of these are per-entity failures: the pipeline logs them and skips
/// the offending wire or face.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    /// The wire has no edges.
    #[error("wire has no edges")]
    EmptyWire,

    /// The wire is still open after repair.
    #[error("wire is not closed: gap of {0:.6}")]
    NotClosed(f64),

    /// The gap between the wire ends is too large to repair.
    #[error("gap of {gap:.6} is not below the repair tolerance {tolerance}")]
    GapTooLarge {
        /// Distance between first and last vertex.
        gap: f64,
        /// Repair tolerance in force.
        tolerance: f64,
    },

    /// The boundary collapses to fewer than three distinct vertices.
    #[error("boundary has only {0} distinct vertices")]
    TooFewVertices(usize),

    /// The boundary encloses no area.
    #[error("boundary encloses zero area ({0:.3e})")]
    ZeroArea(f64),

    /// Two non-adjacent boundary segments intersect.
    #[error("boundary segments {first} and {second} intersect")]
    SelfIntersecting {
        /// Index of the first segment.
        first: usize,
        /// Index of the second segment.
        second: usize,
    },

    /// Extrusion direction has zero length.
    #[error("extrusion direction is zero")]
    ZeroExtrusion,

    /// Extrusion direction lies in the drawing plane.
    #[error("extrusion direction is parallel to the drawing plane")]
    InPlaneExtrusion,
}
