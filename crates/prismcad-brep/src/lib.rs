#![warn(missing_docs)]

//! Planar polyhedral B-rep for prismcad.
//!
//! Every solid produced by the pipeline is bounded by planar polygons: two
//! caps and one quad per boundary segment for extrusions, one triangle per
//! facet for meshes. A [`Shape`] is what gets handed to an exporter: either a
//! single [`Solid`] or a compound of several solids grouped without fusion.

use prismcad_math::{Aabb3, Point3, Transform, Vec3};

/// A planar face bounded by an outer polygon and optional holes.
///
/// The outer loop is counter-clockwise when viewed from outside the solid.
/// Holes are wound the opposite way.
#[derive(Debug, Clone)]
pub struct PolyFace {
    /// Outer boundary vertices (implicitly closed).
    pub outer: Vec<Point3>,
    /// Inner boundaries (holes), implicitly closed.
    pub holes: Vec<Vec<Point3>>,
}

impl PolyFace {
    /// Create a face without holes.
    pub fn new(outer: Vec<Point3>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a face with holes.
    pub fn with_holes(outer: Vec<Point3>, holes: Vec<Vec<Point3>>) -> Self {
        Self { outer, holes }
    }

    /// Area-weighted normal of the outer loop (Newell's method).
    ///
    /// The length equals twice the polygon area.
    pub fn area_vector(&self) -> Vec3 {
        newell(&self.outer)
    }

    /// Unit normal, or `None` for a degenerate face.
    pub fn normal(&self) -> Option<Vec3> {
        let n = self.area_vector();
        let len = n.norm();
        if len < 1e-15 {
            None
        } else {
            Some(n / len)
        }
    }

    /// Face area with holes subtracted.
    pub fn area(&self) -> f64 {
        let outer = self.area_vector().norm() / 2.0;
        let holes: f64 = self.holes.iter().map(|h| newell(h).norm() / 2.0).sum();
        outer - holes
    }

    /// Reverse the winding of all loops.
    pub fn reversed(&self) -> Self {
        let flip = |l: &Vec<Point3>| l.iter().rev().copied().collect::<Vec<_>>();
        Self {
            outer: flip(&self.outer),
            holes: self.holes.iter().map(flip).collect(),
        }
    }

    /// Apply a transform; mirroring transforms keep the winding outward.
    pub fn transformed(&self, t: &Transform) -> Self {
        let map = |l: &Vec<Point3>| l.iter().map(|p| t.apply_point(p)).collect::<Vec<_>>();
        let face = Self {
            outer: map(&self.outer),
            holes: self.holes.iter().map(map).collect(),
        };
        if t.is_mirroring() {
            face.reversed()
        } else {
            face
        }
    }

    /// All loops, outer first.
    pub fn loops(&self) -> impl Iterator<Item = &Vec<Point3>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }
}

fn newell(points: &[Point3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// A closed polyhedral solid.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Object name, used as the STEP product/body label.
    pub name: String,
    /// Boundary faces.
    pub faces: Vec<PolyFace>,
}

impl Solid {
    /// Create a solid from its boundary faces.
    pub fn new(name: impl Into<String>, faces: Vec<PolyFace>) -> Self {
        Self {
            name: name.into(),
            faces,
        }
    }

    /// Check if the solid has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Signed enclosed volume (positive when faces point outward).
    ///
    /// Sums the signed tetrahedra spanned by the origin and a fan over each
    /// loop; fans of planar polygons add up to the exact polygon even when
    /// the polygon is concave.
    pub fn signed_volume(&self) -> f64 {
        let mut six_v = 0.0;
        for face in &self.faces {
            for ring in face.loops() {
                if ring.len() < 3 {
                    continue;
                }
                let a = ring[0].coords;
                for w in ring[1..].windows(2) {
                    six_v += a.dot(&w[0].coords.cross(&w[1].coords));
                }
            }
        }
        six_v / 6.0
    }

    /// Flip every face when the solid is inside out.
    pub fn orient_outward(&mut self) {
        if self.signed_volume() < 0.0 {
            for face in &mut self.faces {
                *face = face.reversed();
            }
        }
    }

    /// Apply a transform to every face.
    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            name: self.name.clone(),
            faces: self.faces.iter().map(|f| f.transformed(t)).collect(),
        }
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Aabb3 {
        let mut bb = Aabb3::empty();
        for face in &self.faces {
            for p in &face.outer {
                bb.include_point(p);
            }
        }
        bb
    }
}

/// An exportable shape.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A single solid.
    Solid(Solid),
    /// Several solids grouped without boolean fusion.
    Compound(Vec<Solid>),
}

impl Shape {
    /// Group solids for export: `None` when empty, a bare solid when there is
    /// exactly one, a compound otherwise.
    pub fn from_solids(mut solids: Vec<Solid>) -> Option<Self> {
        match solids.len() {
            0 => None,
            1 => solids.pop().map(Shape::Solid),
            _ => Some(Shape::Compound(solids)),
        }
    }

    /// The solids making up this shape.
    pub fn solids(&self) -> &[Solid] {
        match self {
            Shape::Solid(s) => std::slice::from_ref(s),
            Shape::Compound(v) => v,
        }
    }

    /// Consume the shape, returning its solids.
    pub fn into_solids(self) -> Vec<Solid> {
        match self {
            Shape::Solid(s) => vec![s],
            Shape::Compound(v) => v,
        }
    }

    /// True for a compound.
    pub fn is_compound(&self) -> bool {
        matches!(self, Shape::Compound(_))
    }

    /// Apply a transform to every solid (a scaled clone when `t` scales).
    pub fn transformed(&self, t: &Transform) -> Self {
        match self {
            Shape::Solid(s) => Shape::Solid(s.transformed(t)),
            Shape::Compound(v) => Shape::Compound(v.iter().map(|s| s.transformed(t)).collect()),
        }
    }

    /// Bounding box over all solids.
    pub fn bounds(&self) -> Aabb3 {
        let mut bb = Aabb3::empty();
        for s in self.solids() {
            let sb = s.bounds();
            if !sb.is_empty() {
                bb.include_point(&sb.min);
                bb.include_point(&sb.max);
            }
        }
        bb
    }

    /// Total face count.
    pub fn num_faces(&self) -> usize {
        self.solids().iter().map(|s| s.faces.len()).sum()
    }
}
