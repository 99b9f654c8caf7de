#![warn(missing_docs)]

//! Geometric primitives shared by every prismcad crate.
//!
//! Drawings live in the XY plane as [`Point2`]; solids and meshes use
//! [`Point3`]. Everything is `f64` and in drawing units until a mesh is
//! exported.

use nalgebra::{Matrix2, Matrix3, Matrix4, Vector2, Vector3};

/// Position in model space.
pub type Point3 = nalgebra::Point3<f64>;

/// Displacement in model space.
pub type Vec3 = Vector3<f64>;

/// Position in the drawing plane.
pub type Point2 = nalgebra::Point2<f64>;

/// Displacement in the drawing plane.
pub type Vec2 = Vector2<f64>;

/// Affine map applied to solids before export.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Homogeneous matrix, points as columns.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Per-axis scale about the origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz)),
        }
    }

    /// Same factor on all three axes, e.g. `0.001` for millimetres to metres.
    pub fn uniform_scale(s: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(s),
        }
    }

    /// Shift by `offset`.
    pub fn translation(offset: Vec3) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Map a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Negative determinant: faces must be re-wound after mapping.
    pub fn is_mirroring(&self) -> bool {
        let linear: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        linear.determinant() < 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }
}

/// Affine map of the drawing plane.
///
/// Used to carry block references and entity coordinate systems into world
/// coordinates before edges are built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement2 {
    /// Linear part.
    pub linear: Matrix2<f64>,
    /// Translation applied after `linear`.
    pub offset: Vec2,
}

impl Placement2 {
    /// Map with the given linear part and offset.
    pub fn new(linear: Matrix2<f64>, offset: Vec2) -> Self {
        Self { linear, offset }
    }

    /// Map taking the unit axes to `x_axis` and `y_axis`, then shifting.
    pub fn from_axes(x_axis: Vec2, y_axis: Vec2, offset: Vec2) -> Self {
        Self::new(Matrix2::from_columns(&[x_axis, y_axis]), offset)
    }

    /// Shift by `offset`.
    pub fn translation(offset: Vec2) -> Self {
        Self::new(Matrix2::identity(), offset)
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(Matrix2::new(c, -s, s, c), Vec2::zeros())
    }

    /// Per-axis scale about the origin; a negative factor mirrors.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(Matrix2::new(sx, 0.0, 0.0, sy), Vec2::zeros())
    }

    /// `self` followed by `outer`.
    pub fn then(&self, outer: &Placement2) -> Self {
        Self::new(
            outer.linear * self.linear,
            outer.linear * self.offset + outer.offset,
        )
    }

    /// Map a point.
    pub fn apply_point(&self, p: &Point2) -> Point2 {
        Point2::from(self.linear * p.coords + self.offset)
    }

    /// Map a displacement; the offset does not apply.
    pub fn apply_vec(&self, v: &Vec2) -> Vec2 {
        self.linear * v
    }

    /// Negative determinant: counter-clockwise turns become clockwise.
    pub fn is_mirroring(&self) -> bool {
        self.linear.determinant() < 0.0
    }

    /// Common length factor when the map keeps circles round.
    ///
    /// `None` for shears, unequal axis scales and collapsing maps.
    pub fn similarity_scale(&self) -> Option<f64> {
        let a = self.linear.column(0).into_owned();
        let b = self.linear.column(1).into_owned();
        let (la, lb) = (a.norm(), b.norm());
        let round = la > 1e-12
            && (la - lb).abs() <= 1e-9 * la
            && a.dot(&b).abs() <= 1e-9 * la * lb;
        round.then_some(la)
    }
}

impl Default for Placement2 {
    fn default() -> Self {
        Self::translation(Vec2::zeros())
    }
}

/// Distance below which two positions are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// In drawing units.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-6 drawing units.
    pub const DEFAULT: Self = Self { linear: 1e-6 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Planar bounds; starts inverted so the first point sets both corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Lower-left corner.
    pub min: Point2,
    /// Upper-right corner.
    pub max: Point2,
}

impl Aabb2 {
    /// Box spanning two corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Box containing nothing.
    pub fn empty() -> Self {
        Self::new(
            Point2::new(f64::INFINITY, f64::INFINITY),
            Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }

    /// Smallest box around `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
        points.into_iter().fold(Self::empty(), |mut bb, p| {
            bb.include_point(p);
            bb
        })
    }

    /// Nothing included yet.
    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    /// Grow to cover `p`.
    pub fn include_point(&mut self, p: &Point2) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow to cover `other`; empty boxes change nothing.
    pub fn include(&mut self, other: &Aabb2) {
        if !other.is_empty() {
            self.min = self.min.inf(&other.min);
            self.max = self.max.sup(&other.max);
        }
    }

    /// Span on each axis.
    pub fn extent(&self) -> Vec2 {
        self.max - self.min
    }

    /// Push every side out by `fraction` of the span on its axis.
    pub fn padded(&self, fraction: f64) -> Self {
        let margin = self.extent() * fraction;
        Self::new(self.min - margin, self.max + margin)
    }

    /// `other` fits inside, edges may touch.
    pub fn contains(&self, other: &Aabb2) -> bool {
        self.min.inf(&other.min) == self.min && self.max.sup(&other.max) == self.max
    }
}

/// Model-space bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Corner with the smallest coordinates.
    pub min: Point3,
    /// Corner with the largest coordinates.
    pub max: Point3,
}

impl Aabb3 {
    /// Box containing nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vec3::repeat(f64::INFINITY)),
            max: Point3::from(Vec3::repeat(f64::NEG_INFINITY)),
        }
    }

    /// Nothing included yet.
    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x)
    }

    /// Grow to cover `p`.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Span on each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
