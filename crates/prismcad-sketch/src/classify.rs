//! Nesting classification of faces.

use std::fmt;
use std::str::FromStr;

use prismcad_math::Point2;
use serde::{Deserialize, Serialize};

use crate::Face;

/// Which point of a face is tested against the other faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplePoint {
    /// First boundary vertex. Cheap but sensitive to touching boundaries.
    #[default]
    FirstVertex,
    /// Area centroid. Robust for convex faces, may fall outside concave ones.
    Centroid,
}

impl SamplePoint {
    /// The sample point of `face`.
    pub fn of(&self, face: &Face) -> Point2 {
        match self {
            SamplePoint::FirstVertex => face.first_vertex(),
            SamplePoint::Centroid => face.centroid(),
        }
    }
}

impl fmt::Display for SamplePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplePoint::FirstVertex => write!(f, "first-vertex"),
            SamplePoint::Centroid => write!(f, "centroid"),
        }
    }
}

impl FromStr for SamplePoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-vertex" => Ok(SamplePoint::FirstVertex),
            "centroid" => Ok(SamplePoint::Centroid),
            other => Err(format!(
                "unknown sample point '{other}' (expected first-vertex or centroid)"
            )),
        }
    }
}

/// Settings for nesting classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifySettings {
    /// Boundary tolerance of the point-in-face test.
    pub tolerance: f64,
    /// Which point of each face is sampled.
    pub sample: SamplePoint,
}

impl Default for ClassifySettings {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            sample: SamplePoint::FirstVertex,
        }
    }
}

/// Nesting depth of every face.
///
/// The depth of face `i` is the number of other faces `j` for which
/// `inside(j, sample(i))` holds. `inside` is the point-in-face predicate,
/// usually supplied by a geometry kernel. Results are in input order.
pub fn nesting_depths<F>(faces: &[Face], sample: SamplePoint, mut inside: F) -> Vec<usize>
where
    F: FnMut(&Face, Point2) -> bool,
{
    faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let p = sample.of(face);
            faces
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && inside(other, p))
                .count()
        })
        .collect()
}

/// Nesting depths using the built-in strict point-in-face test.
pub fn classify(faces: &[Face], settings: &ClassifySettings) -> Vec<usize> {
    nesting_depths(faces, settings.sample, |face, p| {
        face.contains_point(&p, settings.tolerance, true)
    })
}
