//! Conversion settings, loadable from TOML.
//!
//! ```toml
//! [import]
//! unit_scale = 10.0   # cm drawing to mm
//! arc_segments = 64
//!
//! [wire]
//! repair_tolerance = 0.02
//!
//! [classify]
//! sample = "centroid"
//!
//! [extrude]
//! base_height = 2.0
//! base_plate = true
//! ```
//!
//! Missing sections and keys keep their defaults.

use std::path::Path;

use prismcad_sketch::{ClassifySettings, WireSettings};
use serde::{Deserialize, Serialize};

use crate::{KernelError, Result};

/// Drawing import parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Factor applied to every drawing coordinate.
    pub unit_scale: f64,
    /// Chords per full turn when arcs are turned into face boundaries.
    pub arc_segments: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            unit_scale: 1.0,
            arc_segments: 32,
        }
    }
}

/// Extrusion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeSettings {
    /// Height of faces at even nesting depth (drawing units).
    pub base_height: f64,
    /// Add a plate under the whole drawing.
    pub base_plate: bool,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            base_height: 1.0,
            base_plate: false,
        }
    }
}

/// Mesh conversion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Uniform scale applied before STL export (0.001 turns mm into m).
    pub scale_factor: f64,
    /// Vertex weld distance when rebuilding a solid from STL.
    pub weld_tolerance: f64,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            scale_factor: 0.001,
            weld_tolerance: 0.1,
        }
    }
}

/// All parameters of the conversion pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Drawing import.
    pub import: ImportSettings,
    /// Wire building and gap repair.
    pub wire: WireSettings,
    /// Nesting classification.
    pub classify: ClassifySettings,
    /// Extrusion heights and base plate.
    pub extrude: ExtrudeSettings,
    /// STEP/STL conversion.
    pub mesh: MeshSettings,
}

impl ConvertSettings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("import.unit_scale", self.import.unit_scale),
            ("wire.tolerance", self.wire.tolerance),
            ("wire.repair_tolerance", self.wire.repair_tolerance),
            ("classify.tolerance", self.classify.tolerance),
            ("extrude.base_height", self.extrude.base_height),
            ("mesh.scale_factor", self.mesh.scale_factor),
            ("mesh.weld_tolerance", self.mesh.weld_tolerance),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(KernelError::config(key, format!("must be positive, got {value}")));
            }
        }
        if self.import.arc_segments < 3 {
            return Err(KernelError::config(
                "import.arc_segments",
                "must be at least 3",
            ));
        }
        if self.wire.repair_tolerance < self.wire.tolerance {
            return Err(KernelError::config(
                "wire.repair_tolerance",
                "must not be below wire.tolerance",
            ));
        }
        Ok(())
    }
}
