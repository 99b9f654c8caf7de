#![warn(missing_docs)]

//! Geometry kernel interface and conversion pipelines for prismcad.
//!
//! The reconstruction pipeline in [`convert`] only talks to geometry through
//! the [`GeometryKernel`] trait. [`NativeKernel`] implements it on top of the
//! prismcad crates: DXF import through the `dxf` crate, STEP through
//! `prismcad-step` and STL through `prismcad-mesh`.
//!
//! # Example
//!
//! ```
//! use prismcad_kernel::{reconstruct, ConvertSettings, NativeKernel};
//! use prismcad_math::Point2;
//! use prismcad_sketch::{Edge, EdgeSet};
//!
//! let p = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ];
//! let edges: EdgeSet = (0..4).map(|i| Edge::line(p[i], p[(i + 1) % 4])).collect();
//!
//! let settings = ConvertSettings::default();
//! let kernel = NativeKernel::new(&settings);
//! let result = reconstruct(&kernel, &edges, &settings);
//! assert_eq!(result.solids.len(), 1);
//! assert_eq!(result.solids[0].name, "SolidFrom_Wire0");
//! ```

pub mod convert;
mod drawing;
mod kernel;
mod native;
mod settings;

pub use convert::{
    analyze_loops, dxf_to_step, reconstruct, step_to_stl, stl_to_step, ConversionReport,
    ConvertError, Diagnostic, LoopRecord, LoopStatus, MeshReport, Reconstruction, Stage,
};
pub use drawing::edges_from_drawing;
pub use kernel::{GeometryKernel, Session};
pub use native::NativeKernel;
pub use settings::{ConvertSettings, ExtrudeSettings, ImportSettings, MeshSettings};

use prismcad_mesh::MeshError;
use prismcad_sketch::SketchError;
use prismcad_step::StepError;
use thiserror::Error;

/// Errors raised by a geometry kernel or while loading settings.
#[derive(Debug, Error)]
pub enum KernelError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The drawing could not be parsed.
    #[error("DXF error: {0}")]
    Dxf(#[from] dxf::DxfError),

    /// STEP import or export failed.
    #[error(transparent)]
    Step(#[from] StepError),

    /// Mesh conversion or STL I/O failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Wire, face or extrusion construction failed.
    #[error(transparent)]
    Sketch(#[from] SketchError),

    /// The settings file is not valid TOML for [`ConvertSettings`].
    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A setting is out of range.
    #[error("invalid setting {key}: {message}")]
    Config {
        /// Dotted key of the offending setting.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

impl KernelError {
    /// Create a settings range error.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result alias for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
