#![warn(missing_docs)]

//! STEP file import/export for prismcad.
//!
//! Reads and writes STEP files (ISO 10303-21) holding planar-faced B-rep
//! solids. Output targets AP214 (`AUTOMOTIVE_DESIGN`); several solids are
//! written as one shape representation, i.e. a compound.
//!
//! # Example
//!
//! ```no_run
//! use prismcad_step::{read_step, write_step};
//!
//! let shape = read_step("model.step").unwrap();
//! write_step(&shape, "copy.step").unwrap();
//! ```

mod entities;
mod error;
mod lexer;
mod parser;
mod reader;
mod writer;

pub use error::StepError;
pub use reader::{read_step, read_step_from_buffer, CIRCLE_SEGMENTS};
pub use writer::{write_step, write_step_to_buffer};
