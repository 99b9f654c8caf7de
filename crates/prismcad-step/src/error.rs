//! Failures while reading or writing exchange files.

use thiserror::Error;

/// Everything that can go wrong between a `.step` file and a [`Shape`](prismcad_brep::Shape).
#[derive(Error, Debug)]
pub enum StepError {
    /// Reading or writing the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Bytes that do not form a token.
    #[error("{line}:{col}: {message}")]
    Lexer {
        /// Line of the offending byte, from 1.
        line: usize,
        /// Column of the offending byte, from 1.
        col: usize,
        /// What was wrong.
        message: String,
    },

    /// Tokens that do not form an exchange structure.
    #[error("{}{message}", entity_id.map(|id| format!("#{id}: ")).unwrap_or_default())]
    Parser {
        /// Instance being read, when there is one.
        entity_id: Option<u64>,
        /// What was wrong.
        message: String,
    },

    /// `#id` referenced but never defined.
    #[error("#{0} is referenced but not defined")]
    MissingEntity(u64),

    /// Entity outside the planar subset, such as a `CYLINDRICAL_SURFACE`.
    #[error("{0} is not supported")]
    UnsupportedEntity(String),

    /// Geometry that cannot be used, like a zero direction.
    #[error("bad geometry: {0}")]
    InvalidGeometry(String),

    /// Topology that cannot be used, like a face with no bounds.
    #[error("bad topology: {0}")]
    InvalidTopology(String),

    /// A reference points at the wrong kind of instance.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        /// Type the reader needed.
        expected: String,
        /// Type it found.
        actual: String,
    },

    /// The data section holds no `MANIFOLD_SOLID_BREP`.
    #[error("no MANIFOLD_SOLID_BREP in file")]
    NoSolids,
}

impl StepError {
    /// [`StepError::Lexer`] at a position.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// [`StepError::Parser`], optionally tied to an instance.
    pub fn parser(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parser {
            entity_id,
            message: message.into(),
        }
    }

    /// [`StepError::TypeMismatch`] between two type names.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
