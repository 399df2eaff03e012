//! Errors raised by parsing, registration, resolution and quantity arithmetic
//!
//! Every failure is terminal for the call that raised it. Each variant carries
//! a stable machine-readable code so outer layers (the JSON server) can report
//! it without matching on message text.

use serde::Serialize;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const DUPLICATE_NAME: &str = "DUPLICATE_NAME";
    pub const INVALID_NAME: &str = "INVALID_NAME";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const SPACE_MISMATCH: &str = "SPACE_MISMATCH";
    pub const EXPONENT_OVERFLOW: &str = "EXPONENT_OVERFLOW";
}

/// Error type for every enunit operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The unit string does not follow the grammar
    #[error("{detail} in unit string \"{input}\"")]
    Syntax { detail: String, input: String },

    /// A name was used that the unit space never registered
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("There is already a unit called \"{0}\"")]
    DuplicateName(String),

    #[error("Invalid unit name: \"{0}\"")]
    InvalidName(String),

    /// `plus`, `minus` or `as_unit` across different bases
    #[error("Unit mismatch when {operation} {left} {preposition} {right}.")]
    DimensionMismatch {
        operation: &'static str,
        left: String,
        preposition: &'static str,
        right: String,
    },

    /// Arithmetic between quantities of two different unit spaces
    #[error("UnitSpace mismatch between {left} and {right}")]
    SpaceMismatch { left: String, right: String },

    /// Combining or raising a basis pushed an exponent outside `i32`
    #[error("Exponent of \"{0}\" out of range")]
    ExponentOverflow(String),
}

impl UnitError {
    pub fn syntax(detail: impl Into<String>, input: impl Into<String>) -> Self {
        UnitError::Syntax {
            detail: detail.into(),
            input: input.into(),
        }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            UnitError::Syntax { .. } => codes::SYNTAX_ERROR,
            UnitError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
            UnitError::DuplicateName(_) => codes::DUPLICATE_NAME,
            UnitError::InvalidName(_) => codes::INVALID_NAME,
            UnitError::DimensionMismatch { .. } => codes::DIMENSION_MISMATCH,
            UnitError::SpaceMismatch { .. } => codes::SPACE_MISMATCH,
            UnitError::ExponentOverflow(_) => codes::EXPONENT_OVERFLOW,
        }
    }

    /// Serializable summary: `{code, message}`
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Structured form of a [`UnitError`] for wire output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}
