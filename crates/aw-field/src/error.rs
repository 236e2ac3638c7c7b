use std::fmt;

#[derive(Debug)]
pub enum FieldError {
    InvalidDimensions(usize),
    OriginOutOfBounds {
        origin: (usize, usize),
        dimensions: usize,
    },
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    Decomposition,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidDimensions(d) => write!(f, "invalid field dimensions: {d}"),
            FieldError::OriginOutOfBounds { origin, dimensions } => write!(
                f,
                "ripple origin ({}, {}) outside {dimensions}x{dimensions} field",
                origin.0, origin.1
            ),
            FieldError::ShapeMismatch { expected, found } => write!(
                f,
                "expected {}x{} matrix, got {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            FieldError::Decomposition => {
                write!(f, "singular value decomposition produced no factors")
            }
        }
    }
}

impl std::error::Error for FieldError {}

pub type Result<T> = std::result::Result<T, FieldError>;
