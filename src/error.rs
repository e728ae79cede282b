//! Error types for relief globe generation

use std::fmt;

/// Errors that can occur during globe generation or serialization
#[derive(Debug)]
pub enum GlobeError {
    /// Parameter validation failed before any traversal began
    InvalidConfig(String),
    /// The backing heightmap grid has zero width or height
    EmptyHeightField,
    /// A shell traversal yielded no triangles, or a zero-length face
    /// normal was encountered during serialization
    DegenerateMesh(String),
    /// An I/O failure while writing or reading mesh bytes
    Io(std::io::Error),
}

impl fmt::Display for GlobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobeError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            GlobeError::EmptyHeightField => write!(f, "height field has zero dimensions"),
            GlobeError::DegenerateMesh(msg) => write!(f, "degenerate mesh: {}", msg),
            GlobeError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlobeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GlobeError {
    fn from(err: std::io::Error) -> Self {
        GlobeError::Io(err)
    }
}

/// Result type alias for globe operations
pub type Result<T> = std::result::Result<T, GlobeError>;
