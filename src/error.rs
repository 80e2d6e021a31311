//! Error types for Voronoi computation.

use std::fmt;
use std::io;

/// Errors that can occur while building cells or importing particles.
#[derive(Debug)]
pub enum VoroError {
    /// A cell exceeded [`MAX_VERTICES`](crate::MAX_VERTICES) during plane
    /// cutting. Fatal for the current cell computation.
    VertexOverflow {
        /// Vertex count the cell reached when the limit tripped.
        vertices: usize,
    },

    /// The half-edge relation table is inconsistent (a back-index does not
    /// point back at its origin). Indicates a bug or catastrophic
    /// floating-point non-determinism.
    BrokenTopology {
        /// The vertex at which the inconsistency was detected.
        vertex: usize,
    },

    /// A particle record could not be parsed during import.
    BadRecord {
        /// One-based line number of the offending record.
        line: usize,
    },

    /// An underlying I/O failure while importing or writing output.
    Io(io::Error),
}

impl fmt::Display for VoroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoroError::VertexOverflow { vertices } => {
                write!(f, "cell vertex count {} exceeds the hard limit", vertices)
            }
            VoroError::BrokenTopology { vertex } => {
                write!(f, "edge relation table broken at vertex {}", vertex)
            }
            VoroError::BadRecord { line } => {
                write!(f, "malformed particle record at line {}", line)
            }
            VoroError::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for VoroError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VoroError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for VoroError {
    fn from(e: io::Error) -> Self {
        VoroError::Io(e)
    }
}
