//! Error types for the beam solver

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for beam analysis
#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid boundary condition: {0}")]
    InvalidBoundaryCondition(String),

    #[error("Singular stiffness matrix - {0}")]
    SingularSystem(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed VTK data: {0}")]
    VtkFormat(String),

    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    #[error("Export error: {0}")]
    Export(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BeamError {
    /// Wrap a failed read of an input file, keeping the path
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        BeamError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for beam analysis
pub type BeamResult<T> = Result<T, BeamError>;
