//! Error types for GPU resource creation and geometry validation

use thiserror::Error;

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Shader failed to compile
    #[error("Shader compilation error: {0}")]
    ShaderCompile(String),

    /// Program failed to link
    #[error("Program link error: {0}")]
    ProgramLink(String),

    /// Uniform not present in the linked program
    #[error("Uniform not found: {0}")]
    MissingUniform(String),

    /// GL object creation returned no handle
    #[error("Failed to create {object}: {message}")]
    GlObject {
        object: &'static str,
        message: String,
    },

    /// Mesh arrays are inconsistent
    #[error("Invalid mesh data: {0}")]
    InvalidMesh(String),

    /// Sphere tessellation needs at least two rings and two sectors
    #[error("Invalid sphere resolution {rings}x{sectors}")]
    Resolution { rings: usize, sectors: usize },
}
