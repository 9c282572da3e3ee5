//! Error types for the model compiler.

use thiserror::Error;

/// Result type alias using CompileError.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Main error type for model compilation.
///
/// Most per-document problems never surface here: they are logged and
/// replaced by a sentinel (missing texture, empty model) so that one bad
/// file cannot abort a whole load. These variants cover the boundaries
/// where the caller has to know something went wrong.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found in the file tables.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A document was readable but did not have the expected shape.
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    /// Invalid resource pack structure.
    #[error("Invalid resource pack: {0}")]
    InvalidResourcePack(String),

    /// Failed to build texture atlas.
    #[error("Atlas building error: {0}")]
    AtlasBuild(String),

    /// The rendering-resource owner rejected or dropped an upload task.
    #[error("Upload error: {0}")]
    Upload(String),

    /// Compiled tables were requested before a successful build.
    #[error("Resources are not loaded")]
    NotLoaded,
}
