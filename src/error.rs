//! Error types for the mask compositor.

use thiserror::Error;

/// Result type alias using CompositorError.
pub type Result<T> = std::result::Result<T, CompositorError>;

/// Main error type for compositing runs.
#[derive(Error, Debug)]
pub enum CompositorError {
    /// Failed to parse the YAML configuration document.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Failed to serialize a JSON report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is structurally invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A color spec string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Scaling the source layer would produce an empty tile.
    #[error("Invalid scale {scale} for a {width}x{height} layer: tile would be empty")]
    InvalidScale { scale: f32, width: u32, height: u32 },

    /// Canvas, region mask and target size disagree.
    #[error("Size mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Output extension does not map to a supported image format.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
