//! Export errors.

use thiserror::Error;

/// Failures of the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("Could not allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Reasons an image source could not be turned into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Image has no source")]
    Empty,
    #[error("Malformed data URL")]
    MalformedDataUrl,
    #[error("Unsupported image source: {0}")]
    Unsupported(String),
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Failed to decode image: {0}")]
    Image(String),
}
