use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimsError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Claim not found: #{0}")]
    NotFound(u32),
}

/// Why an image pair could not be loaded.
///
/// `Missing` is the expected, recoverable case (no imagery on disk yet);
/// `LoadFailed` covers permission, I/O and decode problems.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageLoadError {
    #[error("Image not found: {0}")]
    Missing(String),

    #[error("Failed to load image {path}: {reason}")]
    LoadFailed { path: String, reason: String },
}
