use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// An image could not be embedded; the exporter recovers from this
    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Failed to encode PDF: {0}")]
    Encoding(String),
}
