//! Error types for the camera matrix.

/// Failures while turning sheet rows into camera records.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Payload was not valid sheet JSON
    #[error("Malformed sheet payload: {0}")]
    Json(#[from] serde_json::Error),

    /// No header row
    #[error("Sheet has no header row")]
    Empty,

    /// A required column is absent from the header
    #[error("Sheet is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Errors reported by the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Selection of an id absent from the registry
    #[error("Unknown camera id: {0}")]
    UnknownCameraId(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}
