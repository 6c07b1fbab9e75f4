//! Route database error types.

/// Errors that can occur when loading the published route database.
#[derive(Debug, thiserror::Error)]
pub enum RouteDbError {
    /// Request could not be sent or the body could not be read
    #[error("route database download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("route database server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("route database is not valid JSON: {message}")]
    Json { message: String },

    /// The document lacks a required top-level structure
    #[error("route database is missing {0}")]
    MissingStructure(&'static str),

    #[error("route database cache: {message}")]
    Cache { message: String },
}
