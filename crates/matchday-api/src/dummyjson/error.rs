use thiserror::Error;

/// Errors from the DummyJSON identity service.
#[derive(Debug, Error)]
pub enum DummyJsonError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shown to the user as-is; the status is logged by the client.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}
