//! Transport error type

use reqwest::Response;
use thiserror::Error;

/// Failures surfaced by the transport layer
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured base address could not be parsed
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The server answered with a non-success status
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The request could not be sent or its response read
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl TransportError {
    /// Build an `Http` error from a non-success response, capturing the body
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Self::Http { status, message }
    }
}
