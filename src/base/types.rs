//! Common result aliases and the relay error taxonomy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Catch-all error type for startup and plumbing code.
pub type Err = anyhow::Error;
/// Result alias over [`Err`].
pub type Res<T> = Result<T, Err>;
/// Result alias for operations that return nothing.
pub type Void = Res<()>;

/// Errors produced while relaying a ticket webhook.
///
/// Every failure in the pipeline is classified into exactly one of these
/// variants, and each variant maps to exactly one HTTP status at the
/// endpoint boundary.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No signature header was present on the inbound request.
    #[error("missing signature header")]
    Unauthenticated,

    /// A signature was presented but did not match the payload.
    #[error("signature mismatch")]
    Forbidden,

    /// The payload was structurally invalid; the message names the offending field or value.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The chat platform did not respond within the per-attempt timeout.
    #[error("chat delivery timed out")]
    UpstreamTimeout,

    /// The chat platform was unreachable or responded with an error.
    #[error("chat delivery failed: {0}")]
    UpstreamError(String),

    /// Any failure without a more specific classification.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    /// The HTTP status this error maps to at the endpoint boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a delivery attempt that failed with this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamTimeout | Self::UpstreamError(_))
    }

    /// Message safe to hand back to the caller.
    ///
    /// Unclassified failures are reported generically; their detail only
    /// appears in server-side logs.
    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Internal(err) => error!("Unhandled error while relaying webhook: {:#}", err),
            other => warn!("Rejected webhook: {}", other),
        }

        let status = self.status();
        let body = ErrorBody { error: self.client_message() };

        (status, Json(body)).into_response()
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub error: String,
}

// Tests.
