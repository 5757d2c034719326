//! Error types for the ledger and its HTTP surface.

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Static payload returned for every internal failure.
pub const INTERNAL_ERROR_BODY: &str = "HTTP 500: Internal Server Error";

/// Errors produced by block creation and chain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("block {found} out of sequence: expected index {expected}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("block {index} prev_hash does not match predecessor hash")]
    BrokenLink { index: u64 },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("chain is empty")]
    EmptyChain,

    #[error("block index overflow after {0}")]
    IndexOverflow(u64),

    #[error("timestamp format error: {0}")]
    Timestamp(String),
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be decoded; carries the raw body.
    #[error("malformed request body")]
    MalformedBody(Bytes),

    #[error("submission rejected: {0}")]
    Rejected(ChainError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("internal error: {0}")]
    Internal(ChainError),
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::IndexMismatch { .. }
            | ChainError::BrokenLink { .. }
            | ChainError::HashMismatch { .. }
            | ChainError::InvalidGenesis(_)
            | ChainError::EmptyChain => ApiError::Rejected(err),
            ChainError::IndexOverflow(_) | ChainError::Timestamp(_) => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedBody(body) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response(),
            ApiError::Rejected(err) => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "rejected",
                    "message": err.to_string(),
                })),
            )
                .into_response(),
            ApiError::Serialization(_) | ApiError::LockPoisoned | ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}
