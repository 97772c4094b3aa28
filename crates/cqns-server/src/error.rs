use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use cqns_core::RewriteError;

/// Body sent with every error response.
pub const EMPTY_JSON_BODY: &str = "{}";

/// Content type of every response produced by the interceptor.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("request not accepted: {0}")]
    NotAccepted(String),

    #[error("cyclic forward detected for {0}")]
    CyclicForward(String),

    #[error("invalid namespace encoding: {0}")]
    InvalidNamespace(String),

    #[error("invalid resource path encoding: {0}")]
    InvalidPath(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("json source error: {0}")]
    Source(String),

    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAccepted(_) | Self::CyclicForward(_) | Self::ResourceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidNamespace(_) | Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Source(_)
            | Self::MalformedDocument(_)
            | Self::Rewrite(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
            EMPTY_JSON_BODY,
        )
            .into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
