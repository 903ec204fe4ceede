//! HTTP error mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sentiscope_store::StoreError;
use serde_json::json;

/// Handler error; rendered as `{"detail": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input (422)
    #[error("{0}")]
    Validation(String),

    /// Unparseable request body (400)
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Other extractor rejections, keeping axum's status
    #[error("{1}")]
    Rejected(StatusCode, String),

    /// The model failed to produce a label
    #[error("Falha na inferência: {0}")]
    Inference(String),

    #[error("Erro interno: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Rejected(status, _) => *status,
            Self::Inference(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for the `sentiscope_errors_total` counter
    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Rejected(..) => "validation",
            Self::Forbidden(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::Inference(_) => "inference",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<sentiscope_core::Error> for AppError {
    fn from(err: sentiscope_core::Error) -> Self {
        use sentiscope_core::Error;

        match err {
            Error::Validation(msg) => Self::Validation(msg),
            Error::NotFound(msg) => Self::NotFound(msg),
            Error::Inference(msg) => Self::Inference(msg),
            Error::Config(msg) => Self::Inference(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Import(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("inference task failed: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => Self::Validation(e.body_text()),
            JsonRejection::JsonSyntaxError(e) => Self::BadRequest(e.body_text()),
            other => Self::Rejected(other.status(), other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => Self::Validation(e.body_text()),
            other => Self::Rejected(other.status(), other.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }
        metrics::counter!("sentiscope_errors_total", "kind" => self.kind()).increment(1);

        let body = json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
