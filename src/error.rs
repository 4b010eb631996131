use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::types::api::ErrorBody;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Message returned for every server-side failure; details only go to the log.
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("content is required and must be a non-empty string")]
    MissingOrInvalidContent,
    #[error("ttl_seconds must be an integer >= 1")]
    InvalidTtl,
    #[error("max_views must be an integer >= 1")]
    InvalidMaxViews,
    #[error("request body is not valid JSON")]
    MalformedBody {
        #[from]
        source: serde_json::Error,
    },
    #[error("request body is null")]
    NullBody,
    #[error("failed to read request body: {source}")]
    Body {
        #[from]
        source: BytesRejection,
    },
    #[error("paste not found")]
    NotFound,
    #[error("database error")]
    Database { source: sqlx::Error },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingOrInvalidContent => StatusCode::BAD_REQUEST,
            ApiError::InvalidTtl => StatusCode::BAD_REQUEST,
            ApiError::InvalidMaxViews => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NullBody => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body { source } => source.status(),
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            error!(error = ?self, "request failed");
            INTERNAL_SERVER_ERROR.to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Database { source },
        }
    }
}
