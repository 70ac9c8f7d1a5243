use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use wellness_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!("Request failed: {:#}", e);
        }

        let field = match &self {
            Self::Validation { field, .. } => field.map(str::to_string),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            field,
        };

        (self.status(), Json(body)).into_response()
    }
}
