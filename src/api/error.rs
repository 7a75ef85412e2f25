use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::{AssetError, UnknownPreset};

use super::error_response;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        let msg = err.to_string();
        match err {
            AssetError::NotFound(_) => ApiError::NotFound(msg),
            AssetError::DuplicateName(_) | AssetError::BaselineImmutable(_) => {
                ApiError::Conflict(msg)
            }
            AssetError::EmptyName
            | AssetError::InvalidField { .. }
            | AssetError::BaselineCount(_) => ApiError::BadRequest(msg),
        }
    }
}

impl From<UnknownPreset> for ApiError {
    fn from(err: UnknownPreset) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}
