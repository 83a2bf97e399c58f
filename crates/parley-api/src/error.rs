use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parley_db::StoreError;
use parley_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Store(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Sign-up reports every store failure as a client error.
    pub fn into_bad_request(self) -> Self {
        match self {
            ApiError::Store(msg) | ApiError::Conflict(msg) => ApiError::BadRequest(msg),
            other => other,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidInput(msg) => ApiError::BadRequest(msg.to_string()),
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::Conflict => ApiError::Conflict(e.to_string()),
            StoreError::Unavailable(_) | StoreError::Corrupt(_) | StoreError::LockPoisoned => {
                error!("Store failure: {}", e);
                ApiError::Store(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::InvalidInput("x"), StatusCode::BAD_REQUEST),
            (StoreError::NotFound("conversation"), StatusCode::NOT_FOUND),
            (StoreError::Conflict, StatusCode::CONFLICT),
            (StoreError::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn signup_downgrades_store_errors() {
        let err = ApiError::Store("UNIQUE constraint failed".into()).into_bad_request();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::NotFound("x".into()).into_bad_request();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
