use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::validation::FieldError;

/// Error returned by every handler.
///
/// Several "not found" cases render as 400 rather than 404 to stay
/// wire-compatible with existing clients of this API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A body that is missing, not JSON, or of the wrong shape is reported like
/// any other invalid input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError {
            msg: rejection.body_text(),
            param: "body",
            location: "body",
        }])
    }
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    msg: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": msg }] })),
            )
                .into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": "Invalid Credentials" }] })),
            )
                .into_response(),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(MessageBody { msg: &msg })).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::BAD_REQUEST, Json(MessageBody { msg: &msg })).into_response()
            }
            ApiError::Upstream(msg) => {
                (StatusCode::NOT_FOUND, Json(MessageBody { msg: &msg })).into_response()
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageBody { msg: "Server Error" }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_api_contract() {
        let cases = [
            (ApiError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Upstream("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
