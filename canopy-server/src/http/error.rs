//! API error types with IntoResponse
//!
//! Every failure surfaces as `{status, message, details}` JSON with a
//! matching HTTP status code. The `status` tag follows the wire
//! contract: `"not-found"` for missing rows, `"error"` for everything
//! else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationErrors;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Requested row does not exist (404)
    NotFound { message: String, details: String },

    /// Field validation failed (400); details lists every failing field
    Validation {
        message: String,
        errors: ValidationErrors,
    },

    /// Request malformed in a way field validation doesn't cover (400)
    BadRequest { message: String, details: String },

    /// Association already exists (409)
    Conflict { message: String },

    /// Underlying store failure (500, logged)
    Database { message: String, source: DbError },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn validation(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>, source: DbError) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound { message, details } => (
                StatusCode::NOT_FOUND,
                json!({
                    "status": "not-found",
                    "message": message,
                    "details": details
                }),
            ),
            Self::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "status": "error",
                    "message": message,
                    "details": errors.to_string()
                }),
            ),
            Self::BadRequest { message, details } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "status": "error",
                    "message": message,
                    "details": details
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "status": "error",
                    "message": message
                }),
            ),
            Self::Database { message, source } => {
                tracing::error!("database error: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "status": "error",
                        "message": message,
                        "details": source.to_string()
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ValidationError, ValidationErrors};
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_is_404_with_tag() {
        let err = ApiError::not_found("Could not find insect 42.", "Insect not found");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "not-found");
        assert_eq!(body["message"], "Could not find insect 42.");
        assert_eq!(body["details"], "Insect not found");
    }

    #[tokio::test]
    async fn validation_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Empty { field: "name" });
        errors.push(ValidationError::NotPositive {
            field: "millimeters",
        });

        let err = ApiError::validation("Could not create new insect", errors);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["details"],
            "name cannot be empty, millimeters must be a positive number"
        );
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let err = ApiError::conflict("Association already exists between Stagg and Patu Digua Spider");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body.get("details").is_none());
    }
}
