use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures talking to the document index. Every variant is a backend error
/// from the caller's point of view.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("request to document index failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document index returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode document index response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid document index url: {0}")]
    Url(String),
}

/// Bad caller input, rejected before any index call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by the HTTP layer. This is the only place internal
/// failures are translated into status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("document index error: {0}")]
    Backend(#[from] IndexError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::NotFound(message) => message.clone(),
            ApiError::Backend(e) => {
                // the cause stays in the logs
                log::error!("Document index error: {:#}", e);
                "Internal Server Error".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(body: &str) -> IndexError {
        IndexError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::new("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Product not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(unavailable("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_backend_error_hides_cause() {
        let response = ApiError::from(unavailable("secret host 10.0.0.1")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[test]
    fn test_backend_message_is_not_search_specific() {
        let message = ApiError::from(unavailable("cluster_block_exception")).to_string();
        assert!(message.starts_with("document index error: "));
        assert!(message.contains("cluster_block_exception"));
        assert!(!message.contains("search"));
    }
}
