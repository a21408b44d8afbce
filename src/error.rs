use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored row is missing a column or holds an unexpected value.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// The request carries no usable session credential.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// A request field is missing or could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A decoded field is outside its allowed domain.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

/// The `{"error": {"id", "message"}}` envelope returned for every failure.
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub id: String,
    pub message: String,
}

impl AppError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Decode(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::CreatePool(_)
            | AppError::Redis(_)
            | AppError::MissingData(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!(%error_id, "Database error: {}", e);
                "Database error".to_string()
            }

            AppError::Pool(ref e) => {
                tracing::error!(%error_id, "Pool error: {}", e);
                "Database error".to_string()
            }

            AppError::CreatePool(ref e) => {
                tracing::error!(%error_id, "Pool creation error: {}", e);
                "Database error".to_string()
            }

            AppError::Redis(ref e) => {
                tracing::error!(%error_id, "Redis error: {}", e);
                "Session storage error".to_string()
            }

            AppError::MissingData(ref column) => {
                tracing::error!(%error_id, "Missing data in column: {}", column);
                "Internal server error".to_string()
            }

            AppError::Unauthenticated(msg) => {
                tracing::warn!(%error_id, "Authentication failed: {}", msg);
                msg
            }

            AppError::Decode(msg) => {
                tracing::debug!(%error_id, "Decode error: {}", msg);
                msg
            }

            AppError::Validation(msg) => {
                tracing::debug!(%error_id, "Validation error: {}", msg);
                msg
            }

            AppError::NotFound => {
                tracing::debug!(%error_id, "Resource not found");
                "Resource not found".to_string()
            }

            AppError::Internal(ref msg) => {
                tracing::error!(%error_id, "Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                id: error_id.to_string(),
                message,
            },
        };

        let body = sonic_rs::to_string(&envelope).unwrap_or_else(|_| {
            format!(
                r#"{{"error":{{"id":"{}","message":"Internal server error"}}}}"#,
                error_id
            )
        });

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_maps_to_401_envelope() {
        let response = AppError::Unauthenticated("Missing session token".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Missing session token");
        assert!(Uuid::parse_str(json["error"]["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = AppError::Internal("secret stack detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Internal server error");
    }

    #[test]
    fn decode_and_validation_share_bad_request() {
        assert_eq!(AppError::Decode("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    }
}
