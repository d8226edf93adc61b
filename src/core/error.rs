use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Signing secret must not be empty")]
    EmptySecret,
    #[error("Token lifetime is out of range")]
    TokenTtl,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("No token provided")]
    MissingToken,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Expired claim")]
    ExpiredClaim,
    #[error("Malformed token: {0}")]
    MalformedToken(jsonwebtoken::errors::Error),
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Corrupt credential: {0}")]
    CorruptCredential(#[from] bcrypt::BcryptError),
    #[error("Operation canceled")]
    Canceled,
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal,
}

impl Error {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::UserAlreadyExists => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MissingToken
            | Error::Unauthorized
            | Error::InvalidSignature
            | Error::ExpiredClaim
            | Error::MalformedToken(_) => StatusCode::UNAUTHORIZED,
            Error::Canceled => StatusCode::SERVICE_UNAVAILABLE,
            Error::Signing(_) | Error::CorruptCredential(_) | Error::Sql(_) | Error::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{:?}", self);
        } else {
            tracing::debug!("{:?}", self);
        }

        // only messages we wrote ourselves go back to the client
        let message = match self {
            Error::Validation(message) => message,
            Error::UserAlreadyExists => "User already exists".into(),
            Error::NotFound(entity) => format!("{entity} not found"),
            Error::MissingToken => "No token provided".into(),
            Error::Unauthorized
            | Error::InvalidSignature
            | Error::ExpiredClaim
            | Error::MalformedToken(_) => "Unauthorized".into(),
            Error::Canceled => "Request canceled".into(),
            Error::Signing(_) => "Signing error".into(),
            Error::CorruptCredential(_) => "Credential error".into(),
            Error::Sql(_) => "Store error".into(),
            Error::Internal => "Internal server error".into(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::UserAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(Error::NotFound("User").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::ExpiredClaim.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Signing("empty".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(Error::Canceled.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_store_errors_are_sanitized() {
        let response = Error::Sql(sqlx::Error::Protocol("password=hunter2".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(!body.contains("hunter2"));
        assert!(body.contains("Store error"));
    }
}
