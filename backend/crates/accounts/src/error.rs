//! Accounts Error Types
//!
//! This module provides account-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Accounts-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

/// Accounts-specific error variants
#[derive(Debug, Error)]
pub enum AccountError {
    /// No session cookie, or the session cannot be used
    #[error("Authentication required")]
    Unauthenticated,

    /// Invalid credentials (unknown email or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Parent tried to log in before confirming their email
    #[error("Email address is not verified")]
    EmailNotVerified,

    /// Role check failed
    #[error("Access denied: {0}")]
    Forbidden(&'static str),

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionNotFound,

    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Role profile (parent/child row) not found
    #[error("Profile not found")]
    ProfileNotFound,

    /// Verification token did not decrypt to a known account
    #[error("Invalid verification token")]
    InvalidToken,

    /// Request validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store error
    #[error("Session store error: {0}")]
    SessionStore(#[from] redis::RedisError),

    /// Token cipher error
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Mail delivery error
    #[error("Mail delivery error: {0}")]
    Mail(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Unauthenticated
            | AccountError::InvalidCredentials
            | AccountError::EmailNotVerified => StatusCode::UNAUTHORIZED,
            AccountError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccountError::SessionNotFound
            | AccountError::AccountNotFound
            | AccountError::ProfileNotFound => StatusCode::NOT_FOUND,
            AccountError::InvalidToken | AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::Database(_)
            | AccountError::SessionStore(_)
            | AccountError::Cipher(_)
            | AccountError::Mail(_)
            | AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Unauthenticated
            | AccountError::InvalidCredentials
            | AccountError::EmailNotVerified => ErrorKind::Unauthorized,
            AccountError::Forbidden(_) => ErrorKind::Forbidden,
            AccountError::SessionNotFound
            | AccountError::AccountNotFound
            | AccountError::ProfileNotFound => ErrorKind::NotFound,
            AccountError::InvalidToken | AccountError::Validation(_) => ErrorKind::BadRequest,
            AccountError::EmailTaken => ErrorKind::Conflict,
            AccountError::Database(_)
            | AccountError::SessionStore(_)
            | AccountError::Cipher(_)
            | AccountError::Mail(_)
            | AccountError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures keep their detail in `log()` only; the
    /// response body carries a fixed message.
    pub fn to_app_error(&self) -> AppError {
        if self.status_code().is_server_error() {
            return AppError::new(self.kind(), "Internal error");
        }

        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::SessionStore(e) => {
                tracing::error!(error = %e, "Session store error");
            }
            AccountError::Cipher(msg) | AccountError::Mail(msg) | AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccountError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Role check rejected request");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AccountError {
    fn from(err: AppError) -> Self {
        AccountError::Internal(err.to_string())
    }
}

impl From<platform::crypt::CipherError> for AccountError {
    fn from(err: platform::crypt::CipherError) -> Self {
        AccountError::Cipher(err.to_string())
    }
}

impl From<platform::mailer::MailError> for AccountError {
    fn from(err: platform::mailer::MailError) -> Self {
        AccountError::Mail(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_body(err: AccountError) -> String {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_store_error_body_is_generic() {
        // Store errors can carry connection strings and the like; none
        // of that may reach the client
        let secret = "postgres://user:hunter2@db/prod";
        let err = AccountError::Database(sqlx::Error::Protocol(format!("bad dsn {secret}")));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response_body(err).await;
        assert!(!body.contains(secret), "body: {body}");
        assert!(!body.contains("bad dsn"), "body: {body}");
        assert!(body.contains("Internal error"), "body: {body}");
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let err = AccountError::Internal("argon2 backend exploded".to_string());

        let body = response_body(err).await;
        assert!(!body.contains("argon2"), "body: {body}");
        assert!(body.contains("Internal error"), "body: {body}");
    }

    #[tokio::test]
    async fn test_client_error_body_keeps_message() {
        let err = AccountError::Validation("Email cannot be empty".to_string());

        let body = response_body(err).await;
        assert!(body.contains("Email cannot be empty"), "body: {body}");
    }
}
