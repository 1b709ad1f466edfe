//! Application error types for campus-market
//!
//! This module defines the error types used throughout the application.
//! All error types use `thiserror`; `AppError` is the request-boundary error
//! and knows how to turn itself into an HTTP response.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Bearer authentication errors raised by the access gate
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Missing authorization header")]
    MissingAuth,

    /// Header present but not `Bearer <token>`
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Token failed signature or claim validation
    #[error("Invalid token")]
    InvalidToken,

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Account registration and login errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// An account with this email already exists
    #[error("User already exists")]
    AlreadyExists,

    /// No account with this email
    #[error("User not found")]
    NotFound,

    /// Password does not match the stored hash
    #[error("Incorrect password")]
    BadCredentials,

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error from the background connection thread
    #[error("Database connection error: {0}")]
    Connection(tokio_rusqlite::Error),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<tokio_rusqlite::Error> for DbError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => DbError::Sqlite(e),
            other => DbError::Connection(other),
        }
    }
}

/// Application-level error type
///
/// Every handler returns `Result<_, AppError>`; the status codes and messages
/// below are the service's public error contract.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid request input
    #[error("{0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Registration/login error
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AppError {
    /// Build a validation error with the given client-facing message
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Status code and client-facing message for this error
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Auth(AuthError::MissingAuth | AuthError::MalformedHeader) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::Auth(AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            // Unknown user shares the 400 status with the other login failures
            AppError::Credential(
                e @ (CredentialError::AlreadyExists
                | CredentialError::NotFound
                | CredentialError::BadCredentials),
            ) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Auth(AuthError::Signing(_))
            | AppError::Credential(CredentialError::Hash(_) | CredentialError::Database(_))
            | AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status.as_u16(), error = %self, "Request rejected");
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Error message formatting
    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::MissingAuth.to_string(),
            "Missing authorization header"
        );
        assert_eq!(
            AuthError::MalformedHeader.to_string(),
            "Malformed authorization header"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(
            AuthError::Signing("bad key".to_string()).to_string(),
            "Token signing failed: bad key"
        );
    }

    // Test 2: Credential errors carry the public messages
    #[test]
    fn test_credential_error_messages() {
        assert_eq!(
            CredentialError::AlreadyExists.to_string(),
            "User already exists"
        );
        assert_eq!(CredentialError::NotFound.to_string(), "User not found");
        assert_eq!(
            CredentialError::BadCredentials.to_string(),
            "Incorrect password"
        );
    }

    // Test 3: From trait conversions for AppError
    #[test]
    fn test_app_error_from_auth_error() {
        let app_err: AppError = AuthError::InvalidToken.into();

        match app_err {
            AppError::Auth(AuthError::InvalidToken) => (),
            _ => panic!("Expected AppError::Auth(AuthError::InvalidToken)"),
        }
    }

    // Test 4: DbError converts into CredentialError
    #[test]
    fn test_credential_error_from_db_error() {
        let err: CredentialError = DbError::ConstraintViolation("users.email".to_string()).into();
        assert!(matches!(
            err,
            CredentialError::Database(DbError::ConstraintViolation(_))
        ));
    }

    // Test 5: Missing and malformed headers both map to "Unauthorized"
    #[test]
    fn test_gate_rejections_map_to_unauthorized() {
        for err in [AuthError::MissingAuth, AuthError::MalformedHeader] {
            let (status, message) = AppError::Auth(err).status_and_message();
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Unauthorized");
        }

        let (status, message) = AppError::Auth(AuthError::InvalidToken).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid token");
    }

    // Test 6: Login and registration failures are 400s
    #[test]
    fn test_credential_errors_are_bad_request() {
        let cases = [
            (CredentialError::AlreadyExists, "User already exists"),
            (CredentialError::NotFound, "User not found"),
            (CredentialError::BadCredentials, "Incorrect password"),
        ];

        for (err, expected) in cases {
            let (status, message) = AppError::Credential(err).status_and_message();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, expected);
        }
    }

    // Test 7: Store failures do not leak details to clients
    #[test]
    fn test_internal_errors_are_opaque() {
        let cases = [
            AppError::Database(DbError::ConstraintViolation("users.email".to_string())),
            AppError::Credential(CredentialError::Hash("out of memory".to_string())),
            AppError::Auth(AuthError::Signing("bad key".to_string())),
            AppError::Database(DbError::Connection(tokio_rusqlite::Error::ConnectionClosed)),
        ];

        for err in cases {
            let (status, message) = err.status_and_message();
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Internal server error");
        }
    }

    // Test 8: Validation errors keep their message
    #[test]
    fn test_validation_error_message() {
        let err = AppError::validation("College required");
        assert_eq!(err.to_string(), "College required");

        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "College required");
    }

    // Test 9: DbError messages
    #[test]
    fn test_db_error_messages() {
        assert!(DbError::Connection(tokio_rusqlite::Error::ConnectionClosed)
            .to_string()
            .starts_with("Database connection error: "));
        assert_eq!(
            DbError::ConstraintViolation("unique".to_string()).to_string(),
            "Constraint violation: unique"
        );
    }

    // Test 10: DbError from rusqlite::Error
    #[test]
    fn test_db_error_from_sqlite() {
        let sqlite_err = rusqlite::Error::InvalidParameterName("test".to_string());
        let db_err: DbError = sqlite_err.into();

        match db_err {
            DbError::Sqlite(_) => (),
            _ => panic!("Expected DbError::Sqlite"),
        }
    }

    // Test 11: SQL errors from the connection thread stay SQL errors
    #[test]
    fn test_db_error_from_connection_thread() {
        let wrapped = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::InvalidQuery);
        assert!(matches!(
            DbError::from(wrapped),
            DbError::Sqlite(rusqlite::Error::InvalidQuery)
        ));

        assert!(matches!(
            DbError::from(tokio_rusqlite::Error::ConnectionClosed),
            DbError::Connection(tokio_rusqlite::Error::ConnectionClosed)
        ));
    }

    // Test 12: IntoResponse writes a plain-text body
    #[test]
    fn test_into_response_status() {
        let response = AppError::validation("Missing item details").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
