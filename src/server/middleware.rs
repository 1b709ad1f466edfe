//! HTTP middleware for campus-market
//!
//! This module provides middleware layers for:
//! - Bearer session authentication
//! - Request/response logging

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::SessionTokenService;
use crate::error::{AppError, AuthError};
use crate::models::Identity;

/// Required prefix of the Authorization header
const BEARER_PREFIX: &str = "Bearer ";

/// Resolve the caller's identity from request headers
///
/// The token is the text between the first and second space of the header
/// value, so anything after a second space is ignored.
pub fn authenticate(
    headers: &HeaderMap,
    sessions: &SessionTokenService,
) -> Result<Identity, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    if !value.starts_with(BEARER_PREFIX) {
        return Err(AuthError::MalformedHeader);
    }

    let token = value
        .split(' ')
        .nth(1)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)?;

    sessions.verify(token)
}

/// Authentication middleware function
///
/// Rejects the request with 401 unless it carries a valid session token,
/// otherwise adds the caller's [`Identity`] to the request extensions.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionTokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(request.headers(), &sessions)?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}
