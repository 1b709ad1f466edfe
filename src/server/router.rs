//! HTTP router for campus-market
//!
//! This module defines the axum router that handles all HTTP requests.
//! It provides routes for:
//! - Health checks
//! - Account registration and login
//! - Posting, listing and marking items (bearer session required)

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{CredentialManager, SessionTokenService};
use crate::database::Database;
use crate::error::AppError;
use crate::items::ItemStore;
use crate::models::{
    CreateItemRequest, Identity, Item, ListQuery, LoginRequest, LoginResponse, RegisterRequest,
};

use super::middleware::{auth_middleware, logging_middleware};

/// Shared application state
pub struct AppState<D: Database> {
    /// Account registration and password login
    pub credentials: Arc<CredentialManager<D>>,

    /// Session token issuance and verification
    pub sessions: Arc<SessionTokenService>,

    /// Item listings
    pub items: Arc<ItemStore<D>>,
}

impl<D: Database> AppState<D> {
    /// Build the state from a shared database and token service
    pub fn new(db: Arc<D>, sessions: SessionTokenService) -> Self {
        Self {
            credentials: Arc::new(CredentialManager::new(Arc::clone(&db))),
            sessions: Arc::new(sessions),
            items: Arc::new(ItemStore::new(db)),
        }
    }
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            credentials: Arc::clone(&self.credentials),
            sessions: Arc::clone(&self.sessions),
            items: Arc::clone(&self.items),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the main application router
///
/// # Arguments
///
/// * `state` - Application state containing the credential, session and item services
///
/// # Returns
///
/// An axum Router configured with all endpoints
pub fn build_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let public = Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler::<D>))
        .route("/login", post(login_handler::<D>));

    let protected = Router::new()
        .route("/post", post(post_item_handler::<D>))
        .route("/list", get(list_items_handler::<D>))
        .route("/mark-sold/:id", post(mark_sold_handler::<D>))
        .route("/mark-unsold/:id", post(mark_unsold_handler::<D>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

// =============================================================================
// Health Handler
// =============================================================================

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Account Handlers
// =============================================================================

// Bodies that are absent or not JSON fall through to field validation, so
// they get the same 400 as a body with missing fields.

/// POST /register
async fn register_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    body: Option<Json<RegisterRequest>>,
) -> Result<&'static str, AppError> {
    let registration = body.map(|Json(b)| b).unwrap_or_default().validate()?;

    state.credentials.register(registration).await?;

    Ok("User registered")
}

/// POST /login
async fn login_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = body.map(|Json(b)| b).unwrap_or_default().validate()?;

    let identity = state.credentials.verify(&email, &password).await?;
    let token = state.sessions.issue(&identity)?;

    tracing::info!(email = %identity.email, "Session issued");
    Ok(Json(LoginResponse { token }))
}

// =============================================================================
// Item Handlers
// =============================================================================

/// POST /post
async fn post_item_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    body: Option<Json<CreateItemRequest>>,
) -> Result<&'static str, AppError> {
    state
        .items
        .create(body.map(|Json(b)| b).unwrap_or_default())
        .await?;

    Ok("Item posted")
}

/// GET /list?college=...
///
/// A query string that does not parse (for example a repeated `college`)
/// is treated as having no college.
async fn list_items_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    query: Option<Query<ListQuery>>,
) -> Result<Json<Vec<Item>>, AppError> {
    let college = query.and_then(|Query(q)| q.college);
    let items = state.items.list_by_college(college.as_deref()).await?;
    Ok(Json(items))
}

/// POST /mark-sold/:id
async fn mark_sold_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<&'static str, AppError> {
    state.items.set_sold(&id, true).await?;

    tracing::info!(item_id = %id, by = %identity.email, "Item marked as sold");
    Ok("Marked as sold")
}

/// POST /mark-unsold/:id
async fn mark_unsold_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<&'static str, AppError> {
    state.items.set_sold(&id, false).await?;

    tracing::info!(item_id = %id, by = %identity.email, "Item marked as available");
    Ok("Marked as available")
}
