//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use campus_market::auth::SessionTokenService;
use campus_market::database::SqliteDatabase;
use campus_market::models::LoginResponse;
use campus_market::server::{serve, AppState};
use reqwest::StatusCode;
use serde_json::json;

/// Signing secret shared by test servers
pub const TEST_SECRET: &str = "integration-secret";

/// Create an in-memory database for testing
pub async fn create_test_database() -> Arc<SqliteDatabase> {
    Arc::new(
        SqliteDatabase::in_memory()
            .await
            .expect("Failed to create test database"),
    )
}

/// Create a test application state
pub async fn create_test_state() -> AppState<SqliteDatabase> {
    let database = create_test_database().await;
    AppState::new(database, SessionTokenService::new(TEST_SECRET))
}

/// Running test server
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Absolute URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register an account, asserting success
    pub async fn register(&self, name: &str, email: &str, password: &str) {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "User registered");
    }

    /// Log in, asserting success, and return the session token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        response.json::<LoginResponse>().await.unwrap().token
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Run a test server in the background on an ephemeral port
///
/// The server shuts down when the returned [`TestApp`] is dropped.
pub async fn run_test_server(state: AppState<SqliteDatabase>) -> TestApp {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        serve(listener, state, async move {
            let _ = shutdown_rx.await;
        })
        .await
        .expect("Server error");
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
        shutdown_tx: Some(shutdown_tx),
    }
}

/// Start a fresh server backed by an in-memory database
pub async fn spawn_app() -> TestApp {
    run_test_server(create_test_state().await).await
}

/// A complete item body for `POST /post`
pub fn item_body(title: &str, college: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Good condition",
        "price": 2500,
        "image": "https://img.example/cycle.jpg",
        "sellerEmail": "a@x.edu",
        "contactNo": "9876543210",
        "college": college
    })
}
