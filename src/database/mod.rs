//! Database layer for campus-market
//!
//! This module defines the database trait and SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{Item, User};

/// Database trait for data persistence
///
/// This trait defines all database operations needed by the application.
/// It uses `async_trait` for async methods and `mockall::automock` for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Find an account by exact (case-sensitive) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Insert a new account
    ///
    /// Fails with `DbError::ConstraintViolation` if the email is already taken.
    async fn create_user(&self, user: &User) -> Result<(), DbError>;

    // =========================================================================
    // Item operations
    // =========================================================================

    /// Insert a new item listing
    async fn insert_item(&self, item: &Item) -> Result<(), DbError>;

    /// List all items for a college in insertion order
    async fn list_items_by_college(&self, college: &str) -> Result<Vec<Item>, DbError>;

    /// Set the sold flag of an item
    ///
    /// Returns the number of updated records (0 for an unknown ID).
    async fn set_item_sold(&self, id: &str, sold: bool) -> Result<u64, DbError>;
}
