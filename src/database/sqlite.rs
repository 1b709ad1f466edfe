//! SQLite implementation of the Database trait
//!
//! This module provides a SQLite-based implementation of the Database trait
//! using rusqlite and tokio-rusqlite for async operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{ErrorCode, OptionalExtension};
use tokio_rusqlite::Connection;

use super::migrations::{migration_version, CREATE_SCHEMA};
use super::Database;
use crate::error::DbError;
use crate::models::{Item, User};

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for in-memory database or a file path for persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        // Run migrations
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            conn.pragma_update(None, "user_version", migration_version())?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, name, email, password_hash, created_at
                    FROM users
                    WHERE email = ?1
                    "#,
                )?;

                let result = stmt
                    .query_row([&email], |row| {
                        Ok(User {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            email: row.get(2)?,
                            password_hash: row.get(3)?,
                            created_at: parse_datetime(row.get::<_, Option<String>>(4)?)
                                .unwrap_or_else(Utc::now),
                        })
                    })
                    .optional()?;

                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn create_user(&self, user: &User) -> Result<(), DbError> {
        let id = user.id.clone();
        let name = user.name.clone();
        let email = user.email.clone();
        let password_hash = user.password_hash.clone();
        let created_at = user.created_at.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO users (id, name, email, password_hash, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    rusqlite::params![id, name, email, password_hash, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_constraint_violation)
    }

    // =========================================================================
    // Item operations
    // =========================================================================

    async fn insert_item(&self, item: &Item) -> Result<(), DbError> {
        let id = item.id.clone();
        let title = item.title.clone();
        let description = item.description.clone();
        let price = item.price;
        let image = item.image.clone();
        let seller_email = item.seller_email.clone();
        let contact_no = item.contact_no.clone();
        let college = item.college.clone();
        let sold = item.sold;
        let created_at = item.created_at.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO items
                    (id, title, description, price, image, seller_email, contact_no, college, sold, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    rusqlite::params![
                        id,
                        title,
                        description,
                        price,
                        image,
                        seller_email,
                        contact_no,
                        college,
                        sold,
                        created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_constraint_violation)
    }

    async fn list_items_by_college(&self, college: &str) -> Result<Vec<Item>, DbError> {
        let college = college.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, title, description, price, image, seller_email,
                           contact_no, college, sold, created_at
                    FROM items
                    WHERE college = ?1
                    ORDER BY seq
                    "#,
                )?;

                let items = stmt
                    .query_map([&college], |row| {
                        Ok(Item {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            description: row.get(2)?,
                            price: row.get(3)?,
                            image: row.get(4)?,
                            seller_email: row.get(5)?,
                            contact_no: row.get(6)?,
                            college: row.get(7)?,
                            sold: row.get::<_, i64>(8)? != 0,
                            created_at: parse_datetime(row.get::<_, Option<String>>(9)?)
                                .unwrap_or_else(Utc::now),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(items)
            })
            .await
            .map_err(Into::into)
    }

    async fn set_item_sold(&self, id: &str, sold: bool) -> Result<u64, DbError> {
        let id = id.to_string();

        self.conn
            .call(move |conn| {
                let count = conn.execute(
                    "UPDATE items SET sold = ?1 WHERE id = ?2",
                    rusqlite::params![sold, id],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Into::into)
    }
}

/// Map a UNIQUE/constraint failure to `DbError::ConstraintViolation`
fn map_constraint_violation(err: tokio_rusqlite::Error) -> DbError {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            DbError::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
        }
        other => other.into(),
    }
}

/// Parse a datetime string to DateTime<Utc>
fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // Try parsing SQLite's datetime format
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    })
}
