//! Credential manager
//!
//! This module owns account creation and password verification. Hashing
//! and verification run on the blocking thread pool.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{CredentialError, DbError};
use crate::models::{Identity, Registration, User};

use super::password::{hash_password, verify_password};

/// Credential manager
///
/// Provides account registration and password login on top of the database.
pub struct CredentialManager<D: Database> {
    db: Arc<D>,
}

impl<D: Database> CredentialManager<D> {
    /// Create a new credential manager
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Register a new account
    ///
    /// Fails with `AlreadyExists` when the email is taken, either by the
    /// lookup before hashing or by the store's unique constraint when two
    /// registrations race.
    pub async fn register(&self, registration: Registration) -> Result<User, CredentialError> {
        let Registration {
            name,
            email,
            password,
        } = registration;

        if self.db.find_user_by_email(&email).await?.is_some() {
            return Err(CredentialError::AlreadyExists);
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        let user = User::new(name, email, password_hash);

        match self.db.create_user(&user).await {
            Ok(()) => {
                tracing::info!(email = %user.email, user_id = %user.id, "User registered");
                Ok(user)
            }
            Err(DbError::ConstraintViolation(_)) => Err(CredentialError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify an email/password pair
    ///
    /// Returns the account's identity on success.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let user = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or(CredentialError::NotFound)?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        if !matches {
            tracing::debug!(email = %email, "Password mismatch");
            return Err(CredentialError::BadCredentials);
        }

        Ok(user.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockDatabase;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn create_test_manager(db: MockDatabase) -> CredentialManager<MockDatabase> {
        CredentialManager::new(Arc::new(db))
    }

    // Test 1: register stores a hashed password
    #[tokio::test]
    async fn test_register_success() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_user_by_email().returning(|_| Ok(None));
        mock_db
            .expect_create_user()
            .withf(|user| {
                user.email == "a@x.edu"
                    && user.password_hash.starts_with("$argon2id$")
                    && verify_password("pw1", &user.password_hash)
            })
            .times(1)
            .returning(|_| Ok(()));

        let manager = create_test_manager(mock_db);
        let user = manager.register(registration("a@x.edu", "pw1")).await.unwrap();

        assert_eq!(user.name, "Alice");
        assert_ne!(user.password_hash, "pw1");
    }

    // Test 2: register fails when the email is already taken
    #[tokio::test]
    async fn test_register_already_exists() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .returning(|_| Ok(Some(User::new("Alice", "a@x.edu", "hash"))));
        mock_db.expect_create_user().never();

        let manager = create_test_manager(mock_db);
        let result = manager.register(registration("a@x.edu", "pw1")).await;

        assert!(matches!(result, Err(CredentialError::AlreadyExists)));
    }

    // Test 3: losing the registration race still reports AlreadyExists
    #[tokio::test]
    async fn test_register_race_maps_constraint_violation() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_user_by_email().returning(|_| Ok(None));
        mock_db
            .expect_create_user()
            .returning(|_| Err(DbError::ConstraintViolation("users.email".to_string())));

        let manager = create_test_manager(mock_db);
        let result = manager.register(registration("a@x.edu", "pw1")).await;

        assert!(matches!(result, Err(CredentialError::AlreadyExists)));
    }

    // Test 4: store failures propagate as database errors
    #[tokio::test]
    async fn test_register_database_error() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .returning(|_| Err(DbError::Sqlite(rusqlite::Error::InvalidQuery)));

        let manager = create_test_manager(mock_db);
        let result = manager.register(registration("a@x.edu", "pw1")).await;

        assert!(matches!(result, Err(CredentialError::Database(_))));
    }

    // Test 5: verify succeeds with the right password
    #[tokio::test]
    async fn test_verify_success() {
        let hash = hash_password("pw1").unwrap();
        let stored = User::new("Alice", "a@x.edu", hash);

        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .withf(|email| email == "a@x.edu")
            .returning(move |_| Ok(Some(stored.clone())));

        let manager = create_test_manager(mock_db);
        let identity = manager.verify("a@x.edu", "pw1").await.unwrap();

        assert_eq!(identity, Identity::new("a@x.edu"));
    }

    // Test 6: verify fails for unknown user
    #[tokio::test]
    async fn test_verify_not_found() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_user_by_email().returning(|_| Ok(None));

        let manager = create_test_manager(mock_db);
        let result = manager.verify("nobody@x.edu", "pw1").await;

        assert!(matches!(result, Err(CredentialError::NotFound)));
    }

    // Test 7: verify fails with the wrong password
    #[tokio::test]
    async fn test_verify_bad_credentials() {
        let hash = hash_password("pw1").unwrap();
        let stored = User::new("Alice", "a@x.edu", hash);

        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let manager = create_test_manager(mock_db);
        let result = manager.verify("a@x.edu", "wrong").await;

        assert!(matches!(result, Err(CredentialError::BadCredentials)));
    }

    // Test 8: accounts hashed with bcrypt can still log in
    #[tokio::test]
    async fn test_verify_legacy_bcrypt_account() {
        let legacy_hash = bcrypt::hash("pw1", 10).unwrap();
        let stored = User::new("Alice", "a@x.edu", legacy_hash);

        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let manager = create_test_manager(mock_db);
        assert!(manager.verify("a@x.edu", "pw1").await.is_ok());
    }
}
