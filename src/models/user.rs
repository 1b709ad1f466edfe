//! Account and session models
//!
//! This module defines the stored user record, the authenticated identity,
//! the session token claims and the register/login payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Account stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique record ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Identity key, unique and compared case-sensitively
    pub email: String,

    /// Salted password hash (PHC string), never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a fresh ID
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_record_id(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// The identity this account authenticates as
    pub fn identity(&self) -> Identity {
        Identity::new(&self.email)
    }
}

/// Authenticated caller, as asserted by a valid session token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Claims carried by a session token
///
/// No `exp` claim is issued; a token stays valid until the signing secret
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated email
    pub email: String,

    /// Issued-at, seconds since the Unix epoch
    #[serde(default)]
    pub iat: i64,
}

impl SessionClaims {
    /// Claims for the given identity, issued now
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            email: identity.email.clone(),
            iat: Utc::now().timestamp(),
        }
    }
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Identity::new(claims.email)
    }
}

/// `POST /register` body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Registration input after presence checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Require name, email and password to be present and non-empty
    pub fn validate(self) -> Result<Registration, AppError> {
        match (non_empty(self.name), non_empty(self.email), non_empty(self.password)) {
            (Some(name), Some(email), Some(password)) => Ok(Registration {
                name,
                email,
                password,
            }),
            _ => Err(AppError::validation("Missing user details")),
        }
    }
}

/// `POST /login` body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Require email and password, returning them as `(email, password)`
    pub fn validate(self) -> Result<(String, String), AppError> {
        match (non_empty(self.email), non_empty(self.password)) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::validation("Missing credentials")),
        }
    }
}

/// `POST /login` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
