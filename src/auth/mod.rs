//! Authentication system for campus-market
//!
//! This module provides authentication functionality:
//! - Password hashing and verification
//! - Account registration and login
//! - Session token issuance and verification

pub mod credentials;
pub mod password;
pub mod session;

pub use credentials::CredentialManager;
pub use password::{hash_password, verify_password, HashError};
pub use session::SessionTokenService;
