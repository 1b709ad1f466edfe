//! Domain models for campus-market
//!
//! This module contains the core domain models used throughout the application.

pub mod item;
pub mod user;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

// Re-export commonly used types
pub use item::{CreateItemRequest, Item, ListQuery, NewItem};
pub use user::{
    Identity, LoginRequest, LoginResponse, RegisterRequest, Registration, SessionClaims, User,
};

/// Length of the random part of a record ID in bytes
const RECORD_ID_BYTES: usize = 16;

/// Generate a new record ID
///
/// 16 random bytes encoded as URL-safe Base64 (22 characters), so IDs can be
/// used in request paths without escaping.
pub fn new_record_id() -> String {
    let mut id_bytes = [0u8; RECORD_ID_BYTES];
    OsRng.fill_bytes(&mut id_bytes);
    URL_SAFE_NO_PAD.encode(id_bytes)
}
