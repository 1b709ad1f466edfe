//! Listing models
//!
//! This module defines the stored item record and the `POST /post` payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Item listing stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique record ID
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    pub description: String,

    /// Asking price, no currency normalization
    pub price: f64,

    /// Opaque image URL or identifier
    pub image: String,

    /// Poster's email as typed, not a reference to a user record
    pub seller_email: String,

    pub contact_no: String,

    /// Partition key for listings
    pub college: String,

    pub sold: bool,

    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new, unsold item from validated details
    pub fn new(details: NewItem) -> Self {
        Self {
            id: super::new_record_id(),
            title: details.title,
            description: details.description,
            price: details.price,
            image: details.image,
            seller_email: details.seller_email,
            contact_no: details.contact_no,
            college: details.college,
            sold: false,
            created_at: Utc::now(),
        }
    }
}

/// Item details after presence checks
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub seller_email: String,
    pub contact_no: String,
    pub college: String,
}

/// `POST /post` body
///
/// Text fields accept JSON strings, numbers and booleans (phone numbers are
/// often sent as numbers); the price accepts a number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub seller_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub college: Option<String>,
}

impl CreateItemRequest {
    /// Require every field to be present and non-empty, and the price to be a
    /// non-zero number
    pub fn validate(self) -> Result<NewItem, AppError> {
        let missing = || AppError::validation("Missing item details");

        Ok(NewItem {
            title: present(self.title).ok_or_else(missing)?,
            description: present(self.description).ok_or_else(missing)?,
            price: self.price.as_ref().and_then(parse_price).ok_or_else(missing)?,
            image: present(self.image).ok_or_else(missing)?,
            seller_email: present(self.seller_email).ok_or_else(missing)?,
            contact_no: present(self.contact_no).ok_or_else(missing)?,
            college: present(self.college).ok_or_else(missing)?,
        })
    }
}

/// `GET /list` query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub college: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a price, rejecting zero, NaN and infinities
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (price.is_finite() && price != 0.0).then_some(price)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    // Falsy scalars (`0`, `false`) count as absent
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some(true.to_string()),
        _ => None,
    })
}
