//! Item store accessor
//!
//! Validates listing input and forwards it to the database. Listings are
//! scoped by college; the only mutation after creation is the sold flag.

use std::sync::Arc;

use crate::database::Database;
use crate::error::AppError;
use crate::models::{CreateItemRequest, Item};

/// Item store accessor
pub struct ItemStore<D: Database> {
    db: Arc<D>,
}

impl<D: Database> ItemStore<D> {
    /// Create a new item store
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Validate and insert a new listing, unsold
    pub async fn create(&self, request: CreateItemRequest) -> Result<Item, AppError> {
        let item = Item::new(request.validate()?);
        self.db.insert_item(&item).await?;

        tracing::info!(item_id = %item.id, college = %item.college, "Item posted");
        Ok(item)
    }

    /// All listings for a college, sold or not
    pub async fn list_by_college(&self, college: Option<&str>) -> Result<Vec<Item>, AppError> {
        let college = college
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::validation("College required"))?;

        Ok(self.db.list_items_by_college(college).await?)
    }

    /// Set the sold flag
    ///
    /// Unknown IDs are not an error; the update simply touches nothing.
    pub async fn set_sold(&self, id: &str, sold: bool) -> Result<(), AppError> {
        let updated = self.db.set_item_sold(id, sold).await?;

        if updated == 0 {
            tracing::debug!(item_id = %id, "Sold flag update matched no item");
        }
        Ok(())
    }
}
