use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::ProductResult;
use crate::models::{Product, ProductChanges};

/// Repository trait for Product persistence
///
/// Each method maps to exactly one storage call; validation lives in the
/// service layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, ordered by name ascending
    async fn list_by_name(&self) -> ProductResult<Vec<Product>>;

    /// Check if a product with exactly this name exists
    async fn exists_by_name(&self, name: &str) -> ProductResult<bool>;

    /// Insert a new product and return the id assigned by the store
    async fn insert(&self, product: Product) -> ProductResult<ObjectId>;

    /// Apply a partial update; returns the number of matched documents
    async fn update_fields(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<u64>;

    /// Delete by id; returns the number of removed documents
    async fn delete(&self, id: ObjectId) -> ProductResult<u64>;
}
