//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductChanges};
use crate::repository::ProductRepository;

/// Default collection name
pub const PRODUCTS_COLLECTION: &str = "products";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository over the `products` collection
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, PRODUCTS_COLLECTION)
    }

    /// Create a new MongoProductRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Create the unique `name` index.
    ///
    /// Names are unique even under concurrent creates, and the ascending
    /// index also serves the list sort.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(name_index).await?;
        tracing::info!(
            collection = self.collection.name(),
            "Product indexes created successfully"
        );
        Ok(())
    }

    fn by_id(id: ObjectId) -> Document {
        doc! { "_id": id }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn list_by_name(&self) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> ProductResult<bool> {
        let filter = doc! { "name": name };
        let count = self.collection.count_documents(filter).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn insert(&self, product: Product) -> ProductResult<ObjectId> {
        let result = self.collection.insert_one(&product).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            ProductError::Database(format!(
                "Unexpected inserted id: {}",
                result.inserted_id
            ))
        })?;

        tracing::info!(product_id = %id, "Product created successfully");
        Ok(id)
    }

    #[instrument(skip(self, changes))]
    async fn update_fields(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<u64> {
        let update = doc! { "$set": changes.to_set_document() };
        let result = self.collection.update_one(Self::by_id(id), update).await?;

        if result.matched_count > 0 {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(result.matched_count)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<u64> {
        let result = self.collection.delete_one(Self::by_id(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id_filter() {
        let id = ObjectId::new();
        let filter = MongoProductRepository::by_id(id);
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
        assert_eq!(filter.len(), 1);
    }
}
