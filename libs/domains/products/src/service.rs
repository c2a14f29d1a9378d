//! Product Service - Business logic layer

use mongodb::bson::{self, oid::ObjectId};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, ProductChanges, ProductResponse, UpdateProduct};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// All input validation happens here, before the repository is touched.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List all products ordered by name
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<ProductResponse>> {
        let products = self.repository.list_by_name().await?;
        Ok(products.into_iter().map(ProductResponse::from).collect())
    }

    /// Create a new product
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ObjectId> {
        let product = input.into_product(bson::DateTime::now())?;

        if self.repository.exists_by_name(&product.name).await? {
            return Err(ProductError::AlreadyExists);
        }

        self.repository.insert(product).await
    }

    /// Apply a partial update and return the fields that were set
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, input: UpdateProduct) -> ProductResult<ProductChanges> {
        let (id, changes) = input.into_changes(bson::DateTime::now())?;
        let id = ObjectId::parse_str(&id)?;

        let matched = self.repository.update_fields(id, changes.clone()).await?;
        if matched == 0 {
            return Err(ProductError::NotFound);
        }

        Ok(changes)
    }

    /// Delete a product by its hex id
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Option<String>) -> ProductResult<()> {
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or(ProductError::MissingDeleteId)?;
        let id = ObjectId::parse_str(&id)?;

        if self.repository.delete(id).await? == 0 {
            return Err(ProductError::NotFound);
        }

        Ok(())
    }
}
