//! Products API routes

use axum::Router;
use domain_products::{handlers, MongoProductRepository, ProductService};

use crate::state::AppState;

fn repository(state: &AppState) -> MongoProductRepository {
    MongoProductRepository::with_collection(&state.db, &state.config.products_collection)
}

/// Create products router
pub fn router(state: &AppState) -> Router {
    handlers::router(ProductService::new(repository(state)))
}

/// Initialize products indexes, returning whether the unique name index exists.
///
/// A failure is logged and startup continues. Collections that already hold
/// duplicate names cannot take the index until those duplicates are merged
/// or renamed; until then creates rely on the pre-insert name check.
pub async fn init_indexes(state: &AppState) -> bool {
    match repository(state).init_indexes().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                collection = %state.config.products_collection,
                error = %e,
                "Unique name index unavailable, continuing with the pre-insert check only"
            );
            false
        }
    }
}
