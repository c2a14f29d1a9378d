//! Products API - REST server for the product catalogue

use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        environment = ?config.environment,
        "Starting Products API"
    );

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        database = config.mongodb.database(),
        collection = %config.products_collection,
        "Successfully connected to MongoDB"
    );

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
    };

    api::init_indexes(&state).await;

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &config.cors)?;

    let mongo_client = state.mongo_client.clone();
    create_production_app(router, &config.server, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed");
    })
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
