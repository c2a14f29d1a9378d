//! Configuration for Products API

use core_config::{app_info, cors::CorsConfig, env_or_default, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use domain_products::mongodb::PRODUCTS_COLLECTION;

pub use core_config::Environment;

/// Database used when `MONGODB_DATABASE` is not set
pub const DEFAULT_DATABASE: &str = "samanShop";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub environment: Environment,
    /// `PRODUCTS_COLLECTION`, defaults to `products`
    pub products_collection: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env_or_database(DEFAULT_DATABASE)?;
        let server = ServerConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let products_collection = env_or_default("PRODUCTS_COLLECTION", PRODUCTS_COLLECTION);

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            cors,
            environment,
            products_collection,
        })
    }
}
