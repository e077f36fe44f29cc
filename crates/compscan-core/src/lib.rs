pub mod app_config;
pub mod cache;
pub mod config;
pub mod geo;
pub mod models;
pub mod pricing;
pub mod retry;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cache::{CachedValue, SharedCache, TtlCache};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::haversine_miles;
pub use models::{
    Coordinate, CompetitorRecord, DataSource, PlaceCandidate, PlaceDetail, PriceSuggestion,
    ScrapeResult,
};
pub use pricing::{
    median, numeric_prices, suggest, CompetitorPrice, PricingError, CONFIDENCE, UNDERCUT,
};
pub use retry::{Retriable, RetryPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
