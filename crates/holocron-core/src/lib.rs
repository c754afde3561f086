pub mod app_config;
pub mod card_key;
pub mod catalog;
pub mod config;
pub mod inventory;
pub mod stats;
pub mod variants;
pub mod vocabulary;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, DEFAULT_METADATA_URLS};
pub use card_key::{normalize_card_number, normalize_set_code, CardKey, InvalidKeyError};
pub use catalog::{CatalogRecord, EnrichedCardMetadata, MetadataSource};
pub use config::{load_app_config, load_app_config_from_env};
pub use inventory::{AggregatedInventoryEntry, InventoryRow, SheetMetadata};
pub use stats::{completion_percentage, CollectionStatistics, GroupStatistics, StatsOverview};
pub use variants::{VariantName, VariantPatch, VariantPatchError, VariantQuantities};
pub use vocabulary::{Aspect, CardType, Rarity, Translation};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
