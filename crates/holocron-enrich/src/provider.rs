use std::time::Duration;

use holocron_core::AppConfig;

use crate::cache::{CacheStatus, CardCache};
use crate::client::MetadataClient;
use crate::error::EnrichError;
use crate::types::RawExternalCard;

/// Where a fetched card list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    Cache,
    Endpoint(String),
}

#[derive(Debug, Clone)]
pub struct FetchedCatalog {
    pub cards: Vec<RawExternalCard>,
    pub origin: CatalogOrigin,
}

/// Cache-first access to the external card database.
pub struct MetadataProvider {
    client: MetadataClient,
    cache: CardCache,
}

impl MetadataProvider {
    #[must_use]
    pub fn new(client: MetadataClient, cache: CardCache) -> Self {
        Self { client, cache }
    }

    /// Builds the client and cache from application config.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, EnrichError> {
        let client = MetadataClient::new(
            config.metadata_urls.clone(),
            config.metadata_request_timeout_secs,
            &config.metadata_user_agent,
            config.metadata_max_retries,
            config.metadata_retry_backoff_base_ms,
        )?;
        let cache = CardCache::new(
            config.metadata_cache_path.clone(),
            Duration::from_secs(config.metadata_cache_max_age_secs),
        );
        Ok(Self::new(client, cache))
    }

    #[must_use]
    pub fn cache(&self) -> &CardCache {
        &self.cache
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }

    /// Returns the fresh cache if there is one, otherwise fetches from the
    /// endpoints and rewrites the cache.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MetadataUnavailable`] when the cache is missing
    /// or stale and every endpoint fails.
    pub async fn fetch_all(&self) -> Result<FetchedCatalog, EnrichError> {
        if let Some(cards) = self.cache.load_fresh().await {
            tracing::info!(
                path = %self.cache.path().display(),
                cards = cards.len(),
                "using cached card metadata"
            );
            return Ok(FetchedCatalog {
                cards,
                origin: CatalogOrigin::Cache,
            });
        }
        self.refresh().await
    }

    /// Fetches from the endpoints regardless of cache freshness and rewrites
    /// the cache. A cache write failure is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MetadataUnavailable`] when every endpoint fails.
    pub async fn refresh(&self) -> Result<FetchedCatalog, EnrichError> {
        let (url, cards) = self.client.fetch_first_available().await?;
        if let Err(e) = self.cache.store(&cards).await {
            tracing::warn!(error = %e, "failed to write metadata cache");
        }
        Ok(FetchedCatalog {
            cards,
            origin: CatalogOrigin::Endpoint(url),
        })
    }
}
