//! On-disk cache of the normalized external card list.
//!
//! Freshness is judged by the file's modification time. An unreadable or
//! corrupt cache is treated as a miss, never as an error.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::EnrichError;
use crate::types::RawExternalCard;

/// Freshness of the cache file at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Missing,
    Fresh { age: Duration },
    Stale { age: Duration },
}

#[derive(Debug, Clone)]
pub struct CardCache {
    path: PathBuf,
    max_age: Duration,
}

impl CardCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether the cache file exists and how old it is.
    pub async fn status(&self) -> CacheStatus {
        let Ok(meta) = tokio::fs::metadata(&self.path).await else {
            return CacheStatus::Missing;
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|m| SystemTime::now().duration_since(m).ok())
            .unwrap_or(Duration::ZERO);
        if age < self.max_age {
            CacheStatus::Fresh { age }
        } else {
            CacheStatus::Stale { age }
        }
    }

    /// Returns the cached cards if the file is younger than the maximum age
    /// and parses as a non-empty card list.
    pub async fn load_fresh(&self) -> Option<Vec<RawExternalCard>> {
        match self.status().await {
            CacheStatus::Fresh { .. } => {}
            CacheStatus::Missing => return None,
            CacheStatus::Stale { age } => {
                tracing::debug!(
                    path = %self.path.display(),
                    age_secs = age.as_secs(),
                    "metadata cache is stale"
                );
                return None;
            }
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "metadata cache unreadable; ignoring");
                return None;
            }
        };
        match serde_json::from_slice::<Vec<RawExternalCard>>(&bytes) {
            Ok(cards) if !cards.is_empty() => Some(cards),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "metadata cache is empty; ignoring");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "metadata cache is corrupt; ignoring");
                None
            }
        }
    }

    /// Replaces the cache file. Writes to a sibling temp file first and
    /// renames it into place so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Cache`] on any filesystem failure and
    /// [`EnrichError::Deserialize`] if the cards cannot be serialized.
    pub async fn store(&self, cards: &[RawExternalCard]) -> Result<(), EnrichError> {
        let io_err = |source| EnrichError::Cache {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let body = serde_json::to_vec(cards).map_err(|e| EnrichError::Deserialize {
            context: "metadata cache".to_string(),
            source: e,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), cards = cards.len(), "metadata cache written");
        Ok(())
    }
}
