//! HTTP client for the published card database endpoints.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::EnrichError;
use crate::retry::retry_with_backoff;
use crate::types::RawExternalCard;

/// Fetches the full card list from a configured, ordered set of endpoints.
///
/// Each endpoint gets up to `1 + max_retries` attempts on transient errors.
/// Endpoints are tried in order and the first one that yields at least one
/// usable card wins.
pub struct MetadataClient {
    client: Client,
    endpoints: Vec<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl MetadataClient {
    /// Creates a client with the configured timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoints: Vec<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Walks the endpoint list in order and returns the first usable catalog
    /// together with the URL that served it.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MetadataUnavailable`] listing every attempted
    /// URL and its failure when no endpoint produced a usable catalog.
    pub async fn fetch_first_available(
        &self,
    ) -> Result<(String, Vec<RawExternalCard>), EnrichError> {
        let mut attempts = Vec::with_capacity(self.endpoints.len());
        for url in &self.endpoints {
            match self.fetch_endpoint(url).await {
                Ok(cards) => {
                    tracing::info!(url = %url, cards = cards.len(), "card database fetched");
                    return Ok((url.clone(), cards));
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "card database endpoint failed; trying next");
                    attempts.push(format!("{url}: {e}"));
                }
            }
        }
        Err(EnrichError::MetadataUnavailable { attempts })
    }

    /// Fetches and normalizes one endpoint, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::UnexpectedStatus`] for any non-2xx status.
    /// - [`EnrichError::Http`] for network or TLS failures after retries.
    /// - [`EnrichError::Deserialize`] when the body is not JSON.
    /// - [`EnrichError::UnexpectedShape`] when the JSON is not a card array.
    /// - [`EnrichError::EmptyCatalog`] when no element normalizes to a card.
    pub async fn fetch_endpoint(&self, url: &str) -> Result<Vec<RawExternalCard>, EnrichError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(EnrichError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let parsed: Value = serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
            context: format!("card list from {url}"),
            source: e,
        })?;
        let cards = normalize_card_list(url, parsed)?;
        if cards.is_empty() {
            return Err(EnrichError::EmptyCatalog {
                url: url.to_owned(),
            });
        }
        Ok(cards)
    }
}

/// Accepts either a bare array or an object wrapping the array under `data`.
fn normalize_card_list(url: &str, parsed: Value) -> Result<Vec<RawExternalCard>, EnrichError> {
    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(EnrichError::UnexpectedShape {
                    url: url.to_owned(),
                })
            }
        },
        _ => {
            return Err(EnrichError::UnexpectedShape {
                url: url.to_owned(),
            })
        }
    };

    let total = items.len();
    let cards: Vec<RawExternalCard> = items.iter().filter_map(RawExternalCard::from_json).collect();
    if cards.len() < total {
        tracing::debug!(
            url,
            dropped = total - cards.len(),
            "dropped card entries without name, set or number"
        );
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_is_accepted() {
        let cards = normalize_card_list(
            "u",
            json!([{ "name": "A", "setCode": "SOR", "number": "1" }]),
        )
        .unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn data_wrapper_is_accepted() {
        let cards = normalize_card_list(
            "u",
            json!({ "data": [{ "name": "A", "setCode": "SOR", "number": "1" }, { "bogus": true }] }),
        )
        .unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(matches!(
            normalize_card_list("u", json!({ "cards": [] })),
            Err(EnrichError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            normalize_card_list("u", json!("nope")),
            Err(EnrichError::UnexpectedShape { .. })
        ));
    }
}
