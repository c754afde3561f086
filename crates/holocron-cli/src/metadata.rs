//! `holocron metadata`: manage the external card metadata cache.

use clap::Subcommand;
use holocron_core::AppConfig;
use holocron_enrich::{CacheStatus, CatalogOrigin, MetadataProvider};

/// Sub-commands available under `metadata`.
#[derive(Debug, Subcommand)]
pub enum MetadataCommands {
    /// Fetch the card catalog now, ignoring cache freshness
    Refresh,
    /// Show cache age and configured endpoints
    Status,
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built, or on `refresh` when
/// every endpoint fails.
pub(crate) async fn run_metadata(
    config: &AppConfig,
    command: &MetadataCommands,
) -> anyhow::Result<()> {
    let provider = MetadataProvider::from_app_config(config)?;
    match command {
        MetadataCommands::Refresh => {
            let fetched = provider.refresh().await?;
            let source = match &fetched.origin {
                CatalogOrigin::Endpoint(url) => url.as_str(),
                CatalogOrigin::Cache => "cache",
            };
            println!(
                "fetched {} cards from {source}; cache at {}",
                fetched.cards.len(),
                provider.cache().path().display()
            );
        }
        MetadataCommands::Status => {
            println!("cache: {}", provider.cache().path().display());
            println!("status: {}", describe_status(&provider.cache_status().await));
            println!("endpoints:");
            for url in &config.metadata_urls {
                println!("  {url}");
            }
        }
    }
    Ok(())
}

pub(crate) fn describe_status(status: &CacheStatus) -> String {
    match status {
        CacheStatus::Missing => "missing".to_string(),
        CacheStatus::Fresh { age } => format!("fresh ({} old)", format_age(age.as_secs())),
        CacheStatus::Stale { age } => format!("stale ({} old)", format_age(age.as_secs())),
    }
}

fn format_age(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
        _ => format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3600),
    }
}
