//! Background job scheduler.
//!
//! Keeps the card metadata cache warm so CLI imports rarely hit the network.

use std::sync::Arc;

use holocron_core::AppConfig;
use holocron_enrich::MetadataProvider;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(config: &AppConfig) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match MetadataProvider::from_app_config(config) {
        Ok(provider) => {
            register_metadata_refresh_job(
                &scheduler,
                &config.metadata_refresh_schedule,
                Arc::new(provider),
            )
            .await?;
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: metadata client unavailable; refresh job not registered");
        }
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Registers the metadata cache refresh on `schedule` (6-field cron, UTC).
async fn register_metadata_refresh_job(
    scheduler: &JobScheduler,
    schedule: &str,
    provider: Arc<MetadataProvider>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let provider = Arc::clone(&provider);

        Box::pin(async move {
            tracing::info!("scheduler: starting metadata cache refresh");
            match provider.refresh().await {
                Ok(fetched) => tracing::info!(
                    cards = fetched.cards.len(),
                    "scheduler: metadata cache refreshed"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: metadata cache refresh failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: metadata refresh job registered");
    Ok(())
}
