//! Cron-driven feed runs using tokio-cron-scheduler.
//!
//! Each feed gets its own job, evaluated in the configured timezone. A job
//! only ever touches its own feed, so one feed failing leaves the others on
//! schedule.

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::jobs::sift_feed::run_feed;
use crate::AppState;

/// A running scheduler and the job registered for each feed.
pub struct FeedScheduler {
    pub scheduler: JobScheduler,
    pub jobs: Vec<(String, Uuid)>,
}

fn feed_job(state: &AppState, feed: &FeedConfig) -> Result<Job> {
    let schedule = feed.schedule();
    let job_state = state.clone();
    let job_feed = feed.clone();

    let job = Job::new_async_tz(schedule.as_str(), state.config.timezone, move |_uuid, _lock| {
        let state = job_state.clone();
        let feed = job_feed.clone();
        Box::pin(async move {
            if let Err(e) = run_feed(&state, &feed).await {
                tracing::error!("Scheduled run of feed {} failed: {}", feed.name, e);
            }
        })
    })
    .with_context(|| format!("invalid cron expression {:?} for feed {}", feed.cron, feed.name))?;

    Ok(job)
}

/// Register one job per configured feed and start the scheduler.
pub async fn start_scheduler(state: AppState) -> Result<FeedScheduler> {
    let scheduler = JobScheduler::new().await?;
    let mut jobs = Vec::with_capacity(state.config.feeds.len());

    for feed in &state.config.feeds {
        let job = feed_job(&state, feed)?;
        let id = scheduler.add(job).await?;
        tracing::info!(
            "Scheduled feed {} with cron {:?} as {:?} ({})",
            feed.name,
            feed.cron,
            feed.schedule(),
            state.config.timezone
        );
        jobs.push((feed.name.clone(), id));
    }

    scheduler.start().await?;
    tracing::info!("Scheduler started for {} feeds", jobs.len());
    Ok(FeedScheduler { scheduler, jobs })
}
