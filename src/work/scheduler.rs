use std::time::Duration;

use tokio::sync::watch;

use crate::config::Config;

use super::refresh::{JobOutcome, RefreshDataJob, WORK_NAME};

/// Exponential backoff applied between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (zero based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(30),
            max: Duration::from_secs(5 * 60 * 60),
        }
    }
}

/// Host-side runner that executes a [`RefreshDataJob`] on a fixed period.
///
/// Executions never overlap. A `Retry` outcome reschedules after the backoff
/// delay, anything else waits for the next regular period.
pub struct PeriodicScheduler {
    interval: Duration,
    backoff: BackoffPolicy,
}

impl PeriodicScheduler {
    pub fn new(interval: Duration, backoff: BackoffPolicy) -> Self {
        Self { interval, backoff }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.refresh_interval(),
            BackoffPolicy {
                initial: Duration::from_secs(config.retry_initial_backoff_secs),
                max: Duration::from_secs(config.retry_max_backoff_secs),
            },
        )
    }

    /// Run until `shutdown` flips to true or its sender goes away.
    /// Returns the number of executions.
    pub async fn run(&self, job: &RefreshDataJob, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut executions = 0;
        let mut attempt = 0;

        while !*shutdown.borrow_and_update() {
            let outcome = job.execute().await;
            executions += 1;

            let delay = match outcome {
                JobOutcome::Retry => {
                    let delay = self.backoff.delay(attempt);
                    attempt = attempt.saturating_add(1);
                    delay
                }
                JobOutcome::Success | JobOutcome::Failure => {
                    attempt = 0;
                    self.interval
                }
            };

            let next_run = chrono::Duration::from_std(delay)
                .ok()
                .and_then(|d| chrono::Local::now().checked_add_signed(d));
            match next_run {
                Some(at) => tracing::info!(
                    "{} finished with {}, next run at {}",
                    WORK_NAME,
                    outcome,
                    at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => tracing::info!("{} finished with {}", WORK_NAME, outcome),
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("{} stopped after {} runs", WORK_NAME, executions);
        executions
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::db::VideoStore;
    use crate::error::FetchError;
    use crate::sync::tests::{network_video, ScriptedSource};

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = BackoffPolicy {
            initial: Duration::from_secs(30),
            max: Duration::from_secs(100),
        };

        assert_eq!(policy.delay(0), Duration::from_secs(30));
        assert_eq!(policy.delay(1), Duration::from_secs(60));
        assert_eq!(policy.delay(2), Duration::from_secs(100));
        assert_eq!(policy.delay(64), Duration::from_secs(100));
    }

    #[test]
    fn picks_up_config_values() {
        let config = Config {
            refresh_interval_minutes: 15,
            retry_initial_backoff_secs: 10,
            retry_max_backoff_secs: 600,
            ..Config::default()
        };
        let scheduler = PeriodicScheduler::from_config(&config);

        assert_eq!(scheduler.interval, Duration::from_secs(900));
        assert_eq!(scheduler.backoff.initial, Duration::from_secs(10));
        assert_eq!(scheduler.backoff.max, Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_refresh_succeeds() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let mut changes = store.subscribe();
        let job = RefreshDataJob::new(
            store.clone(),
            ScriptedSource::new(vec![
                Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)),
                Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
                Ok(vec![network_video("a", "A")]),
            ]),
        );
        let scheduler = PeriodicScheduler::new(Duration::from_secs(86_400), BackoffPolicy::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { scheduler.run(&job, shutdown_rx).await });

        changes.changed().await.unwrap();
        shutdown_tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap(), 3);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stops_immediately_when_already_shut_down() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let job = RefreshDataJob::new(store, ScriptedSource::new(Vec::new()));
        let scheduler = PeriodicScheduler::new(Duration::from_secs(60), BackoffPolicy::default());
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);

        assert_eq!(scheduler.run(&job, shutdown_rx).await, 0);
    }
}
