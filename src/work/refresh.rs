use std::fmt;
use std::sync::Arc;

use crate::db::VideoStore;
use crate::network::PlaylistSource;
use crate::sync::VideoSyncService;

pub const WORK_NAME: &str = "RefreshDataWorker";

/// What the scheduler should do after one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Try again later; the scheduler owns the backoff.
    Retry,
    Failure,
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobOutcome::Success => "success",
            JobOutcome::Retry => "retry",
            JobOutcome::Failure => "failure",
        };
        f.write_str(s)
    }
}

/// Background refresh of the cached playlist.
pub struct RefreshDataJob {
    store: VideoStore,
    source: Arc<dyn PlaylistSource>,
}

impl RefreshDataJob {
    pub fn new(store: VideoStore, source: Arc<dyn PlaylistSource>) -> Self {
        Self { store, source }
    }

    pub async fn execute(&self) -> JobOutcome {
        let service = VideoSyncService::new(self.store.clone(), Arc::clone(&self.source));

        match service.refresh().await {
            Ok(()) => JobOutcome::Success,
            Err(e) if e.is_remote_fetch() => {
                tracing::warn!("{} will retry: {}", WORK_NAME, e);
                JobOutcome::Retry
            }
            Err(e) => {
                tracing::error!("{} failed: {}", WORK_NAME, e);
                JobOutcome::Failure
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::error::FetchError;
    use crate::models::VideoRecord;
    use crate::sync::tests::{network_video, ScriptedSource};

    #[tokio::test]
    async fn successful_refresh_is_success() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let job = RefreshDataJob::new(
            store.clone(),
            ScriptedSource::new(vec![Ok(vec![network_video("a", "A")])]),
        );

        assert_eq!(job.execute().await, JobOutcome::Success);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn server_error_is_retried() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let job = RefreshDataJob::new(
            store,
            ScriptedSource::new(vec![Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR))]),
        );

        assert_eq!(job.execute().await, JobOutcome::Retry);
    }

    #[tokio::test]
    async fn unavailable_leaves_store_unchanged() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let existing = VideoRecord::from(network_video("a", "cached"));
        store.upsert_all(vec![existing.clone()]).await.unwrap();
        let job = RefreshDataJob::new(
            store.clone(),
            ScriptedSource::new(vec![Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE))]),
        );

        assert_eq!(job.execute().await, JobOutcome::Retry);
        assert_eq!(store.read_all().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn write_failure_is_terminal() {
        let store = VideoStore::open_in_memory().await.unwrap();
        store.drop_table_for_tests().await;
        let job = RefreshDataJob::new(
            store,
            ScriptedSource::new(vec![Ok(vec![network_video("a", "A")])]),
        );

        assert_eq!(job.execute().await, JobOutcome::Failure);
    }

    #[tokio::test]
    async fn each_execution_fetches_again() {
        let store = VideoStore::open_in_memory().await.unwrap();
        let job = RefreshDataJob::new(
            store.clone(),
            ScriptedSource::new(vec![
                Err(FetchError::Status(StatusCode::BAD_GATEWAY)),
                Ok(vec![network_video("a", "A"), network_video("b", "B")]),
            ]),
        );

        assert_eq!(job.execute().await, JobOutcome::Retry);
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(job.execute().await, JobOutcome::Success);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
