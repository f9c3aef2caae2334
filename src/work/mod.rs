mod refresh;
mod scheduler;

pub use refresh::{JobOutcome, RefreshDataJob, WORK_NAME};
pub use scheduler::{BackoffPolicy, PeriodicScheduler};
