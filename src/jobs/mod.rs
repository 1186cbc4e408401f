pub mod scheduler;
pub mod sift_feed;

pub use scheduler::{start_scheduler, FeedScheduler};
pub use sift_feed::{run_all, run_feed, FeedRunSummary, RunAllSummary};
