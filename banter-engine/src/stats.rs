use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::info;

/// Run counters. Created at process start, mutated throughout, reported at
/// the end; never persisted.
#[derive(Debug)]
pub struct RunStats {
    pub comments_posted: u32,
    pub posts_skipped: u32,
    pub errors: u32,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            comments_posted: 0,
            posts_skipped: 0,
            errors: 0,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    pub fn runtime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at_utc
    }

    pub fn report(&self, subreddits_processed: usize) {
        info!("Final statistics:");
        info!("  Comments posted: {}", self.comments_posted);
        info!("  Posts skipped: {}", self.posts_skipped);
        info!("  Errors: {}", self.errors);
        info!("  Runtime: {:?}", self.runtime());
        info!("  Subreddits processed: {}", subreddits_processed);
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = RunStats::new();
        assert_eq!(stats.comments_posted, 0);
        assert_eq!(stats.posts_skipped, 0);
        assert_eq!(stats.errors, 0);
        assert!(stats.started_at() <= Utc::now());
    }

    #[test]
    fn test_runtime_advances() {
        let stats = RunStats::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(stats.runtime() >= Duration::from_millis(5));
    }
}
