use banter_core::{CandidateItem, Platform};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Comment posted against the live API.
    Posted,
    /// Dry-run rehearsal: no network effect, reported as success.
    DryRun,
    Failed(ActionErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionErrorKind {
    /// The account is not allowed to act; waiting will not help.
    Authorization,
    /// Anything else. Not retried within the run: an immediate retry would
    /// defeat the throttle, so the item is simply skipped until a later run.
    Transient,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Posted | ActionOutcome::DryRun)
    }
}

/// Performs (or simulates) the comment action on one item.
#[derive(Debug, Clone, Copy)]
pub struct ActionExecutor {
    dry_run: bool,
}

impl ActionExecutor {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn perform(
        &self,
        platform: &dyn Platform,
        item: &CandidateItem,
        text: &str,
    ) -> ActionOutcome {
        let title: String = item.title.chars().take(50).collect();

        if self.dry_run {
            info!(
                "[DRY RUN] Would comment on '{}...' in r/{}",
                title, item.subreddit
            );
            info!("[DRY RUN] Comment: {}", text);
            return ActionOutcome::DryRun;
        }

        match platform.post_reply(item, text).await {
            Ok(()) => {
                info!("Posted comment on '{}...' in r/{}", title, item.subreddit);
                ActionOutcome::Posted
            }
            Err(e) => {
                error!(
                    "Failed to comment on {} in r/{}: {}",
                    item.id, item.subreddit, e
                );
                if e.is_authorization() {
                    ActionOutcome::Failed(ActionErrorKind::Authorization)
                } else {
                    ActionOutcome::Failed(ActionErrorKind::Transient)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use banter_core::{CoreError, RedditApiError, SelectionConfig};
    use std::sync::Mutex;

    struct FakePlatform {
        replies: Mutex<Vec<(String, String)>>,
        fail_with: Option<RedditApiError>,
    }

    impl FakePlatform {
        fn new() -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(error: RedditApiError) -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                fail_with: Some(error),
            }
        }
    }

    #[async_trait]
    impl Platform for FakePlatform {
        async fn identity(&self) -> Result<String, CoreError> {
            Ok("test_user".to_string())
        }

        async fn candidates(
            &self,
            _subreddit: &str,
            _selection: &SelectionConfig,
            _limit: u32,
        ) -> Result<Vec<CandidateItem>, CoreError> {
            Ok(Vec::new())
        }

        async fn post_reply(&self, item: &CandidateItem, text: &str) -> Result<(), CoreError> {
            if let Some(error) = &self.fail_with {
                return Err(CoreError::RedditApi(error.clone()));
            }
            self.replies
                .lock()
                .unwrap()
                .push((item.id.clone(), text.to_string()));
            Ok(())
        }
    }

    fn item() -> CandidateItem {
        CandidateItem {
            id: "abc123".to_string(),
            author: "someone".to_string(),
            title: "A post".to_string(),
            created_utc: 1_700_000_000,
            score: 42,
            num_comments: 5,
            stickied: false,
            subreddit: "rust".to_string(),
        }
    }

    #[tokio::test]
    async fn test_live_success() {
        let platform = FakePlatform::new();
        let executor = ActionExecutor::new(false);

        let outcome = executor.perform(&platform, &item(), "Nice one!").await;
        assert_eq!(outcome, ActionOutcome::Posted);
        assert!(outcome.is_success());

        let replies = platform.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0], ("abc123".to_string(), "Nice one!".to_string()));
    }

    #[tokio::test]
    async fn test_dry_run_has_no_network_effect() {
        let platform = FakePlatform::new();
        let executor = ActionExecutor::new(true);

        let outcome = executor.perform(&platform, &item(), "Nice one!").await;
        assert_eq!(outcome, ActionOutcome::DryRun);
        assert!(outcome.is_success());
        assert!(platform.replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_classified() {
        let platform = FakePlatform::failing(RedditApiError::ServerError { status_code: 503 });
        let executor = ActionExecutor::new(false);

        let outcome = executor.perform(&platform, &item(), "Nice one!").await;
        assert_eq!(outcome, ActionOutcome::Failed(ActionErrorKind::Transient));
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_authorization_failure_classified() {
        let platform = FakePlatform::failing(RedditApiError::Forbidden {
            resource: "/api/comment".to_string(),
        });
        let executor = ActionExecutor::new(false);

        let outcome = executor.perform(&platform, &item(), "Nice one!").await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed(ActionErrorKind::Authorization)
        );
    }
}
