use crate::config::SelectionConfig;
use crate::error::CoreError;
use crate::types::CandidateItem;
use async_trait::async_trait;

/// Seam between the engine and the platform client.
///
/// The engine only ever talks to Reddit through this trait, which keeps the
/// run controller testable against an in-memory fake. Errors returned here
/// are treated as recoverable per-item/per-subreddit failures by the caller,
/// except for `identity` at startup.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Username of the acting account.
    async fn identity(&self) -> Result<String, CoreError>;

    /// Fetch up to `limit` candidate posts from one subreddit, in listing
    /// order for the configured sort.
    async fn candidates(
        &self,
        subreddit: &str,
        selection: &SelectionConfig,
        limit: u32,
    ) -> Result<Vec<CandidateItem>, CoreError>;

    /// Post a comment on one item. Must fail with a distinguishable
    /// authorization error (`CoreError::is_authorization`) when the account
    /// is not allowed to comment.
    async fn post_reply(&self, item: &CandidateItem, text: &str) -> Result<(), CoreError>;
}
