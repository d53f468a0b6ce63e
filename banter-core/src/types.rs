use serde::{Deserialize, Serialize};

/// One post eligible for commenting, as mapped from the platform listing.
///
/// `id` is the platform-unique identifier and serves as the dedup key.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    pub id: String,
    pub author: String,
    pub title: String,
    pub created_utc: i64,
    pub score: i32,
    pub num_comments: u32,
    pub stickied: bool,
    pub subreddit: String,
}

impl CandidateItem {
    /// Reddit "fullname" for a link, as expected by the comment endpoint.
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

/// Listing sort order for candidate fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Hot,
    New,
    Rising,
    Top,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::Rising => "rising",
            SortMode::Top => "top",
        }
    }
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::Hot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullname() {
        let item = CandidateItem {
            id: "abc123".to_string(),
            author: "someone".to_string(),
            title: "A post".to_string(),
            created_utc: 1_700_000_000,
            score: 42,
            num_comments: 5,
            stickied: false,
            subreddit: "rust".to_string(),
        };
        assert_eq!(item.fullname(), "t3_abc123");
    }

    #[test]
    fn test_sort_mode_serde() {
        let mode: SortMode = serde_json::from_str("\"rising\"").unwrap();
        assert_eq!(mode, SortMode::Rising);
        assert_eq!(SortMode::Top.as_str(), "top");
        assert_eq!(SortMode::default(), SortMode::Hot);
    }
}
