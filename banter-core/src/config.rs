use crate::error::ConfigError;
use crate::types::SortMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Static run policy. Loaded once at startup and treated as immutable for
/// the duration of a run; every component receives it by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Target subreddits, without the "r/" prefix. Order is significant:
    /// the run controller visits them in this order, exactly once per run.
    pub subreddits: Vec<String>,
    /// Built-in comment pool, used when no override file is present.
    pub comment_templates: Vec<String>,
    pub selection: SelectionConfig,
    pub behavior: BehaviorConfig,
    pub rate_limits: RateLimitConfig,
    pub limits: CapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub sort_by: SortMode,
    /// Time window for the "top" sort: hour, day, week, month, year, all.
    pub time_filter: String,
    /// Minimum score for a post to be considered.
    pub min_score: i32,
    /// Maximum age of posts to comment on, in hours.
    pub max_age_hours: u64,
    /// Skip posts that already have more comments than this.
    pub max_comments: u32,
    /// Skip pinned/stickied posts.
    pub skip_stickied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub avoid_own_posts: bool,
    pub avoid_already_commented: bool,
    /// Comments shorter than this are never selected.
    pub min_comment_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum delay between comments, in seconds.
    pub min_delay_secs: u64,
    /// Maximum delay between comments, in seconds.
    pub max_delay_secs: u64,
    /// Fixed delay when switching to a new subreddit, in seconds.
    pub subreddit_switch_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapConfig {
    /// Hard cap on comments posted in one run.
    pub max_total_comments: u32,
    /// Per-subreddit cap. This is the single authoritative value; there is
    /// no environment override.
    pub max_comments_per_subreddit: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            subreddits: [
                "AskReddit",
                "funny",
                "pics",
                "videos",
                "todayilearned",
                "worldnews",
                "science",
                "technology",
                "gaming",
                "movies",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            comment_templates: [
                "Great post! Thanks for sharing.",
                "This is really interesting!",
                "I completely agree with this.",
                "Thanks for the insight!",
                "This made my day better.",
                "Awesome content!",
                "I learned something new today.",
                "This is exactly what I needed to see.",
                "Brilliant perspective!",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            selection: SelectionConfig::default(),
            behavior: BehaviorConfig::default(),
            rate_limits: RateLimitConfig::default(),
            limits: CapConfig::default(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            sort_by: SortMode::Hot,
            time_filter: "day".to_string(),
            min_score: 10,
            max_age_hours: 24,
            max_comments: 500,
            skip_stickied: true,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            avoid_own_posts: true,
            avoid_already_commented: true,
            min_comment_length: 10,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 30,
            max_delay_secs: 120,
            subreddit_switch_delay_secs: 60,
        }
    }
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            max_total_comments: 50,
            max_comments_per_subreddit: 5,
        }
    }
}

impl RateLimitConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs(self.min_delay_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }

    pub fn switch_delay(&self) -> Duration {
        Duration::from_secs(self.subreddit_switch_delay_secs)
    }
}

impl BotConfig {
    /// Load configuration from a TOML file, falling back to the built-in
    /// defaults when the default path does not exist. An explicitly
    /// requested path that is missing is an error.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("No config file at {}, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ValidationFailed {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        info!(
            "Loaded config from {}: {} subreddits, {} comment templates",
            path.display(),
            config.subreddits.len(),
            config.comment_templates.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddits.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "subreddit list is empty".to_string(),
            });
        }
        if self.comment_templates.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "comment template pool is empty".to_string(),
            });
        }
        if self.rate_limits.min_delay_secs > self.rate_limits.max_delay_secs {
            return Err(ConfigError::InvalidValue {
                field: "rate_limits.min_delay_secs".to_string(),
                value: format!(
                    "{} (greater than max_delay_secs {})",
                    self.rate_limits.min_delay_secs, self.rate_limits.max_delay_secs
                ),
            });
        }
        if self.limits.max_total_comments == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_total_comments".to_string(),
                value: "0".to_string(),
            });
        }
        if self.limits.max_comments_per_subreddit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_comments_per_subreddit".to_string(),
                value: "0".to_string(),
            });
        }
        match self.selection.time_filter.as_str() {
            "hour" | "day" | "week" | "month" | "year" | "all" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "selection.time_filter".to_string(),
                    value: other.to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subreddits.len(), 10);
        assert_eq!(config.selection.min_score, 10);
        assert_eq!(config.rate_limits.min_delay_secs, 30);
        assert_eq!(config.limits.max_comments_per_subreddit, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let raw = r#"
            subreddits = ["rust"]

            [rate_limits]
            min_delay_secs = 1
            max_delay_secs = 2
        "#;
        let config: BotConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.subreddits, vec!["rust".to_string()]);
        assert_eq!(config.rate_limits.min_delay_secs, 1);
        assert_eq!(config.rate_limits.subreddit_switch_delay_secs, 60);
        assert_eq!(config.selection.max_age_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_delay_bounds_rejected() {
        let mut config = BotConfig::default();
        config.rate_limits.min_delay_secs = 120;
        config.rate_limits.max_delay_secs = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_subreddits_rejected() {
        let mut config = BotConfig::default();
        config.subreddits.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_unknown_time_filter_rejected() {
        let mut config = BotConfig::default();
        config.selection.time_filter = "fortnight".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = BotConfig::load(Path::new("/nonexistent/banter.toml"), true);
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_missing_default_path_falls_back() {
        let config = BotConfig::load(Path::new("/nonexistent/banter.toml"), false).unwrap();
        assert_eq!(config.subreddits.len(), 10);
    }
}
