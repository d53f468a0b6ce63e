use banter_core::BotConfig;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Chooses the comment text for one action.
///
/// When an override file exists and has usable lines, choices come from it;
/// otherwise from the configured template pool. Lines shorter than the
/// configured minimum length are never selected. Any trouble reading the
/// file falls back to the built-in pool rather than failing the run.
#[derive(Debug, Clone)]
pub struct CommentSelector {
    templates: Vec<String>,
    min_length: usize,
    override_path: PathBuf,
}

impl CommentSelector {
    pub fn new(config: &BotConfig, override_path: impl Into<PathBuf>) -> Self {
        Self {
            templates: config.comment_templates.clone(),
            min_length: config.behavior.min_comment_length,
            override_path: override_path.into(),
        }
    }

    pub fn select(&self) -> String {
        if let Some(comments) = self.override_comments() {
            let choice = &comments[fastrand::usize(..comments.len())];
            debug!("Selected comment from {}", self.override_path.display());
            return choice.clone();
        }

        let usable: Vec<&String> = self
            .templates
            .iter()
            .filter(|t| t.len() >= self.min_length)
            .collect();
        if !usable.is_empty() {
            return usable[fastrand::usize(..usable.len())].clone();
        }

        // Last resort: the raw pool. Config validation guarantees it is
        // non-empty.
        warn!(
            "No comment meets the minimum length of {}, using raw template pool",
            self.min_length
        );
        self.templates[fastrand::usize(..self.templates.len())].clone()
    }

    /// Usable lines from the override file: trimmed, non-blank, and long
    /// enough. None when the file is absent, unreadable, or yields nothing.
    fn override_comments(&self) -> Option<Vec<String>> {
        if !self.override_path.exists() {
            return None;
        }
        let raw = match std::fs::read_to_string(&self.override_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Error reading {}: {}, falling back to templates",
                    self.override_path.display(),
                    e
                );
                return None;
            }
        };
        let comments: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.len() >= self.min_length)
            .map(str::to_string)
            .collect();
        if comments.is_empty() {
            None
        } else {
            Some(comments)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_with_templates(templates: &[&str], min_length: usize) -> BotConfig {
        let mut config = BotConfig::default();
        config.comment_templates = templates.iter().map(|s| s.to_string()).collect();
        config.behavior.min_comment_length = min_length;
        config
    }

    #[test]
    fn test_selects_from_templates_when_no_file() {
        let dir = tempdir().unwrap();
        let config = config_with_templates(&["Great post! Thanks for sharing."], 10);
        let selector = CommentSelector::new(&config, dir.path().join("comments.txt"));
        assert_eq!(selector.select(), "Great post! Thanks for sharing.");
    }

    #[test]
    fn test_selects_from_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comments.txt");
        std::fs::write(&path, "From the override file\n\n   \nAnother override line\n").unwrap();

        let config = config_with_templates(&["Template fallback text"], 10);
        let selector = CommentSelector::new(&config, &path);

        for _ in 0..50 {
            let comment = selector.select();
            assert!(
                comment == "From the override file" || comment == "Another override line",
                "unexpected comment: {comment}"
            );
        }
    }

    #[test]
    fn test_blank_only_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comments.txt");
        std::fs::write(&path, "\n   \n\n").unwrap();

        let config = config_with_templates(&["Template fallback text"], 10);
        let selector = CommentSelector::new(&config, &path);
        assert_eq!(selector.select(), "Template fallback text");
    }

    #[test]
    fn test_short_lines_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comments.txt");
        std::fs::write(&path, "nice\nThis one is long enough\n").unwrap();

        let config = config_with_templates(&["Template fallback text"], 10);
        let selector = CommentSelector::new(&config, &path);
        for _ in 0..20 {
            assert_eq!(selector.select(), "This one is long enough");
        }
    }

    #[test]
    fn test_all_templates_too_short_still_selects() {
        let dir = tempdir().unwrap();
        let config = config_with_templates(&["short"], 100);
        let selector = CommentSelector::new(&config, dir.path().join("comments.txt"));
        assert_eq!(selector.select(), "short");
    }
}
