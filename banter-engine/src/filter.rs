use crate::dedup::DedupStore;
use banter_core::{BotConfig, CandidateItem};
use tracing::trace;

/// Pure eligibility predicate over one candidate item.
///
/// Every check is evaluated against the same config snapshot and `now_utc`
/// (seconds since epoch, captured once per batch so a slow batch does not
/// shift the age boundary mid-iteration). An item passes only if all
/// enabled checks pass.
///
/// Boundary semantics: a score exactly at `min_score` passes, an age exactly
/// at `max_age_hours` passes, a comment count exactly at `max_comments`
/// passes.
pub fn is_suitable(
    item: &CandidateItem,
    seen: &DedupStore,
    own_identity: Option<&str>,
    config: &BotConfig,
    now_utc: i64,
) -> bool {
    if config.behavior.avoid_own_posts {
        if let Some(own) = own_identity {
            if item.author == own {
                trace!("Skipping {}: own post", item.id);
                return false;
            }
        }
    }

    if config.behavior.avoid_already_commented && seen.contains(&item.id) {
        trace!("Skipping {}: already commented", item.id);
        return false;
    }

    let max_age_secs = config.selection.max_age_hours as i64 * 3600;
    // A creation timestamp in the future yields a negative age, which never
    // exceeds the bound.
    let age_secs = now_utc - item.created_utc;
    if age_secs > max_age_secs {
        trace!("Skipping {}: too old ({} seconds)", item.id, age_secs);
        return false;
    }

    if item.score < config.selection.min_score {
        trace!("Skipping {}: score {} below minimum", item.id, item.score);
        return false;
    }

    if item.num_comments > config.selection.max_comments {
        trace!(
            "Skipping {}: {} comments over maximum",
            item.id,
            item.num_comments
        );
        return false;
    }

    if config.selection.skip_stickied && item.stickied {
        trace!("Skipping {}: stickied", item.id);
        return false;
    }

    true
}
