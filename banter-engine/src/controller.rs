use crate::dedup::DedupStore;
use crate::executor::{ActionExecutor, ActionOutcome};
use crate::filter::is_suitable;
use crate::pacing::{Pacer, WaitOutcome};
use crate::selector::CommentSelector;
use crate::shutdown::ShutdownSignal;
use crate::stats::RunStats;
use banter_core::{BotConfig, Platform};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How many candidates to request per subreddit poll.
const FETCH_LIMIT: u32 = 25;

/// Top-level state machine for one or more runs.
///
/// Iterates the configured subreddits in order, exactly once per run, and
/// sequences filter, selector, executor, pacer, and dedup store on a single
/// task: Idle -> PerSubreddit -> PerItem -> {Waiting, SwitchingSubreddit}
/// -> Done. All per-item and per-subreddit errors stay inside the loop;
/// only the caller's startup authentication can abort a run before Done.
pub struct BotRunner {
    config: Arc<BotConfig>,
    platform: Arc<dyn Platform>,
    dedup: DedupStore,
    selector: CommentSelector,
    pacer: Pacer,
    executor: ActionExecutor,
    shutdown: ShutdownSignal,
    pub stats: RunStats,
}

impl BotRunner {
    pub fn new(
        config: Arc<BotConfig>,
        platform: Arc<dyn Platform>,
        dedup: DedupStore,
        selector: CommentSelector,
        dry_run: bool,
        shutdown: ShutdownSignal,
    ) -> Self {
        let pacer = Pacer::new(config.rate_limits.clone());
        Self {
            config,
            platform,
            dedup,
            selector,
            pacer,
            executor: ActionExecutor::new(dry_run),
            shutdown,
            stats: RunStats::new(),
        }
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    /// Next comment the selector would produce, for interactive preview.
    pub fn preview_comment(&self) -> String {
        self.selector.select()
    }

    /// Execute one full run. `max_comments` overrides the configured global
    /// cap for this run when given; the per-subreddit cap always comes from
    /// configuration.
    pub async fn run(&mut self, max_comments: Option<u32>) {
        info!("Starting bot run...");
        if self.executor.is_dry_run() {
            info!("Running in DRY RUN mode - no comments will be posted");
        }

        let total_cap = max_comments.unwrap_or(self.config.limits.max_total_comments);
        let per_sub_cap = self.config.limits.max_comments_per_subreddit;

        // Identity is only needed for the own-post check; losing it degrades
        // that one check instead of failing the run.
        let identity = if self.config.behavior.avoid_own_posts {
            match self.platform.identity().await {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!("Could not determine own identity: {}", e);
                    self.stats.errors += 1;
                    None
                }
            }
        } else {
            None
        };

        let mut total = 0u32;
        let subreddits = self.config.subreddits.clone();

        'subreddits: for (index, subreddit) in subreddits.iter().enumerate() {
            if self.shutdown.is_triggered() {
                info!("Shutdown requested, stopping run");
                break;
            }
            if total >= total_cap {
                info!("Reached maximum comment limit ({})", total_cap);
                break;
            }

            info!("Processing r/{}...", subreddit);
            let batch = match self
                .platform
                .candidates(subreddit, &self.config.selection, FETCH_LIMIT)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    error!("Error getting posts from r/{}: {}", subreddit, e);
                    self.stats.errors += 1;
                    continue;
                }
            };

            let now_utc = Utc::now().timestamp();
            let eligible: Vec<_> = batch
                .into_iter()
                .filter(|item| {
                    is_suitable(item, &self.dedup, identity.as_deref(), &self.config, now_utc)
                })
                .collect();

            if eligible.is_empty() {
                warn!("No suitable posts found in r/{}", subreddit);
                self.stats.posts_skipped += 1;
                continue;
            }

            let mut sub_comments = 0u32;
            for item in eligible.iter().take(per_sub_cap as usize) {
                if total >= total_cap {
                    break;
                }
                if self.shutdown.is_triggered() {
                    break 'subreddits;
                }

                let text = self.selector.select();
                let outcome = self
                    .executor
                    .perform(self.platform.as_ref(), item, &text)
                    .await;
                match outcome {
                    ActionOutcome::Posted | ActionOutcome::DryRun => {
                        if outcome == ActionOutcome::Posted {
                            self.dedup.record(item.id.clone());
                        }
                        self.stats.comments_posted += 1;
                        total += 1;
                        sub_comments += 1;

                        if total < total_cap {
                            let delay = self.pacer.inter_action_delay();
                            if self.pacer.wait(delay, &self.shutdown).await
                                == WaitOutcome::Interrupted
                            {
                                break 'subreddits;
                            }
                        }
                    }
                    ActionOutcome::Failed(_) => {
                        self.stats.errors += 1;
                        self.stats.posts_skipped += 1;
                    }
                }
            }

            info!("Posted {} comments in r/{}", sub_comments, subreddit);

            if index + 1 < subreddits.len() && total < total_cap {
                if self.pacer.wait(self.pacer.switch_delay(), &self.shutdown).await
                    == WaitOutcome::Interrupted
                {
                    break;
                }
            }
        }

        self.finish(subreddits.len());
    }

    /// The Done state: flush the dedup store and report. Runs on every exit
    /// path, including shutdown, so nothing acted on is ever lost.
    fn finish(&mut self, subreddits_processed: usize) {
        if self.executor.is_dry_run() {
            info!("[DRY RUN] Skipping dedup persistence");
        } else if let Err(e) = self.dedup.persist() {
            // Not fatal: the run still reports and exits cleanly.
            error!("Error saving commented posts: {}", e);
        }
        self.stats.report(subreddits_processed);
    }
}
