use anyhow::Context;
use banter_core::{BotConfig, Platform, RedditCredentials};
use banter_engine::{shutdown, BotRunner, CommentSelector, DedupStore};
use clap::Parser;
use reddit_client::RedditApiClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod menu;

const DEDUP_FILE: &str = "commented_posts.json";
const COMMENTS_FILE: &str = "comments.txt";
const DEFAULT_CONFIG_FILE: &str = "banter.toml";

/// Rate-limited Reddit comment bot.
#[derive(Parser, Debug)]
#[command(name = "banter", version, about)]
struct Cli {
    /// Simulate the run without posting any comments
    #[arg(long)]
    dry_run: bool,

    /// Run in interactive mode for manual control
    #[arg(long)]
    interactive: bool,

    /// Maximum number of comments to post this run
    #[arg(long)]
    max_comments: Option<u32>,

    /// Path to the TOML config file (defaults to banter.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clear the stored comment history and exit
    #[arg(long)]
    reset_history: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("banter=info,banter_engine=info,reddit_client=info")
        }))
        .init();

    let cli = Cli::parse();

    if cli.reset_history {
        let mut dedup = DedupStore::load(DEDUP_FILE);
        dedup.clear().context("failed to clear comment history")?;
        println!("Comment history cleared.");
        return Ok(());
    }

    let explicit = cli.config.is_some();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = BotConfig::load(&config_path, explicit).context("invalid configuration")?;
    let config = Arc::new(config);

    // Credentials and authentication are the only fatal paths: nothing has
    // been acted on yet, and a run without a working account is pointless.
    let credentials =
        RedditCredentials::from_env().context("Reddit credentials are not configured")?;
    let client = Arc::new(RedditApiClient::new(credentials)?);
    client
        .authenticate()
        .await
        .context("failed to connect to Reddit")?;

    let dedup = DedupStore::load(DEDUP_FILE);
    let selector = CommentSelector::new(&config, COMMENTS_FILE);
    let (shutdown_handle, shutdown_signal) = shutdown::channel();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing up...");
            shutdown_handle.trigger();
        }
    });

    let platform: Arc<dyn Platform> = client.clone();
    let mut runner = BotRunner::new(
        config.clone(),
        platform,
        dedup,
        selector,
        cli.dry_run,
        shutdown_signal,
    );

    if cli.interactive {
        menu::run(&mut runner, &config, client).await?;
    } else {
        runner.run(cli.max_comments).await;
    }

    Ok(())
}
