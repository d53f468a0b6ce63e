use banter_core::BotConfig;
use banter_engine::BotRunner;
use reddit_client::RedditApiClient;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Interactive control loop. A thin caller over the same run controller the
/// unattended mode uses; invalid input re-prompts and changes no state.
pub async fn run(
    runner: &mut BotRunner,
    config: &BotConfig,
    client: Arc<RedditApiClient>,
) -> anyhow::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin());

    loop {
        println!();
        println!("{}", "=".repeat(50));
        println!("Banter - Interactive Mode");
        println!("{}", "=".repeat(50));
        println!("1. Run bot with default settings");
        println!("2. Run bot with custom comment limit");
        println!("3. Test connection");
        println!("4. View current stats");
        println!("5. Preview next comment");
        println!("6. Exit");

        let Some(choice) = prompt(&mut input, "\nEnter your choice (1-6): ").await? else {
            break;
        };

        match choice.as_str() {
            "1" => runner.run(None).await,
            "2" => {
                let Some(raw) = prompt(&mut input, "Enter maximum comments to post: ").await?
                else {
                    break;
                };
                match raw.parse::<u32>() {
                    Ok(limit) => runner.run(Some(limit)).await,
                    Err(_) => println!("Invalid number entered."),
                }
            }
            "3" => match client.get_user_info().await {
                Ok(user) => {
                    println!("Connected as: u/{}", user.name);
                    println!("Karma: {}", user.total_karma());
                }
                Err(e) => println!("Connection failed: {e}"),
            },
            "4" => {
                let stats = &runner.stats;
                println!("Comments posted: {}", stats.comments_posted);
                println!("Posts skipped: {}", stats.posts_skipped);
                println!("Errors: {}", stats.errors);
                println!("Runtime: {:?}", stats.runtime());
                println!("Subreddits configured: {}", config.subreddits.len());
                println!("Posts on record: {}", runner.dedup().len());
            }
            "5" => println!("Next comment would be: '{}'", runner.preview_comment()),
            "6" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Print a prompt and read one trimmed line. None on EOF.
async fn prompt(input: &mut BufReader<Stdin>, text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
