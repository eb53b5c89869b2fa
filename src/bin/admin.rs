//! CLI administration tool for the view counter store.
//!
//! The HTTP service only ever reads and increments counts. Setting, resetting
//! and listing them is done here, directly against Redis.
//!
//! # Usage
//!
//! ```bash
//! # Show the count for one article
//! cargo run --bin admin -- get my-first-post
//!
//! # Overwrite a count
//! cargo run --bin admin -- set my-first-post 120
//!
//! # Remove a count (asks for confirmation)
//! cargo run --bin admin -- reset my-first-post
//!
//! # List every stored count
//! cargo run --bin admin -- list
//!
//! # Check the connection
//! cargo run --bin admin -- ping
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST` & co. (required), see [`view_counter::config`]
//! - `VIEWS_KEY_PREFIX` (optional, default `views:`)

use view_counter::config::{Config, mask_connection_string};
use view_counter::domain::entities::{Slug, ViewCount};
use view_counter::domain::repositories::ViewRepository;
use view_counter::infrastructure::store::RedisViewRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing stored view counts.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the count for a slug
    Get {
        /// Article slug (e.g., "my-first-post")
        slug: String,
    },

    /// Overwrite the count for a slug
    Set {
        slug: String,
        count: u64,
    },

    /// Delete the stored count for a slug
    Reset {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all stored counts
    List,

    /// Check the store connection
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let redis_url = config
        .redis_url
        .clone()
        .context("REDIS_URL or REDIS_HOST must be set")?;

    let repo = RedisViewRepository::connect(&redis_url, config.key_prefix.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", mask_connection_string(&redis_url), e))?;

    match cli.command {
        Commands::Get { slug } => show_count(&repo, &parse_slug(&slug)?).await?,
        Commands::Set { slug, count } => set_count(&repo, &parse_slug(&slug)?, count).await?,
        Commands::Reset { slug, yes } => reset_count(&repo, &parse_slug(&slug)?, yes).await?,
        Commands::List => list_counts(&repo).await?,
        Commands::Ping => ping(&repo, &redis_url).await?,
    }

    Ok(())
}

fn parse_slug(raw: &str) -> Result<Slug> {
    Slug::parse(raw).context("Slug must not be empty")
}

async fn show_count(repo: &RedisViewRepository, slug: &Slug) -> Result<()> {
    let count = repo
        .get_count(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read count: {}", e))?;

    println!("  {} {}", slug.as_str().cyan(), count.to_string().bright_white().bold());
    Ok(())
}

async fn set_count(repo: &RedisViewRepository, slug: &Slug, count: u64) -> Result<()> {
    repo.set_count(slug, ViewCount::new(count))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to set count: {}", e))?;

    println!(
        "{} {} = {}",
        "Updated".green().bold(),
        slug.as_str().cyan(),
        count
    );
    Ok(())
}

/// Deletes a count after showing its current value.
///
/// The next view of the article starts again from 1.
async fn reset_count(repo: &RedisViewRepository, slug: &Slug, skip_confirm: bool) -> Result<()> {
    let current = repo
        .get_count(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read count: {}", e))?;

    println!(
        "  {} currently has {} views",
        slug.as_str().cyan(),
        current.to_string().bright_white().bold()
    );

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Reset this count?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let existed = repo
        .delete(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reset count: {}", e))?;

    if existed {
        println!("{}", "Count reset".green().bold());
    } else {
        println!("{}", "Nothing stored for this slug".yellow());
    }
    Ok(())
}

/// Lists all counts, highest first.
///
/// # Output Format
///
/// ```text
/// Views    Slug
/// ────────────────────────────────────────
/// 120      my-first-post
/// 7        hello-world
///
/// 2 articles, 127 views
/// ```
async fn list_counts(repo: &RedisViewRepository) -> Result<()> {
    let mut counts = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list counts: {}", e))?;

    if counts.is_empty() {
        println!("{}", "  No counts stored".yellow());
        return Ok(());
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!(
        "  {:<8} {}",
        "Views".bright_white().bold(),
        "Slug".bright_white().bold()
    );
    println!("  {}", "─".repeat(40).bright_black());

    for (slug, count) in &counts {
        println!("  {:<8} {}", count.value(), slug.cyan());
    }

    let total = total_views(&counts);
    println!();
    println!("  {} articles, {} views", counts.len(), total);
    Ok(())
}

fn total_views(counts: &[(String, ViewCount)]) -> u64 {
    counts
        .iter()
        .map(|(_, c)| c.value())
        .fold(0u64, u64::saturating_add)
}

async fn ping(repo: &RedisViewRepository, redis_url: &str) -> Result<()> {
    if repo.health_check().await {
        println!(
            "{} {}",
            "Connected to".green().bold(),
            mask_connection_string(redis_url)
        );
        Ok(())
    } else {
        anyhow::bail!("Redis did not answer PING")
    }
}
