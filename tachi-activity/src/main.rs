//! tachi-activity - Tachi activity timeline in the terminal
//!
//! Commands:
//! - `feed`: fetch a user's or a game's activity and print the timeline,
//!   loading older pages on request
//! - `clump`: clump an activity page stored in a JSON file, without network
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/tachi-activity/config.toml
//! - Logs: $XDG_STATE_HOME/tachi-activity/tachi-activity.log.<date>

mod timeline;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tachi_activity_core::{
    ActivityClient, ActivityFeed, ActivityPage, ActivityScope, ClumpOptions, Config,
};

#[derive(Parser)]
#[command(name = "tachi-activity")]
#[command(about = "Show Tachi activity as a clumped timeline")]
#[command(version)]
struct Args {
    /// Also print log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the XDG default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch activity from the API and print it
    Feed {
        /// Game, e.g. iidx
        game: String,

        /// Playtype, e.g. SP
        playtype: String,

        /// Only show this user's activity
        #[arg(short, long)]
        user: Option<String>,

        /// Number of pages to load
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        pages: u32,

        /// Print clumps as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clump an activity page from a JSON file
    Clump {
        /// File holding `{"records": [...], "users": [...]}`
        file: PathBuf,

        /// Merge window in seconds (default: from config)
        #[arg(short, long)]
        window_secs: Option<i64>,

        /// Print clumps as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let _log_guard = tachi_activity_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    match args.command {
        Command::Feed {
            game,
            playtype,
            user,
            pages,
            json,
        } => {
            let scope = match user {
                Some(user) => ActivityScope::User {
                    user,
                    game,
                    playtype,
                },
                None => ActivityScope::Game { game, playtype },
            };
            cmd_feed(&config, &scope, pages, json).await
        }
        Command::Clump {
            file,
            window_secs,
            json,
        } => cmd_clump(&config, &file, window_secs, json),
    }
}

async fn cmd_feed(config: &Config, scope: &ActivityScope, pages: u32, json: bool) -> Result<()> {
    let client = ActivityClient::new(&config.api).context("failed to create API client")?;

    tracing::info!(url = %client.url_for(scope), pages, "Loading activity feed");

    let mut feed = client
        .first_page(scope, config.activity.clump_options()?)
        .await
        .context("failed to fetch activity")?;

    // One request in flight at a time: each page is awaited before the next.
    for _ in 1..pages {
        if feed.is_empty() || feed.is_exhausted() {
            break;
        }
        client
            .load_more(scope, &mut feed)
            .await
            .context("failed to load more activity")?;
    }

    print_feed(&feed, json)
}

fn cmd_clump(config: &Config, file: &Path, window_secs: Option<i64>, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let page: ActivityPage = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse activity page {}", file.display()))?;

    let options = match window_secs {
        Some(secs) => ClumpOptions::from_secs(secs).with_context(|| {
            format!(
                "--window-secs must be between 1 and {}, got {}",
                Duration::MAX.num_seconds(),
                secs
            )
        })?,
        None => config.activity.clump_options()?,
    };

    let feed = ActivityFeed::from_page(page, options).context("failed to clump activity")?;
    print_feed(&feed, json)
}

fn print_feed(feed: &ActivityFeed, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(feed.clumps()).context("failed to encode clumps")?;
        println!("{}", out);
        return Ok(());
    }

    if feed.is_empty() {
        println!("We found no activity!");
        return Ok(());
    }

    print!("{}", timeline::render(feed, Utc::now()));

    match feed.cursor() {
        Ok(cursor) if !feed.is_exhausted() => {
            println!();
            println!("More activity before {} (startTime={})", cursor.timestamp(), cursor);
        }
        _ => {}
    }

    Ok(())
}
