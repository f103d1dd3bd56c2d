//! Command-line arguments.

use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "podart",
    version,
    about = "Podcast cover art cache and device art sync",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Cover cache directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Action to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Shared feed description for commands that touch a channel.
#[derive(Debug, clap::Args)]
pub struct FeedArgs {
    /// Feed URL identifying the channel.
    pub feed_url: String,

    /// Cover URL advertised by the feed.
    #[arg(long)]
    pub cover_url: Option<String>,

    /// Channel title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Basic-auth username for the feed.
    #[arg(long)]
    pub username: Option<String>,

    /// Basic-auth password for the feed.
    #[arg(long, env = "PODART_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a channel cover and print its path.
    Cover {
        /// Feed whose cover is handled.
        #[command(flatten)]
        feed: FeedArgs,

        /// Only look at covers already on disk.
        #[arg(long)]
        cache_only: bool,
    },
    /// Discard the cached cover and fetch it again.
    Replace {
        /// Feed whose cover is handled.
        #[command(flatten)]
        feed: FeedArgs,

        /// Fetch from this URL instead of the feed's cover.
        #[arg(long)]
        custom_url: Option<String>,
    },
    /// Copy a channel's cover next to a synced episode.
    SyncArt {
        /// Feed whose cover is handled.
        #[command(flatten)]
        feed: FeedArgs,

        /// Local file of the synced episode.
        #[arg(long, value_name = "PATH")]
        episode_file: PathBuf,

        /// Episode folder on the device.
        #[arg(long, value_name = "DIR")]
        device_folder: PathBuf,
    },
    /// Delete every cached cover.
    ClearCache,
}
