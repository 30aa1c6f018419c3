//! CLI argument parsing for topic-suggest.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Related-topic suggestions over a forum fixture
#[derive(Parser, Debug)]
#[command(name = "topic-suggest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/topic-suggest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Forum fixture (JSON) backing the collaborators
    #[arg(short, long, global = true)]
    pub fixture: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest topics related to a reference topic
    Suggest {
        /// Reference topic id
        #[arg(long)]
        tid: String,

        /// Viewer id (0 for a guest)
        #[arg(long, default_value_t = 0)]
        uid: u64,

        /// First index of the page (0-based)
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Last index of the page, inclusive; -1 for everything
        #[arg(long, default_value_t = 4, allow_hyphen_values = true)]
        stop: i64,

        /// Only topics active within this many months (0 for no limit)
        #[arg(long)]
        cutoff_months: Option<u32>,

        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of one line per topic
        #[arg(long)]
        json: bool,
    },

    /// Show a topic from the fixture
    Topic {
        /// Topic id
        #[arg(long)]
        tid: String,
    },

    /// Print the effective settings
    Config,
}
