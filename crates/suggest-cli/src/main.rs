//! topic-suggest
//!
//! Related-topic suggestions over a forum fixture.
//!
//! # Usage
//!
//! ```bash
//! topic-suggest --fixture demos/forum.json suggest --tid 1 [--uid 20] [--start 0] [--stop 4]
//! topic-suggest --fixture demos/forum.json topic --tid 1
//! topic-suggest config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/topic-suggest/config.toml)
//! 3. Config file given with --config (optional)
//! 4. Environment variables (SUGGEST_*, nested keys joined by `__`)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use suggest_cli::{
    format_topics, init_logging, load_settings, run_suggest, show_config, show_topic, Cli,
    Commands, SuggestRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(
        cli.config.as_deref(),
        cli.log_level.as_deref(),
        cli.fixture.as_deref(),
    )?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Suggest {
            tid,
            uid,
            start,
            stop,
            cutoff_months,
            seed,
            json,
        } => {
            let request = SuggestRequest {
                tid,
                uid,
                start,
                stop,
                cutoff_months,
                seed,
            };
            let topics = run_suggest(&settings, request).await?;
            println!("{}", format_topics(&topics, json)?);
        }
        Commands::Topic { tid } => {
            println!("{}", show_topic(&settings, &tid)?);
        }
        Commands::Config => {
            print!("{}", show_config(&settings)?);
        }
    }

    Ok(())
}
