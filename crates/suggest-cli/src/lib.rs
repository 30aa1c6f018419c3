//! topic-suggest library exports.
//!
//! This crate provides the `topic-suggest` binary, a command-line front end
//! for the suggestion aggregator backed by a JSON forum fixture.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (suggest, topic, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    format_topics, init_logging, load_settings, run_suggest, show_config, show_topic,
    SuggestRequest,
};
