//! CLI module for Speider.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Speider - Multi-Source Content Analysis
///
/// A CLI tool that aggregates video, news, and social content for a query,
/// scores sentiment, indexes everything in a vector store, and answers
/// follow-up questions with citations. The name "Speider" comes from the
/// Norwegian word for "scout."
#[derive(Parser, Debug)]
#[command(name = "speider")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Speider and check provider credentials
    Init,

    /// Fetch, score, and summarize content for a query
    Analyze {
        /// The topic to analyze
        query: String,

        /// Drop into an interactive Q&A session after the analysis
        #[arg(short, long)]
        interactive: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
