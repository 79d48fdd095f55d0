//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for answers and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for hybrid-rag
#[derive(Parser, Debug)]
#[command(name = "hybrid-rag")]
#[command(author, version, about = "Domain agents answering from a local index, with web search fallback")]
#[command(long_about = r#"
hybrid-rag answers questions with domain agents (marketing, patent, team,
competitive, policy, pitch-deck, chat). Each agent searches its collection
in the local vector index first and escalates to web search when the local
hits are too few or too weak.

Configuration files are loaded from (in priority order):
1. HYBRID_RAG_* environment variables
2. --config <path>     Explicit config file
3. ./hybrid-rag.toml   Project-level config
4. ~/.config/hybrid-rag/config.toml   Global config

Example:
  hybrid-rag ingest --collection marketing campaigns.jsonl
  hybrid-rag ask --domain marketing "Which channel had the best CTR last quarter?"
  hybrid-rag chat
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Ask a single question to a domain agent
    Ask {
        /// Domain agent (marketing, patent, team, competitive, policy, pitch-deck, chat)
        #[arg(short, long, default_value = "chat")]
        domain: String,

        /// The question
        question: String,
    },

    /// Start an interactive conversation
    Chat {
        /// Domain agent; only `chat` keeps conversation history
        #[arg(short, long, default_value = "chat")]
        domain: String,
    },

    /// Embed and store documents from a JSONL file (`{"id", "text", "metadata"}` per line)
    Ingest {
        /// Target collection
        #[arg(short, long)]
        collection: String,

        /// JSONL file to read
        file: PathBuf,
    },

    /// Show agents, their collections and document counts
    Status,

    /// List the registered tools
    Tools,
}
