//! CLI argument definitions.

use clap::{Parser, Subcommand};
use ondevice::Backend;
use std::path::PathBuf;

/// Run prompts against on-device language models.
#[derive(Parser, Debug)]
#[command(name = "ondevice", about = "Run prompts against on-device language models", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a response to a single prompt
    Generate {
        /// Prompt text
        #[arg(short, long)]
        prompt: String,

        /// Print chunks as they arrive
        #[arg(long, conflicts_with = "no_stream")]
        stream: bool,

        /// Wait for the whole response before printing
        #[arg(long)]
        no_stream: bool,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured backend
        #[arg(short, long)]
        backend: Option<Backend>,
    },
}

impl Commands {
    /// Streaming preference from the flags, if either was given.
    pub fn streaming_override(&self) -> Option<bool> {
        match self {
            Commands::Generate {
                stream, no_stream, ..
            } => match (stream, no_stream) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}
