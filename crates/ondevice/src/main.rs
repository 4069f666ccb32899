//! ondevice command-line entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, handle_generate_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    ondevice_core::init_logging("warn");

    let cli = Cli::parse();
    let streaming = cli.command.streaming_override();

    match cli.command {
        Commands::Generate {
            prompt,
            config,
            backend,
            ..
        } => handle_generate_command(prompt, streaming, config, backend).await,
    }
}
