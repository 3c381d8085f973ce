use anyhow::{Context, Result};
use clap::Parser;
use gpt_chatbot::{Config, LlmClient, app, logging};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gpt-chatbot")]
#[command(version)]
#[command(about = "Chat with an OpenAI model from the terminal", long_about = None)]
struct Cli {
    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logging::init(path, cli.verbose)?;
    }

    let config = Config::from_env()?;
    tracing::info!(endpoint = %config.endpoint, model = %config.generation.model, "configuration loaded");

    let client = LlmClient::new(&config).context("Failed to create HTTP client")?;

    app::run(Arc::new(client)).await
}
