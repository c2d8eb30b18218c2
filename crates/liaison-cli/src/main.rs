use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;
mod session;

use commands::chat::handle_chat;
use commands::manager::handle_manager;
use commands::sales::handle_sales;
use liaison::config::Settings;
use liaison::providers::factory::get_provider;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the personal representative
    Chat,

    /// Write cold sales emails with several agents at once
    Sales {
        /// Ask the picker agent to choose the single best email
        #[arg(long)]
        pick: bool,

        /// Send the chosen email through SendGrid
        #[arg(long)]
        send: bool,

        /// Task given to every sales agent
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Let a sales manager agent use the writers as tools and send the best email
    Manager {
        /// Instruction for the manager
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr and stay quiet unless RUST_LOG asks for more
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load settings")?;
    let provider = get_provider(settings.provider.clone().into_config())?;

    match cli.command {
        Command::Chat => handle_chat(&settings, provider).await,
        Command::Sales { pick, send, prompt } => {
            handle_sales(&settings, provider, pick, send, prompt).await
        }
        Command::Manager { prompt } => handle_manager(&settings, provider, prompt).await,
    }
}
