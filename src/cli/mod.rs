use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the API server and chat UI (the default)
    Serve {
        /// Set the server host address [default: $CHAT_HOST or 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Set the server port [default: $CHAT_PORT or 5000]
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start an interactive chat session in the terminal
    Chat {
        /// Ground answers in the configured search index
        #[arg(long, action, default_value = "false")]
        documents: bool,

        /// Sampling temperature between 0.0 and 1.0
        #[arg(long)]
        temperature: Option<f64>,

        /// Maximum tokens in each reply, between 100 and 4000
        #[arg(long)]
        max_tokens: Option<f64>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat {
            documents,
            temperature,
            max_tokens,
        }) => {
            chat::run(config, documents, temperature, max_tokens).await?;
        }
        None => {
            serve::run(None, None, config).await?;
        }
    }

    Ok(())
}
