use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;

use plotgod_llm::client::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use plotgod_server::ServerConfig;
use plotgod_store::Database;

/// Campaign manager for tabletop sessions, with generated session prep.
#[derive(Parser, Debug)]
#[command(name = "plotgod", version)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Path to the SQLite database file.
    #[arg(long, env = "DATABASE_PATH", default_value = "data/plotgod.db")]
    database_path: PathBuf,

    /// API key for the chat-completions endpoint. CRUD works without one;
    /// session prep reports the auth failure inline.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    openai_api_key: String,

    /// Model used for session prep.
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    openai_model: String,

    /// Base URL of the chat-completions API.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Starting plotgod server");

    let db = Database::open(&args.database_path).context("failed to open database")?;

    let generator = Arc::new(OpenAiClient::new(
        SecretString::from(args.openai_api_key),
        args.openai_model,
        args.openai_base_url,
    ));

    let config = ServerConfig { port: args.port };
    let port = config.port;
    let _handle = plotgod_server::start(config, db, generator)
        .await
        .context("failed to start server")?;

    tracing::info!(port = port, "plotgod server ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!("Shutting down");
    Ok(())
}
