//! context-db-mcp CLI entry point

use clap::{Parser, Subcommand};
use context_db_mcp::{
    config::Config,
    error::Result,
    mcp::McpServer,
    remote::HttpVectorStoreClient,
    store::ContextStore,
};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "context-db-mcp")]
#[command(version, about = "MCP server for OpenAI vector store ingestion and retrieval", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio (the default)
    Serve,

    /// Print vector store info as JSON
    Info {
        /// Vector store ID to inspect instead of the configured default
        #[arg(long)]
        store_id: Option<String>,
    },
}

fn init_tracing(log_level: &str, verbose: bool) {
    let directive = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive.to_string()));

    // stdout carries MCP protocol frames, so all logging goes to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_store(config: &Config) -> Result<ContextStore> {
    let client = HttpVectorStoreClient::new(config)?;
    Ok(ContextStore::new(Arc::new(client), config.clone()))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level, cli.verbose);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let store = build_store(&config)?;
            McpServer::new(store).run().await
        }
        Commands::Info { store_id } => {
            let store = build_store(&config)?;
            let info = store.get_store_info(store_id.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
