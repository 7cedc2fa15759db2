mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tja_suggest::config::TjaConfig;
use tja_suggest::suggest::{Domain, Source};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tja", version, about = "Phrase suggestions for guided journaling, served over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport unless --http)
    Serve {
        /// Serve streamable HTTP on server.host:server.port instead of stdio
        #[arg(long)]
        http: bool,
    },
    /// Print suggestions for a domain as JSON
    Suggest {
        /// needs, traits, contexts, or frictions
        domain: Domain,
        /// Partial text to rank against
        text: Option<String>,
    },
    /// Store user text so it can be suggested later
    Ingest { domain: Domain, text: String },
    /// Restate text as a neutral observation
    Reframe { text: String },
    /// Embed the built-in seed vocabulary
    Seed,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Show embedding counts
    Stats,
    /// Export stored embeddings as JSON
    Export {
        /// Only this domain
        #[arg(long)]
        domain: Option<Domain>,
        /// Only user-entered phrases
        #[arg(long)]
        user_only: bool,
        /// Include raw vectors
        #[arg(long)]
        with_vectors: bool,
    },
    /// Delete one stored phrase by id
    Forget { id: String },
    /// Delete stored embeddings
    Reset {
        /// Only delete this source (seed or user)
        #[arg(long)]
        source: Option<Source>,
    },
    /// Check model files and database health
    Doctor,
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.tja/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TjaConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter =
        EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { http } => {
            if http || config.server.transport == "http" {
                server::serve_http(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::Suggest { domain, text } => {
            cli::oneshot::suggest(&config, domain, text.as_deref()).await?;
        }
        Command::Ingest { domain, text } => {
            cli::oneshot::ingest(&config, domain, &text).await?;
        }
        Command::Reframe { text } => cli::oneshot::reframe(&text),
        Command::Seed => {
            let config = config.clone();
            tokio::task::spawn_blocking(move || cli::seed::seed(&config)).await??;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
        Command::Stats => cli::stats::stats(&config)?,
        Command::Export {
            domain,
            user_only,
            with_vectors,
        } => cli::export::export(&config, domain, user_only, with_vectors)?,
        Command::Forget { id } => cli::forget::forget(&config, &id)?,
        Command::Reset { source } => cli::reset::reset(&config, source)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
