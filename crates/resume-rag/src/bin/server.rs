//! Resume chat server binary
//!
//! Run with: cargo run -p resume-rag --bin resume-rag-server -- --data-dir data

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_rag::{config::RagConfig, server::state::AppState, server::RagServer};

#[derive(Parser)]
#[command(name = "resume-rag-server")]
#[command(about = "Chat with a folder of resume PDFs using retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "RESUME_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the documents (default: data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Number of chunks retrieved per question
    #[arg(long)]
    top_k: Option<usize>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RagConfig> {
        let mut config = match &self.config {
            Some(path) => RagConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => RagConfig::default(),
        };

        if let Some(dir) = self.data_dir {
            config.data.dir = dir;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data directory: {}", config.data.dir.display());
    tracing::info!(
        "  - Embeddings: {:?} / {} ({} dims)",
        config.embeddings.provider,
        config.embeddings.model,
        config.embeddings.dimensions
    );
    tracing::info!("  - LLM: {:?} / {}", config.llm.provider, config.llm.model);
    tracing::info!(
        "  - Chunk size: {} (overlap {}), top_k: {}",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
        config.retrieval.top_k
    );

    let state = AppState::new(config)
        .await
        .context("failed to build the document index")?;
    let server = RagServer::new(state);

    println!("\nServer starting...");
    println!("  Chat:     http://{}/", server.address());
    println!("  Health:   http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
