//! Chat server binary
//!
//! Run with: cargo run -p persona-rag --bin persona-rag-server

use persona_rag::{
    config::RagConfig,
    embeddings::{EmbeddingProvider, HttpEmbedder},
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "persona_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional config file path as the first argument
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            RagConfig::from_file(&path)?
        }
        None => RagConfig::default(),
    };

    // Deployment platforms inject the port through the environment
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value: {}", port))?;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Resume: {}", config.documents.resume_path.display());
    tracing::info!(
        "  - Behavioral Q&A: {}",
        config.documents.behavioral_path.display()
    );
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);

    // Check the embedding backend
    tracing::info!("Checking embedding backend at {}...", config.embeddings.base_url);
    match HttpEmbedder::new(&config.embeddings).health_check().await {
        Ok(_) => {
            tracing::info!("Embedding backend is running");
        }
        Err(e) => {
            tracing::warn!("{}", e);
            tracing::warn!("Start it before sending the first chat message:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!("  2. Pull the model: ollama pull {}", config.embeddings.model);
        }
    }

    // The knowledge base initializes on the first real chat message
    let server = RagServer::new(config);

    println!("\nServer starting...");
    println!("  Chat:   http://{}/chat", server.address());
    println!("  Stats:  http://{}/stats", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
