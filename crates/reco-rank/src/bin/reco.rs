use clap::{Parser, Subcommand};
use reco_rank::prelude::*;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (spec §6.5); falls back to defaults if absent.
    #[arg(long, default_value = "reco.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a statement and immediately run a recommendation against it.
    Recommend {
        /// The free-form personal statement text.
        text: String,
        /// Number of final titles to return (defaults to recommend.k).
        #[arg(long)]
        k: Option<usize>,
    },
    /// Report ANN index statistics.
    IndexStats,
    /// Check the Embedder's `/health` endpoint.
    EmbedderHealth,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Recommend { text, k } => {
            let embedder: Arc<dyn Embedder> =
                Arc::new(HttpEmbedder::new(config.reco_core_embedder_config())?);
            let vocab = Arc::new(VocabularyStore::defaults());
            let ann_index = Arc::new(AnnIndex::open(&config.vector.index_path, config.vector.dimension));
            let resume_store = Arc::new(InMemoryResumeStore::new());

            let coordinator = Coordinator::new(embedder, vocab, ann_index, resume_store.clone(), config);
            let id = resume_store.put(text)?;
            let result = coordinator.recommend(id, k, &RequestContext::new()).await?;

            println!("titles:");
            for title in &result.titles {
                println!("  - {title}");
            }
            println!("top_similar:");
            for entry in &result.top_similar {
                println!("  - {} ({:.4})", entry.phrase, entry.similarity);
            }
            if let Some(reason) = result.defaulted {
                println!("note: DEFAULTED safety net fired ({reason:?})");
            }
        }
        Commands::IndexStats => {
            let ann_index = AnnIndex::open(&config.vector.index_path, config.vector.dimension);
            let stats = ann_index.stats();
            println!("records: {}", stats.num_records);
            println!("dimension: {}", stats.dimension);
        }
        Commands::EmbedderHealth => {
            let embedder = HttpEmbedder::new(config.reco_core_embedder_config())?;
            if embedder.health_check().await {
                println!("embedder healthy");
            } else {
                println!("embedder unreachable");
            }
        }
    }

    Ok(())
}
