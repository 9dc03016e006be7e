//! Interactive CLI: ask questions about an indexed commit history

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commit_rag::answer::{AnswerSynthesizer, Retriever};
use commit_rag::chat::ChatSession;
use commit_rag::config::Config;
use commit_rag::embedding::FastEmbedProvider;
use commit_rag::error::Result;
use commit_rag::generation::OpenAiCompatGenerator;
use commit_rag::store::{CommitStore, LanceCommitStore};

/// Chat with the indexed commit history of a repository
#[derive(Parser)]
#[command(name = "commit-rag-chat", version)]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = Args::try_parse() {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        return ExitCode::from(code);
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.needs_indexing() {
                eprintln!("Run the indexer first: commit-rag-index /path/to/repo");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::new()?;

    // Fail on a missing API key before spending time loading the model
    let generator = Arc::new(OpenAiCompatGenerator::from_config(&config.generation)?);

    println!(
        "Loading embedding model '{}'...",
        config.embedding.model_name
    );
    let embedder = Arc::new(FastEmbedProvider::new(
        &config.embedding.model_name,
        &config.embedding.cache_dir,
    )?);

    let store = Arc::new(
        LanceCommitStore::open_existing(&config.store.db_path, &config.store.collection, embedder)
            .await?,
    );
    let indexed = store.count().await?;

    let synthesizer = AnswerSynthesizer::new(
        Retriever::new(store, config.retrieval.top_k),
        generator,
    );
    let session = ChatSession::new(synthesizer, indexed);

    tokio::select! {
        result = session.run() => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nExiting...");
            Ok(())
        }
    }
}
