//! Indexing CLI: walk a git repository and index its commit history

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commit_rag::config::Config;
use commit_rag::embedding::FastEmbedProvider;
use commit_rag::error::Result;
use commit_rag::indexing::Indexer;
use commit_rag::store::LanceCommitStore;

/// Index a git repository's commit history for question answering
#[derive(Parser)]
#[command(name = "commit-rag-index", version)]
struct Args {
    /// Path to the git repository to index
    repo_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not usage errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::new()?;

    println!(
        "Loading embedding model '{}'...",
        config.embedding.model_name
    );
    let embedder = Arc::new(FastEmbedProvider::new(
        &config.embedding.model_name,
        &config.embedding.cache_dir,
    )?);

    let store = Arc::new(
        LanceCommitStore::open_or_create(&config.store.db_path, &config.store.collection, embedder)
            .await?,
    );

    println!("Reading commits from {}...", args.repo_path.display());
    let indexer = Indexer::new(store, config.indexing.batch_size);
    let report = indexer.index_repository(&args.repo_path).await?;

    if report.scanned == 0 {
        println!("No commits found to index.");
        return Ok(());
    }

    if report.nothing_new() {
        println!("All commits are already indexed. Database is up-to-date.");
        return Ok(());
    }

    println!("\nSuccessfully indexed {} new documents.", report.added);
    println!("Database stored at: {}", config.store.db_path.display());
    println!("Collection name: {}", config.store.collection);

    if report.failed_batches > 0 {
        eprintln!(
            "{} batch(es) were skipped after write failures; the next run will retry those commits.",
            report.failed_batches
        );
        for error in &report.errors {
            eprintln!("  {}", error);
        }
    }

    Ok(())
}
