use anyhow::{Context, Result};
use boolsearch_core::builder::IndexBuilder;
use boolsearch_core::corpus::index_directory;
use boolsearch_core::cli::NormalizerArgs;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean-retrieval inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file in a directory; each file name is a document ID
    Build {
        /// Directory of documents
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Output dictionary file
        #[arg(short = 'd', long)]
        dictionary: PathBuf,
        /// Output postings file
        #[arg(short = 'p', long)]
        postings: PathBuf,
        /// Stop after indexing this many documents
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        normalizer: NormalizerArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, dictionary, postings, limit, normalizer } => {
            let mut builder = IndexBuilder::new(normalizer.into()).with_limit(limit);
            let indexed = index_directory(&mut builder, &input)
                .with_context(|| format!("indexing documents in {}", input.display()))?;
            tracing::info!(indexed, input = %input.display(), "ingested documents");
            builder
                .write(&dictionary, &postings)
                .with_context(|| format!("writing {} and {}", dictionary.display(), postings.display()))?;
            Ok(())
        }
    }
}
