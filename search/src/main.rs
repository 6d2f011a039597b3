use anyhow::Result;
use axum::Router;
use boolsearch_core::cli::NormalizerArgs;
use clap::{Parser, Subcommand};
use search::{build_app, run_batch, BatchJob};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Answer boolean queries against an index built by `indexer`", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a file of queries, one per line
    Batch {
        /// Dictionary file
        #[arg(short = 'd', long)]
        dictionary: PathBuf,
        /// Postings file
        #[arg(short = 'p', long)]
        postings: PathBuf,
        /// File of queries, one per line
        #[arg(short = 'q', long)]
        queries: PathBuf,
        /// Output file of results
        #[arg(short = 'o', long)]
        output: PathBuf,
        /// Posting lists kept in an LRU cache (0 disables it)
        #[arg(long, default_value_t = 0)]
        cache_capacity: usize,
        #[command(flatten)]
        normalizer: NormalizerArgs,
    },
    /// Serve queries over HTTP
    Serve {
        /// Dictionary file
        #[arg(short = 'd', long)]
        dictionary: PathBuf,
        /// Postings file
        #[arg(short = 'p', long)]
        postings: PathBuf,
        /// Host to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to bind
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Posting lists kept in an LRU cache shared by all requests
        #[arg(long, default_value_t = 1024)]
        cache_capacity: usize,
        #[command(flatten)]
        normalizer: NormalizerArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Batch { dictionary, postings, queries, output, cache_capacity, normalizer } => {
            let job = BatchJob {
                dictionary: &dictionary,
                postings: &postings,
                queries: &queries,
                output: &output,
                normalizer: normalizer.into(),
                cache_capacity,
            };
            run_batch(&job)?;
        }
        Commands::Serve { dictionary, postings, host, port, cache_capacity, normalizer } => {
            let app: Router = build_app(&dictionary, &postings, normalizer.into(), cache_capacity)?;
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(%addr, "server listening");
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
