use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use boolsearch_core::cache::{shared_cache, CachedPostings, SharedCache};
use boolsearch_core::error::SearchError;
use boolsearch_core::eval::Evaluator;
use boolsearch_core::persist::{load_dictionary, PostingsReader, PostingsSource};
use boolsearch_core::tokenizer::Normalizer;
use boolsearch_core::{Dictionary, DocId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub queries: usize,
    pub failed: usize,
}

/// Paths and settings for one batch run.
pub struct BatchJob<'a> {
    pub dictionary: &'a Path,
    pub postings: &'a Path,
    pub queries: &'a Path,
    pub output: &'a Path,
    pub normalizer: Normalizer,
    /// LRU capacity in posting lists; 0 disables the cache.
    pub cache_capacity: usize,
}

/// Answer every line of the queries file, one output line per query.
///
/// Malformed queries are logged and answered with an empty line; I/O and dictionary format
/// errors abort the run.
pub fn run_batch(job: &BatchJob<'_>) -> Result<BatchSummary> {
    let dictionary = load_dictionary(job.dictionary)
        .with_context(|| format!("loading dictionary {}", job.dictionary.display()))?;
    let reader = PostingsReader::open(job.postings)
        .with_context(|| format!("opening postings {}", job.postings.display()))?;
    let queries = fs::read_to_string(job.queries)
        .with_context(|| format!("reading queries {}", job.queries.display()))?;
    let out = fs::File::create(job.output)
        .with_context(|| format!("creating output {}", job.output.display()))?;
    let mut out = BufWriter::new(out);

    let evaluator = Evaluator::new(&dictionary, &job.normalizer);
    let summary = if job.cache_capacity > 0 {
        let mut source = CachedPostings::new(reader, shared_cache(job.cache_capacity));
        answer_all(&evaluator, &queries, &mut source, &mut out)?
    } else {
        let mut source = reader;
        answer_all(&evaluator, &queries, &mut source, &mut out)?
    };
    out.flush()?;

    tracing::info!(queries = summary.queries, failed = summary.failed, output = %job.output.display(), "batch complete");
    Ok(summary)
}

fn answer_all<S: PostingsSource, W: Write>(evaluator: &Evaluator<'_>, queries: &str, source: &mut S, out: &mut W) -> Result<BatchSummary> {
    let mut summary = BatchSummary { queries: 0, failed: 0 };
    for (idx, query) in queries.lines().enumerate() {
        if idx > 0 {
            out.write_all(b"\n")?;
        }
        summary.queries += 1;
        match evaluator.search(query, source) {
            Ok(doc_ids) => out.write_all(format_doc_ids(&doc_ids).as_bytes())?,
            Err(err) if err.is_query_error() => {
                summary.failed += 1;
                tracing::error!(line = idx + 1, query, error = %err, "query failed");
            }
            Err(err) => return Err(err).with_context(|| format!("answering query on line {}", idx + 1)),
        }
    }
    Ok(summary)
}

/// Space-separated ascending IDs.
pub fn format_doc_ids(doc_ids: &[DocId]) -> String {
    doc_ids.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ")
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub doc_ids: Vec<DocId>,
}

#[derive(Clone)]
pub struct AppState {
    pub dictionary: Arc<Dictionary>,
    pub normalizer: Normalizer,
    pub postings_path: PathBuf,
    pub cache: SharedCache,
}

pub fn build_app(dictionary_path: &Path, postings_path: &Path, normalizer: Normalizer, cache_capacity: usize) -> Result<Router> {
    // Load the dictionary once; every request opens its own postings handle
    let dictionary = load_dictionary(dictionary_path)
        .with_context(|| format!("loading dictionary {}", dictionary_path.display()))?;
    // Fail at startup rather than on the first request
    PostingsReader::open(postings_path)
        .with_context(|| format!("opening postings {}", postings_path.display()))?;
    tracing::info!(terms = dictionary.len(), documents = dictionary.universe().len(), "dictionary loaded");

    let app_state = AppState {
        dictionary: Arc::new(dictionary),
        normalizer,
        postings_path: postings_path.to_path_buf(),
        cache: shared_cache(cache_capacity),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<serde_json::Value>)> {
    let start = std::time::Instant::now();
    let query = params.q.clone();
    // postings reads are blocking seeks; keep them off the async workers
    let answered = tokio::task::spawn_blocking(move || answer_query(&state, &query))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "search task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "search task failed" })))
        })?;

    let doc_ids = match answered {
        Ok(doc_ids) => doc_ids,
        Err(err) if err.is_query_error() => {
            return Err((StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": err.to_string() }))));
        }
        Err(err) => return Err(internal_error(err)),
    };

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: doc_ids.len(), doc_ids }))
}

/// Evaluate one query with a postings handle of its own and the shared cache.
fn answer_query(state: &AppState, query: &str) -> Result<Vec<DocId>, SearchError> {
    let reader = PostingsReader::open(&state.postings_path)?;
    let mut source = CachedPostings::new(reader, state.cache.clone());
    Evaluator::new(&state.dictionary, &state.normalizer).search(query, &mut source)
}

fn internal_error(err: SearchError) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!(error = %err, "search failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": err.to_string() })))
}
