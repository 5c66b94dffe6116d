use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use search_core::tokenizer::tokenize;
use search_core::{top_k, Bm25Params, DocId, InvertedIndex, QueryMode, QueryOptions, Record};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_CHARS: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub refinements: bool,
    #[serde(default)]
    pub mode: QueryMode,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub description: String,
    pub snippet: String,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
}

/// Build the index from a `<title>TAB<description>` corpus file.
pub fn load_index(corpus: &std::path::Path, params: Bm25Params) -> Result<InvertedIndex> {
    let f = File::open(corpus).with_context(|| format!("opening corpus {}", corpus.display()))?;
    Ok(InvertedIndex::from_reader(BufReader::new(f), params)?)
}

pub fn build_app(index: InvertedIndex) -> Router {
    let app_state = AppState { index: Arc::new(index) };

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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let opts = QueryOptions { mode: params.mode, use_refinements: params.refinements };
    let ranked = state.index.search(&params.q, &opts);
    let total_hits = ranked.len();
    let k = params.k.clamp(1, 100);

    let words: Vec<String> = tokenize(&params.q).collect();
    let results: Vec<SearchHit> = top_k(&ranked, k)
        .iter()
        .filter_map(|p| {
            let record = state.index.record(p.doc_id)?;
            Some(SearchHit {
                doc_id: p.doc_id,
                score: p.score,
                title: record.title.clone(),
                description: record.description.clone(),
                snippet: snippet(record, &words),
            })
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, took_s = elapsed.as_secs_f64(), "search");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, (StatusCode, String)> {
    match state.index.record(doc_id) {
        Some(record) => Ok(Json(DocResponse { doc_id, record: record.clone() })),
        None => Err((StatusCode::NOT_FOUND, format!("no document {doc_id}"))),
    }
}

/// Leading part of the description (or the title when it is empty) with
/// query words wrapped in `<em>`.
fn snippet(record: &Record, words: &[String]) -> String {
    let text = if record.description.is_empty() { &record.title } else { &record.description };
    let head: String = text.chars().take(SNIPPET_CHARS).collect();
    highlight_terms(&head, words)
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    if terms.is_empty() {
        return snippet.to_string();
    }
    // One alternation, longest term first, so markup is never matched again.
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = sorted.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    match regex::RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(pat) => pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string(),
        Err(_) => snippet.to_string(),
    }
}
