use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use folio_core::query::{
    boolean_search, category_search, fuzzy_search, general_search, phrase_search, proximity_search, title_search,
};
use folio_core::{
    into_records, load_corpus, sort_results, DocId, Document, FuzzyRatio, IndexStats, RapidFuzz, SearchHit,
    SearchIndex, SortKey,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const DEFAULT_MAX_DISTANCE: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub phrase: String,
    /// Comma-separated proximity terms.
    #[serde(default)]
    pub terms: String,
    pub max_distance: Option<String>,
    pub sort_by: Option<String>,
    pub ascending: Option<String>,
}

impl SearchParams {
    fn sort_key(&self) -> SortKey { self.sort_by.as_deref().map(SortKey::from).unwrap_or_default() }

    fn ascending(&self) -> bool { self.ascending.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("true")) }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<HitRecord>,
}

#[derive(Serialize)]
pub struct HitRecord {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub category: String,
    pub path: String,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SearchIndex>,
    pub matcher: Arc<dyn FuzzyRatio>,
}

/// Load and index the corpus, then build the router. Fails before serving
/// anything if the corpus cannot be read.
pub fn load_app(corpus: &str) -> Result<Router> {
    let sources = load_corpus(corpus)?;
    let index = SearchIndex::build(into_records(sources));
    Ok(build_app(Arc::new(index)))
}

pub fn build_app(index: Arc<SearchIndex>) -> Router {
    let app_state = AppState { index, matcher: Arc::new(RapidFuzz) };

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
        .route("/stats", get(stats_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/search", get(search_handler))
        .route("/search/by_category", get(category_handler))
        .route("/search/boolean", get(boolean_handler))
        .route("/search/by_phrase", get(phrase_handler))
        .route("/search/proximity", get(proximity_handler))
        .route("/search/by_title", get(title_handler))
        .route("/fuzzy_search", get(fuzzy_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn respond(state: &AppState, query: String, start: Instant, hits: Vec<SearchHit>) -> Json<SearchResponse> {
    let results: Vec<HitRecord> = hits
        .into_iter()
        .filter_map(|hit| {
            let doc = state.index.document(hit.doc_id)?;
            Some(HitRecord {
                doc_id: hit.doc_id,
                score: hit.score,
                title: doc.title.clone(),
                category: doc.category.clone(),
                path: doc.path.clone(),
            })
        })
        .collect();
    let elapsed = start.elapsed();
    tracing::debug!(query = %query, total_hits = results.len(), took_s = elapsed.as_secs_f64(), "search served");
    Json(SearchResponse { query, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results })
}

fn ranked(state: &AppState, params: &SearchParams, hits: Vec<SearchHit>) -> Vec<SearchHit> {
    sort_results(hits, &state.index, params.sort_key(), params.ascending())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let hits = ranked(&state, &params, general_search(&state.index, &params.query));
    respond(&state, params.query, start, hits)
}

pub async fn category_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let hits = category_search(&state.index, &params.query, &params.category);
    let hits = ranked(&state, &params, hits);
    respond(&state, params.query, start, hits)
}

pub async fn boolean_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let mut hits = boolean_search(&state.index, &params.query);
    // Ascending doc id unless the caller asks for an order.
    if params.sort_by.is_some() {
        hits = ranked(&state, &params, hits);
    }
    respond(&state, params.query, start, hits)
}

pub async fn phrase_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let hits = ranked(&state, &params, phrase_search(&state.index, &params.phrase));
    respond(&state, params.phrase, start, hits)
}

pub async fn proximity_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let max_distance = parse_max_distance(params.max_distance.as_deref())?;
    let terms: Vec<String> = params
        .terms
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    // A negative distance is parseable but can never be satisfied.
    let hits = match usize::try_from(max_distance) {
        Ok(max_distance) => proximity_search(&state.index, &terms, max_distance),
        Err(_) => Vec::new(),
    };
    let hits = ranked(&state, &params, hits);
    Ok(respond(&state, params.terms, start, hits))
}

pub async fn title_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let hits = title_search(&state.index, state.matcher.as_ref(), &params.query);
    let hits = ranked(&state, &params, hits);
    respond(&state, params.query, start, hits)
}

pub async fn fuzzy_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let hits = fuzzy_search(&state.index, state.matcher.as_ref(), &params.query);
    let hits = ranked(&state, &params, hits);
    respond(&state, params.query, start, hits)
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<Document>, (StatusCode, String)> {
    match state.index.document(doc_id) {
        Some(doc) => Ok(Json(doc.clone())),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> { Json(state.index.stats()) }

fn parse_max_distance(raw: Option<&str>) -> Result<i64, (StatusCode, String)> {
    match raw {
        None => Ok(DEFAULT_MAX_DISTANCE),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("max_distance must be an integer, got {raw:?}"))),
    }
}
