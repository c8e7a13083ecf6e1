//! A minimal JSON web UI for the engine, mounted from the CLI binary when `-port` is
//! given. HTML rendering and the servlet front-end are out of scope — this crate
//! exposes the engine's read path as JSON only, the same way this codebase's other
//! HTTP surface is built on `axum` + `tower-http`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use webdex_core::json as webdex_json;
use webdex_core::locked_index::LockedIndex;
use webdex_core::query::QueryProcessor;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    processor: Arc<QueryProcessor>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default)]
    exact: bool,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Returns the same `{ "<canonical query>": [ {where,count,score}, … ] }` shape as
/// the JSON serializer's results output, keyed by the canonical query string.
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<Value> {
    state.processor.process_query(&params.q, params.exact);
    state.processor.finish();

    let canonical = webdex_core::query::canonical_query(&params.q);
    let results = state.processor.results();
    let hits = results.get(&canonical).cloned().unwrap_or_default();

    let mut one_entry = BTreeMap::new();
    one_entry.insert(canonical, hits);
    let body = webdex_json::results_to_json(&one_entry);
    Json(serde_json::from_str(&body).expect("results_to_json always produces valid json"))
}

/// Build the router. A dedicated single-threaded query processor backs `/search` so
/// repeated queries benefit from the same canonical-query cache the CLI's `-query`
/// path uses.
pub fn router(index: Arc<LockedIndex>) -> Router {
    let processor = QueryProcessor::new_single_threaded(index);
    let state = AppState { processor };
    Router::new().route("/health", get(health)).route("/search", get(search)).with_state(state)
}

/// Bind and serve the web UI on `port` until the process is asked to shut down.
/// Startup failures (cannot bind the port) abort the process before any task runs,
/// matching this crate's existing startup-error convention.
pub async fn run_server(index: Arc<LockedIndex>, port: u16) {
    let app = router(index);
    let addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: failed to bind web UI to {addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "web UI listening");
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("error: web UI server failed: {e}");
        std::process::exit(1);
    }
}
