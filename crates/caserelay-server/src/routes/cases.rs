use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/search-cases", get(search_cases))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_cases(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.relay.search_cases(&query.q).await {
        Ok(results) => Ok(Json(json!({ "results": results }))),
        Err(e) => {
            error!("search for {:?} failed: {e}", query.q);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "search failed", "details": e.to_string() })),
            ))
        }
    }
}
