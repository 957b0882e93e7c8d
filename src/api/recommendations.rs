use std::sync::Arc;

use axum::{Extension, Json, extract::Query, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    management::RunState,
    recommend::{ArtistCount, Seed, SeedRequest, count_primary_artists, top_artists},
    server::AppState,
};

const DEFAULT_TOP_ARTISTS: usize = 10;

/// Starts a run in the background. The seed is validated before anything is spawned.
pub async fn start(
    Extension(app): Extension<Arc<AppState>>,
    Json(request): Json<SeedRequest>,
) -> (StatusCode, Json<Value>) {
    let seed = match Seed::from_request(request) {
        Ok(seed) => seed,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            );
        }
    };

    if !app.runs.begin().await {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "a run is already in progress" })),
        );
    }

    info!("starting recommendation run");
    app.runs.spawn(Arc::clone(&app.catalog), app.options.clone(), seed);

    (StatusCode::ACCEPTED, Json(json!({ "loading": true })))
}

/// Current run state: pool, loading flag and last error.
pub async fn state(Extension(app): Extension<Arc<AppState>>) -> Json<RunState> {
    Json(app.runs.snapshot().await)
}

/// Query of `GET /recommendations/top-artists`.
#[derive(Debug, Deserialize)]
pub struct TopArtistsQuery {
    pub limit: Option<usize>,
}

/// Most frequent primary artists of the current pool.
pub async fn top(
    Extension(app): Extension<Arc<AppState>>,
    Query(query): Query<TopArtistsQuery>,
) -> Json<Vec<ArtistCount>> {
    let tracks: Vec<_> = app.runs.combined_tracks().await.into_iter().map(Some).collect();
    let freq = count_primary_artists(&tracks);
    Json(top_artists(&freq, query.limit.unwrap_or(DEFAULT_TOP_ARTISTS)))
}
