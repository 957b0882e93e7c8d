use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    Res, api,
    management::RunStateManager,
    recommend::{Catalog, PipelineOptions},
};

/// Everything the HTTP handlers share.
///
/// Injected into every handler as `Extension<Arc<AppState>>`.
pub struct AppState {
    /// State of the current or most recent run.
    pub runs: RunStateManager,
    /// Catalog every run reads from.
    pub catalog: Arc<dyn Catalog>,
    /// Options applied to every run started over HTTP.
    pub options: PipelineOptions,
}

impl AppState {
    /// Creates the shared state with no run recorded yet.
    pub fn new(catalog: Arc<dyn Catalog>, options: PipelineOptions) -> Self {
        Self {
            runs: RunStateManager::new(),
            catalog,
            options,
        }
    }
}

/// Builds the application router.
///
/// # Routes
///
/// - `GET /health`
/// - `GET /recommendations` and `POST /recommendations`
/// - `GET /recommendations/top-artists`
///
/// Tests serve the returned router on an ephemeral port.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/recommendations",
            get(api::recommendations::state).post(api::recommendations::start),
        )
        .route("/recommendations/top-artists", get(api::recommendations::top))
        .layer(Extension(state))
}

/// Serves [`router`] on `addr` until the process ends.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
///
/// # Example
///
/// ```
/// let state = Arc::new(AppState::new(catalog, PipelineOptions::default()));
/// start_api_server(config::server_addr()?, state).await?;
/// ```
pub async fn start_api_server(addr: SocketAddr, state: Arc<AppState>) -> Res<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
