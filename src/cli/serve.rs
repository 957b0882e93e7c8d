use std::sync::Arc;

use crate::{
    cli::{connect, resolve_market},
    config, error, info,
    recommend::PipelineOptions,
    server::{AppState, start_api_server},
};

pub async fn serve(market: Option<String>) {
    let market = resolve_market(market);
    let client = connect().await;

    let addr = match config::server_addr() {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let options = PipelineOptions {
        market,
        ..Default::default()
    };
    let state = Arc::new(AppState::new(Arc::new(client), options));

    info!("Serving recommendations on http://{}", addr);
    if let Err(e) = start_api_server(addr, state).await {
        error!("Server stopped. Err: {}", e);
    }
}
