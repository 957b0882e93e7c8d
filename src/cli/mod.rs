//! # CLI Module
//!
//! User-facing commands of the `spotseed` binary.
//!
//! - [`recommend`] - runs the pipeline for a seed and prints the candidate pool
//! - [`artists`] - primary-artist frequency table for a seed
//! - [`serve`] - HTTP surface for starting and observing runs
//!
//! A seed is a playlist, an explicit list of tracks, or whatever is playing
//! right now (see [`SeedSource`]). Unrecoverable problems end the process
//! through the `error!` macro; partial failures are reported as warnings.

mod artists;
mod recommend;
mod seed;
mod serve;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{config, error, spotify::SpotifyClient};

pub use artists::artists;
pub use recommend::recommend;
pub use seed::SeedSource;
pub use serve::serve;

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

async fn connect() -> SpotifyClient {
    match SpotifyClient::from_env().await {
        Ok(client) => client,
        Err(e) => error!(
            "Cannot set up Spotify credentials. Set SPOTIFY_ACCESS_TOKEN or client credentials.\n Error: {}",
            e
        ),
    }
}

// An explicit flag beats the configured default market.
fn resolve_market(flag: Option<String>) -> Option<String> {
    if flag.is_some() {
        return flag;
    }
    match config::spotify_market() {
        Ok(market) => market,
        Err(e) => error!("{}", e),
    }
}
