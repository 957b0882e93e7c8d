//! # API Module
//!
//! HTTP endpoints served by `spotseed serve`.
//!
//! - [`health`] - status and version for monitoring
//! - [`recommendations::start`] - `POST /recommendations`, accepts a seed and
//!   starts a run in the background (`202`, `400` on a malformed seed, `409`
//!   while another run is loading)
//! - [`recommendations::state`] - `GET /recommendations`, the observable run state
//! - [`recommendations::top`] - `GET /recommendations/top-artists?limit=N`
//!
//! Handlers share [`crate::server::AppState`] through an axum `Extension`.

mod health;
pub mod recommendations;

pub use health::health;
