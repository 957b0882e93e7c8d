//! # Spotify Integration Module
//!
//! HTTP side of the catalog boundary. [`SpotifyClient`] implements
//! [`crate::recommend::Catalog`] on top of the Spotify Web API and adds the
//! playback-state lookup used to seed a run from the current track.
//!
//! ## Endpoints
//!
//! - `GET /playlists/{id}/tracks` - one page of playlist items
//! - `GET /albums/{id}/tracks` - one page of an album listing
//! - `GET /tracks?ids=` - up to 50 full track records
//! - `GET /artists?ids=` - up to 50 full artist records
//! - `GET /me/player/currently-playing` - 204 when nothing plays
//!
//! ## Error handling
//!
//! - 429 responses wait for `Retry-After` (up to 120 seconds) and retry
//! - 502 responses are retried up to three attempts in total
//! - every other non-2xx status becomes [`crate::error::CatalogError::Status`]
//!   carrying the API's error message
//!
//! ## Credentials
//!
//! Tokens come from a [`credentials::CredentialProvider`]; see
//! [`credentials::from_env`] for how one is chosen.

mod client;
pub mod credentials;

pub use client::SpotifyClient;
pub use credentials::{ClientCredentials, CredentialProvider, StaticToken};
