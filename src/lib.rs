//! Recommendation sourcing for Spotify seeds.
//!
//! Given a playlist or a collection of tracks, spotseed collects every album
//! the seed touches, resolves the full track records of each album and ranks
//! them by popularity within the album. The ranked blocks are concatenated
//! into one candidate pool. A separate analyzer counts how often each primary
//! artist occurs in a track collection.
//!
//! # Modules
//!
//! - `recommend` - the pipeline, the `Catalog` boundary and the pure helpers
//! - `spotify` - the Web API client and credential providers
//! - `management` - token cache and observable run state
//! - `api` / `server` - HTTP endpoints for starting and observing runs
//! - `cli` - command implementations for the binary
//! - `config` - environment configuration
//! - `error` - error types
//! - `types` - data model and option structs
//! - `utils` - reference parsing and table helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod recommend;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias for command-level code that mixes error types.
///
/// Library code returns the typed errors of the `error` module; they convert into
/// this alias with `?`.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet.
///
/// ```
/// info!("Serving recommendations on http://{}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("{} candidate tracks from {} albums", tracks, albums);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with code 1.
///
/// Only for unrecoverable conditions in the binary's command code. The
/// expansion diverges, so it can stand in any match arm.
///
/// ```
/// let addr = match config::server_addr() {
///     Ok(addr) => addr,
///     Err(e) => error!("Failed to parse server address: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning with a yellow exclamation mark.
///
/// ```
/// warning!("Skipped album '{}': {}", album.name, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
