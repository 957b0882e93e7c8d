//! Configuration for spotseed.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Variables already present in the process
//! environment win over the file.
//!
//! | Variable | Default |
//! |---|---|
//! | `SPOTIFY_API_URL` | `https://api.spotify.com/v1` |
//! | `SPOTIFY_API_TOKEN_URL` | `https://accounts.spotify.com/api/token` |
//! | `SPOTIFY_API_AUTH_CLIENT_ID` | none |
//! | `SPOTIFY_API_AUTH_CLIENT_SECRET` | none |
//! | `SPOTIFY_ACCESS_TOKEN` | none |
//! | `SPOTIFY_MARKET` | none |
//! | `SERVER_ADDRESS` | `127.0.0.1:8888` |

use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::ConfigError;

/// Web API root used when `SPOTIFY_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
/// Accounts service token endpoint used when `SPOTIFY_API_TOKEN_URL` is unset.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Bind address used when `SERVER_ADDRESS` is unset.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Directory holding the `.env` file and the token cache.
///
/// - Linux: `~/.local/share/spotseed`
/// - macOS: `~/Library/Application Support/spotseed`
/// - Windows: `%LOCALAPPDATA%/spotseed`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(env!("CARGO_PKG_NAME"));
    path
}

/// Loads `<data dir>/.env` into the process environment.
///
/// The directory is created when missing. A missing file is fine: every
/// setting can come from the real environment instead.
///
/// # Errors
///
/// This function will return an error if:
/// - The data directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
///
/// # Example
///
/// ```
/// use spotseed::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)?;
    Ok(())
}

fn var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    var(name).ok_or(ConfigError::Missing(name))
}

fn with_default(name: &'static str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

/// Base URL of the catalog Web API, without trailing slash.
///
/// Reads `SPOTIFY_API_URL`, falling back to [`DEFAULT_API_URL`]. Pointing it
/// at a local stand-in is how the HTTP client is tested.
///
/// # Example
///
/// ```
/// let url = format!("{}/albums/{}/tracks", config::spotify_apiurl(), album_id);
/// ```
pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Token endpoint used for refresh and client-credentials grants.
pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Application client id from `SPOTIFY_API_AUTH_CLIENT_ID`.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when the variable is unset or blank.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Only needed for the client-credentials grant. Keep it out of logs.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Bearer token supplied directly, bypassing the token cache.
pub fn spotify_access_token() -> Option<String> {
    var("SPOTIFY_ACCESS_TOKEN")
}

/// Default market as an ISO 3166-1 alpha-2 code.
///
/// # Returns
///
/// - `Ok(None)` - `SPOTIFY_MARKET` is unset, the catalog picks the market
/// - `Ok(Some(code))` - The upper-cased code
/// - `Err(ConfigError::Invalid)` - The value is not a two-letter code
pub fn spotify_market() -> Result<Option<String>, ConfigError> {
    match var("SPOTIFY_MARKET") {
        Some(market) => parse_market(&market)
            .map(Some)
            .ok_or(ConfigError::Invalid {
                name: "SPOTIFY_MARKET",
                value: market,
            }),
        None => Ok(None),
    }
}

/// Upper-cases a two-letter market code, rejecting anything else.
pub fn parse_market(input: &str) -> Option<String> {
    let input = input.trim();
    if input.len() == 2 && input.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(input.to_ascii_uppercase())
    } else {
        None
    }
}

/// Address the HTTP server binds to.
///
/// Reads `SERVER_ADDRESS` as `host:port`, falling back to
/// [`DEFAULT_SERVER_ADDRESS`].
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is not a socket address.
pub fn server_addr() -> Result<SocketAddr, ConfigError> {
    let value = with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
    value.parse().map_err(|_| ConfigError::Invalid {
        name: "SERVER_ADDRESS",
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_codes_are_normalised() {
        assert_eq!(parse_market("de"), Some("DE".to_string()));
        assert_eq!(parse_market(" US "), Some("US".to_string()));
        assert_eq!(parse_market("DEU"), None);
        assert_eq!(parse_market("1A"), None);
        assert_eq!(parse_market(""), None);
    }

    #[test]
    fn data_dir_is_named_after_the_package() {
        assert!(data_dir().ends_with("spotseed"));
    }
}
