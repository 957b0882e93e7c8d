use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    config,
    error::{CatalogError, CatalogResult, ConfigError},
    recommend::Catalog,
    spotify::credentials::{self, CredentialProvider},
    types::{
        AlbumTrackPage, AlbumTracksOptions, ApiErrorResponse, Artist, CurrentlyPlayingResponse,
        MAX_IDS_PER_REQUEST, Page, PlaylistItem, PlaylistItemsOptions, SeveralArtistsResponse,
        SeveralTracksResponse, Track,
    },
};

/// Longest `Retry-After` the client is willing to sit out.
const MAX_RETRY_AFTER_SECS: u64 = 120;
const MAX_RATE_LIMIT_RETRIES: u32 = 5;
const BAD_GATEWAY_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);

/// Catalog access over the Spotify Web API.
///
/// Every request carries a bearer token obtained from the client's
/// [`CredentialProvider`] right before it is sent. Responses are handled the
/// same way for all endpoints:
///
/// - `204 No Content` is reported as "nothing there" instead of an error
/// - `429 Too Many Requests` waits for `Retry-After` (one second if absent) and
///   retries, up to five times, unless the server asks for more than 120 seconds
/// - `502 Bad Gateway` is retried, three attempts in total
/// - any other non-2xx status becomes [`CatalogError::Status`] carrying the
///   message from the API error body
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use spotseed::spotify::{SpotifyClient, StaticToken};
///
/// let client = SpotifyClient::new(
///     "https://api.spotify.com/v1",
///     Arc::new(StaticToken::new("BQC...")),
/// );
/// ```
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root such as `https://api.spotify.com/v1`; a trailing
    ///   slash is dropped
    /// * `credentials` - Source of the bearer token attached to each request
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        }
    }

    /// Client for the configured API URL with credentials picked from the environment.
    ///
    /// The API root comes from `SPOTIFY_API_URL`. Credentials are chosen by
    /// [`credentials::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no static token or cached token exists and
    /// the client id or secret is missing.
    ///
    /// # Example
    ///
    /// ```
    /// config::load_env().await?;
    /// let client = SpotifyClient::from_env().await?;
    /// let playing = client.currently_playing(None).await?;
    /// ```
    pub async fn from_env() -> Result<Self, ConfigError> {
        let credentials = credentials::from_env().await?;
        Ok(Self::new(config::spotify_apiurl(), credentials))
    }

    /// Overrides the pause between retries of a 502 response.
    pub fn with_bad_gateway_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    /// API root every request path is joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// What the user is listening to right now.
    ///
    /// Needs a user token with the `user-read-currently-playing` scope.
    ///
    /// # Arguments
    ///
    /// * `market` - Optional ISO 3166-1 alpha-2 country code for track relinking
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))` - The current playback state
    /// - `Ok(None)` - Nothing is playing (the API answered 204)
    /// - `Err(CatalogError)` - Request, status or decode failure
    pub async fn currently_playing(
        &self,
        market: Option<&str>,
    ) -> CatalogResult<Option<CurrentlyPlayingResponse>> {
        let mut query = Vec::new();
        if let Some(market) = market {
            query.push(("market", market.to_string()));
        }
        self.get_optional_json("me/player/currently-playing", &query)
            .await
    }

    // Sends an authenticated GET. `Ok(None)` means the catalog answered 204.
    async fn send(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> CatalogResult<Option<Response>> {
        let url = format!("{}/{}", self.base_url, path);
        let mut rate_limited = 0;
        let mut bad_gateway = 0;

        loop {
            let token = self.credentials.get_token().await?;
            debug!(%url, "GET");
            let response = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(token)
                .send()
                .await?;

            match response.status() {
                StatusCode::NO_CONTENT => return Ok(None),
                status if status.is_success() => return Ok(Some(response)),
                StatusCode::TOO_MANY_REQUESTS if rate_limited < MAX_RATE_LIMIT_RETRIES => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after > MAX_RETRY_AFTER_SECS {
                        warn!(
                            retry_after,
                            "rate limit wait is abnormally high, giving up on request"
                        );
                        return Err(status_error(response).await);
                    }
                    rate_limited += 1;
                    debug!(retry_after, "rate limited, waiting");
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY if bad_gateway + 1 < BAD_GATEWAY_ATTEMPTS => {
                    bad_gateway += 1;
                    debug!(attempt = bad_gateway, "bad gateway, retrying");
                    sleep(self.bad_gateway_delay).await;
                }
                _ => return Err(status_error(response).await),
            }
        }
    }

    async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> CatalogResult<Option<T>> {
        match self.send(path, query).await? {
            Some(response) => {
                let body = response.text().await?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> CatalogResult<T> {
        self.get_optional_json(path, query)
            .await?
            .ok_or_else(|| CatalogError::Status {
                status: StatusCode::NO_CONTENT.as_u16(),
                message: format!("no content for {}", path),
            })
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

async fn status_error(response: Response) -> CatalogError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or(body);

    CatalogError::Status {
        status: status.as_u16(),
        message,
    }
}

fn ids_query(ids: &[String]) -> CatalogResult<(&'static str, String)> {
    if ids.len() > MAX_IDS_PER_REQUEST {
        return Err(CatalogError::BatchTooLarge {
            requested: ids.len(),
            max: MAX_IDS_PER_REQUEST,
        });
    }
    Ok(("ids", ids.join(",")))
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn playlist_items(
        &self,
        playlist_id: &str,
        options: &PlaylistItemsOptions,
    ) -> CatalogResult<Page<PlaylistItem>> {
        self.get_json(&format!("playlists/{}/tracks", playlist_id), &options.query())
            .await
    }

    async fn album_tracks(
        &self,
        album_id: &str,
        options: &AlbumTracksOptions,
    ) -> CatalogResult<AlbumTrackPage> {
        self.get_json(&format!("albums/{}/tracks", album_id), &options.query())
            .await
    }

    async fn several_tracks(
        &self,
        ids: &[String],
        market: Option<&str>,
    ) -> CatalogResult<Vec<Option<Track>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = vec![ids_query(ids)?];
        if let Some(market) = market {
            query.push(("market", market.to_string()));
        }
        let response: SeveralTracksResponse = self.get_json("tracks", &query).await?;
        Ok(response.tracks)
    }

    async fn several_artists(&self, ids: &[String]) -> CatalogResult<Vec<Option<Artist>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response: SeveralArtistsResponse = self.get_json("artists", &[ids_query(ids)?]).await?;
        Ok(response.artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_query_rejects_oversized_batches() {
        let ids: Vec<String> = (0..51).map(|i| format!("id{i}")).collect();
        assert!(matches!(
            ids_query(&ids),
            Err(CatalogError::BatchTooLarge {
                requested: 51,
                max: 50
            })
        ));

        let (key, value) = ids_query(&ids[..3]).unwrap();
        assert_eq!(key, "ids");
        assert_eq!(value, "id0,id1,id2");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = SpotifyClient::new(
            "http://localhost:1234/v1/",
            Arc::new(credentials::StaticToken::new("t")),
        );
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }
}
