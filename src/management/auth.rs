use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{config, error::CatalogError, spotify::CredentialProvider, types::Token};

/// A user token cached on disk, refreshed through the token endpoint when it
/// is about to expire.
///
/// The cache file lives at `<data_local_dir>/spotseed/cache/token.json`:
/// - Linux: `~/.local/share/spotseed/cache/token.json`
/// - macOS: `~/Library/Application Support/spotseed/cache/token.json`
/// - Windows: `%LOCALAPPDATA%/spotseed/cache/token.json`
///
/// A token is treated as expired four minutes before its real expiry. A
/// refreshed token replaces the cached one in memory and on disk.
pub struct TokenManager {
    token: Mutex<Token>,
    path: PathBuf,
    http: Client,
}

// Refresh responses may omit the refresh token and scope; the old ones stay valid then.
#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl TokenManager {
    /// Manages `token`, persisting it to the default cache file.
    pub fn new(token: Token) -> Self {
        Self::with_path(token, Self::token_path())
    }

    /// Manages `token`, persisting it to `path` instead of the default cache file.
    pub fn with_path(token: Token, path: PathBuf) -> Self {
        TokenManager {
            token: Mutex::new(token),
            path,
            http: Client::new(),
        }
    }

    /// Loads the token from the default cache file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Credentials`] when the file cannot be read and
    /// [`CatalogError::Decode`] when it does not hold a token.
    ///
    /// # Example
    ///
    /// ```
    /// let manager = TokenManager::load().await?;
    /// let access_token = manager.get_token().await?;
    /// ```
    pub async fn load() -> Result<Self, CatalogError> {
        Self::load_from(Self::token_path()).await
    }

    /// Loads the token from `path`; later refreshes are written back there.
    pub async fn load_from(path: PathBuf) -> Result<Self, CatalogError> {
        let content = async_fs::read_to_string(&path).await.map_err(|e| {
            CatalogError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self::with_path(token, path))
    }

    /// Writes the current token to the cache file, creating missing directories.
    pub async fn persist(&self) -> Result<(), CatalogError> {
        let token = self.token.lock().await.clone();
        self.write(&token).await
    }

    async fn write(&self, token: &Token) -> Result<(), CatalogError> {
        let io_error =
            |e: std::io::Error| CatalogError::Credentials(format!("cannot write token: {}", e));

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await.map_err(io_error)
    }

    /// Copy of the token as it stands, without refreshing it.
    pub async fn current_token(&self) -> Token {
        self.token.lock().await.clone()
    }

    async fn refresh(&self, current: &Token) -> Result<Token, CatalogError> {
        if current.refresh_token.is_empty() {
            return Err(CatalogError::Credentials(
                "cached token expired and has no refresh token".to_string(),
            ));
        }

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", current.refresh_token.clone()),
        ];
        if let Ok(client_id) = config::spotify_client_id() {
            form.push(("client_id", client_id));
        }

        let response = self
            .http
            .post(config::spotify_apitoken_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body)?;
        Ok(Token {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
            scope: refreshed.scope.unwrap_or_else(|| current.scope.clone()),
            expires_in: refreshed.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache").join("token.json")
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn get_token(&self) -> Result<String, CatalogError> {
        let mut token = self.token.lock().await;
        let now = Utc::now().timestamp() as u64;
        if !token.is_stale_at(now) {
            return Ok(token.access_token.clone());
        }

        debug!("cached token is about to expire, refreshing");
        let refreshed = self.refresh(&token).await?;
        if let Err(e) = self.write(&refreshed).await {
            warn!("refreshed token not persisted: {}", e);
        }
        *token = refreshed;
        Ok(token.access_token.clone())
    }
}
