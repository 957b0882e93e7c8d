//! Bearer credentials for catalog requests.
//!
//! The client asks a [`CredentialProvider`] for a token before every request
//! and never caches it itself, so providers are free to renew tokens between
//! calls.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    config,
    error::{CatalogError, ConfigError},
    management::TokenManager,
    types::Token,
};

/// Source of bearer tokens for the catalog client.
///
/// Implementations decide where tokens come from and when they are renewed.
/// The client only ever calls [`get_token`](Self::get_token).
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A bearer token valid for at least the next request.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when no token can be produced, for example when
    /// the token endpoint rejects the client credentials.
    async fn get_token(&self) -> Result<String, CatalogError>;
}

/// A fixed token, e.g. from `SPOTIFY_ACCESS_TOKEN`. Never renewed.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps `token` as is. An empty token is only rejected once it is requested.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn get_token(&self) -> Result<String, CatalogError> {
        if self.0.is_empty() {
            return Err(CatalogError::Credentials("empty access token".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Client-credentials grant. The token lives in memory only.
///
/// Tokens from this grant carry no user context, which is enough for the
/// catalog endpoints the pipeline uses but not for playback state. A token is
/// requested on first use and renewed once it comes within four minutes of
/// expiring.
pub struct ClientCredentials {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<Token>>,
}

impl ClientCredentials {
    /// Creates a provider that posts to `token_url` with HTTP basic auth.
    ///
    /// # Arguments
    ///
    /// * `token_url` - Accounts service token endpoint
    /// * `client_id` - Application client id
    /// * `client_secret` - Application client secret
    ///
    /// # Example
    ///
    /// ```
    /// let provider = ClientCredentials::new(
    ///     "https://accounts.spotify.com/api/token",
    ///     config::spotify_client_id()?,
    ///     config::spotify_client_secret()?,
    /// );
    /// let token = provider.get_token().await?;
    /// ```
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<Token, CatalogError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
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

        let mut token: Token = serde_json::from_str(&body)?;
        token.obtained_at = Utc::now().timestamp() as u64;
        Ok(token)
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentials {
    async fn get_token(&self) -> Result<String, CatalogError> {
        let mut slot = self.token.lock().await;
        let now = Utc::now().timestamp() as u64;

        if let Some(token) = slot.as_ref() {
            if !token.is_stale_at(now) {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting client-credentials token");
        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }
}

/// Picks a provider from the environment.
///
/// A token in `SPOTIFY_ACCESS_TOKEN` wins, then a cached token file, then the
/// client-credentials grant with the configured client id and secret.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when falling through to the
/// client-credentials grant without `SPOTIFY_CLIENT_ID` or
/// `SPOTIFY_CLIENT_SECRET` set.
pub async fn from_env() -> Result<Arc<dyn CredentialProvider>, ConfigError> {
    if let Some(token) = config::spotify_access_token() {
        debug!("using access token from environment");
        return Ok(Arc::new(StaticToken::new(token)));
    }

    match TokenManager::load().await {
        Ok(manager) => {
            debug!("using cached token");
            return Ok(Arc::new(manager));
        }
        Err(e) => debug!("no usable cached token: {}", e),
    }

    Ok(Arc::new(ClientCredentials::new(
        config::spotify_apitoken_url(),
        config::spotify_client_id()?,
        config::spotify_client_secret()?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_verbatim() {
        let provider = StaticToken::new("BQC-token");
        assert_eq!(provider.get_token().await.unwrap(), "BQC-token");
    }

    #[tokio::test]
    async fn empty_static_token_is_rejected() {
        let provider = StaticToken::new("");
        assert!(matches!(
            provider.get_token().await,
            Err(CatalogError::Credentials(_))
        ));
    }
}
