//! Couche d'accès bas-niveau à l'API Web Spotify
//!
//! Chaque appel porte le bearer token fourni par l'appelant et traduit les
//! réponses non-2xx en `RemoteService` avec le message d'origine du service.

use crate::error::{Result, SpotifyError};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// URL de base de l'API Web Spotify
const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Enveloppe d'erreur renvoyée par le service
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client HTTP bas-niveau
pub(crate) struct SpotifyApi {
    client: Client,
    base_url: String,
}

impl SpotifyApi {
    pub(crate) fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    pub(crate) fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET avec corps JSON; `None` sur 204 ou corps vide (rien ne joue)
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = check_status(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SpotifyError::RemoteService(format!("invalid response payload: {e}")))
    }

    /// PUT avec corps JSON optionnel, réponse ignorée
    pub(crate) async fn put(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let mut request = self.client.put(&url).bearer_auth(token).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// POST sans corps, réponse ignorée
    pub(crate) async fn post(&self, token: &str, path: &str, query: &[(&str, &str)]) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Traduit une réponse non-2xx en `RemoteService`, message d'origine conservé
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body
            }
        });
    Err(SpotifyError::RemoteService(message))
}
