//! Flow de login PKCE contre le service de comptes Spotify
//!
//! `SpotifyAuth` possède l'échange code/token, le listener de callback
//! éphémère et l'état de login. Il ne rattrape aucune de ses propres erreurs:
//! elles remontent au code de démarrage, qui décide de réessayer ou non.

use crate::callback::CallbackListener;
use crate::error::{AuthError, Result};
use crate::pkce::PkcePair;
use crate::token::{CachedToken, TokenResponse, TokenStore};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Endpoint d'autorisation par défaut
const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Endpoint d'échange de tokens par défaut
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Nom d'application utilisé pour le répertoire de cache
const APP_NAME: &str = "spotdeck";

/// État de login rapporté à la couche de présentation.
///
/// Jamais persisté; recalculé à la demande à partir du cache de token.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginState {
    pub is_logged_in: bool,
    /// URL à ouvrir par l'utilisateur quand il n'est pas connecté
    pub login_url: Option<String>,
    /// Cause lisible de l'état déconnecté
    pub reason: Option<String>,
}

/// Endpoints du service de comptes (surchargeables pour les tests)
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Flow d'authentification PKCE avec cache de token persistant
pub struct SpotifyAuth {
    client_id: String,
    redirect_uri: String,
    scope: String,
    endpoints: AuthEndpoints,
    store: TokenStore,
    http: reqwest::Client,
    pkce: PkcePair,
    open_browser: bool,
}

impl SpotifyAuth {
    /// Crée le flow avec le cache de token à l'emplacement standard
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: &str,
    ) -> Result<Self> {
        let store = TokenStore::new(APP_NAME)?;
        Self::with_store(client_id, redirect_uri, scope, store)
    }

    /// Crée le flow avec un cache de token explicite
    pub fn with_store(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: &str,
        store: TokenStore,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: normalize_scope(scope),
            endpoints: AuthEndpoints::default(),
            store,
            http,
            // La même paire sert à l'URL d'autorisation et à l'échange
            pkce: PkcePair::generate(),
            open_browser: true,
        })
    }

    /// Remplace les endpoints du service de comptes (tests)
    pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Contrôle l'ouverture automatique du navigateur
    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// URL d'autorisation PKCE à ouvrir dans le navigateur
    pub fn authorize_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", self.pkce.challenge())
            .finish();
        format!("{}?{}", self.endpoints.authorize_url, query)
    }

    /// État de login courant, sans validation réseau.
    ///
    /// Un token en cache suffit à se déclarer connecté; sa fraîcheur est
    /// gérée par [`SpotifyAuth::access_token`].
    pub fn login_state(&self) -> LoginState {
        match self.store.load() {
            Ok(Some(_)) => LoginState {
                is_logged_in: true,
                login_url: None,
                reason: None,
            },
            Ok(None) => LoginState {
                is_logged_in: false,
                login_url: Some(self.authorize_url()),
                reason: Some("No cached token found.".to_string()),
            },
            Err(e) => LoginState {
                is_logged_in: false,
                login_url: Some(self.authorize_url()),
                reason: Some(format!("Token cache unreadable: {e}")),
            },
        }
    }

    /// Login automatique: capture le code d'autorisation sur un listener
    /// local pendant que l'utilisateur valide dans son navigateur.
    ///
    /// No-op si un token est déjà en cache. Bloque l'appelant (et seulement
    /// lui) jusqu'à réception du code ou expiration de `timeout`; le listener
    /// est relâché sur tous les chemins de sortie. Un seul listener peut être
    /// actif à la fois: une deuxième tentative sur le même port échoue au
    /// bind.
    pub async fn ensure_automatic_login(
        &self,
        host: &str,
        port: u16,
        path: &str,
        timeout: Duration,
    ) -> Result<()> {
        if self.store.load()?.is_some() {
            debug!("Token already cached, skipping automatic login");
            return Ok(());
        }

        let listener = CallbackListener::bind(host, port, path).await?;
        let login_url = self.authorize_url();

        info!(
            "Waiting for the authorization callback on http://{}{}",
            listener.local_addr(),
            path
        );

        if self.open_browser {
            if let Err(e) = webbrowser::open(&login_url) {
                warn!("Failed to open the browser automatically: {}", e);
                info!("Open this URL manually: {}", login_url);
            }
        } else {
            info!("Login URL: {}", login_url);
        }

        let code = listener.wait_for_code(timeout).await?;
        let token = self.exchange_code(&code).await?;
        self.store.save(&token)?;

        info!("Login successful, token cached at {}", self.store.path().display());
        Ok(())
    }

    /// Login manuel: l'utilisateur colle l'URL de redirection complète.
    ///
    /// Même échange et même persistance que le chemin automatique.
    pub async fn finish_login_manual(&self, redirected_url: &str) -> Result<()> {
        let redirected_url = redirected_url.trim();
        if redirected_url.is_empty() {
            return Err(AuthError::InvalidRedirectUrl(
                "redirected URL is empty".to_string(),
            ));
        }

        let code = parse_response_code(redirected_url)?;
        let token = self.exchange_code(&code).await?;
        self.store.save(&token)?;

        info!("Manual login successful");
        Ok(())
    }

    /// Déconnexion: supprime le token en cache (idempotent)
    pub fn logout(&self) -> Result<()> {
        info!("Logging out, deleting cached token");
        self.store.clear()
    }

    /// Renvoie un access token utilisable, en le rafraîchissant au besoin.
    ///
    /// Ne déclenche jamais de login: sans credential exploitable, l'appelant
    /// reçoit `NotLoggedIn` et décide de la suite.
    pub async fn access_token(&self) -> Result<String> {
        let Some(token) = self.store.load()? else {
            return Err(AuthError::NotLoggedIn);
        };

        if !token.is_expired() {
            return Ok(token.access_token);
        }

        let Some(refresh) = token.refresh_token.clone() else {
            warn!("Cached token expired and no refresh token is available");
            return Err(AuthError::NotLoggedIn);
        };

        debug!("Cached token expired, refreshing");
        let refreshed = self.refresh_token(&refresh).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed.access_token)
    }

    async fn exchange_code(&self, code: &str) -> Result<CachedToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", self.pkce.verifier()),
        ];
        self.token_request(&params, None).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<CachedToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        self.token_request(&params, Some(refresh_token.to_string()))
            .await
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        fallback_refresh: Option<String>,
    ) -> Result<CachedToken> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }

        let payload: TokenResponse = response.json().await?;
        Ok(payload.into_cached(fallback_refresh))
    }
}

/// Extrait le paramètre `code` d'une URL de redirection
fn parse_response_code(redirected: &str) -> Result<String> {
    let url =
        Url::parse(redirected).map_err(|e| AuthError::InvalidRedirectUrl(e.to_string()))?;
    let code = url
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned());

    match code {
        Some(code) if !code.is_empty() => Ok(code),
        _ => Err(AuthError::InvalidRedirectUrl(
            "no authorization code in the redirected URL".to_string(),
        )),
    }
}

/// Normalise la liste de scopes: virgules tolérées, espaces multiples réduits
fn normalize_scope(scope: &str) -> String {
    scope
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
