//! Cache de token persistant
//!
//! Un seul fichier JSON opaque dans le répertoire de cache utilisateur.
//! Créé au premier échange de code réussi, relu à chaque opération du client
//! de lecture, supprimé en bloc au logout.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marge de sécurité avant l'expiration réelle du token
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Nom du fichier de cache
const CACHE_FILE: &str = "token_cache.json";

/// Credential persisté avec ses métadonnées d'expiration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Le token est considéré expiré un peu avant sa fin de vie réelle
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Réponse brute de l'endpoint de tokens
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    token_type: String,
    #[serde(default)]
    scope: Option<String>,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Convertit la réponse en token persistable.
    ///
    /// Un refresh ne renvoie pas toujours de nouveau refresh token : on
    /// conserve alors l'ancien.
    pub(crate) fn into_cached(self, fallback_refresh: Option<String>) -> CachedToken {
        CachedToken {
            access_token: self.access_token,
            token_type: self.token_type,
            scope: self.scope,
            refresh_token: self.refresh_token.or(fallback_refresh),
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

/// Persistance du credential dans le cache applicatif
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store au chemin standard `<cache_dir>/<app_name>/token_cache.json`
    pub fn new(app_name: &str) -> Result<Self> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| {
                AuthError::CacheWrite(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no user cache directory",
                ))
            })?
            .join(app_name);
        Ok(Self {
            path: dir.join(CACHE_FILE),
        })
    }

    /// Store à un chemin explicite (tests, intégration)
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relit le token en cache.
    ///
    /// Fichier absent ou illisible -> `Ok(None)` : un cache corrompu équivaut
    /// à une session déconnectée, pas à une erreur fatale.
    pub fn load(&self) -> Result<Option<CachedToken>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::CacheWrite(e)),
        };
        match serde_json::from_str(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable token cache {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Écrit le token, en créant le répertoire parent au besoin
    pub fn save(&self, token: &CachedToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(AuthError::CacheWrite)?;
        }
        let raw = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, raw).map_err(AuthError::CacheWrite)?;
        debug!("Token cached at {}", self.path.display());
        Ok(())
    }

    /// Supprime le token en cache. Idempotent: un fichier déjà absent n'est
    /// pas une erreur.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Token cache {} deleted", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::CacheWrite(e)),
        }
    }
}
