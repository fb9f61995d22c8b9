//! Gestion des erreurs pour le flow d'authentification

use thiserror::Error;

/// Type Result personnalisé pour sdauth
pub type Result<T> = std::result::Result<T, AuthError>;

/// Erreurs possibles lors du login et de la gestion du token
#[derive(Error, Debug)]
pub enum AuthError {
    /// Aucun code d'autorisation reçu avant l'expiration du délai
    #[error("Login timeout: no authorization code received")]
    AuthTimeout,

    /// URL de redirection vide ou sans paramètre `code` exploitable
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirectUrl(String),

    /// Aucun token en cache (l'appelant doit relancer un login)
    #[error("Not logged in: no cached token found")]
    NotLoggedIn,

    /// Le serveur de tokens a refusé l'échange
    #[error("Token exchange failed (HTTP {status}): {message}")]
    TokenExchange { status: u16, message: String },

    /// Échec de lecture/écriture/suppression du cache de token
    #[error("Token cache error: {0}")]
    CacheWrite(#[source] std::io::Error),

    /// Le listener de callback n'a pas pu être démarré
    #[error("Callback listener error: {0}")]
    Listener(#[source] std::io::Error),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur d'encodage JSON du cache
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
