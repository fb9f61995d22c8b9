//! Gestion des erreurs pour le client Spotify

use sdcore::PlayerError;
use thiserror::Error;

/// Type Result personnalisé pour sdspotify
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Erreurs possibles lors des appels à l'API Web Spotify.
///
/// Tout échec remonté par le service distant est ramené à `RemoteService`
/// avec le message d'origine; les deux autres variantes sont des conditions
/// locales que l'appelant doit traiter différemment.
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Aucun credential exploitable; jamais converti en login automatique,
    /// cette décision appartient à l'appelant
    #[error("Not authenticated: no usable credential, log in first")]
    NotAuthenticated,

    /// Le compte n'expose aucun device de lecture
    #[error("No playback device available")]
    NoDeviceAvailable,

    /// Échec du service distant, message d'origine conservé
    #[error("Spotify API error: {0}")]
    RemoteService(String),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(e: reqwest::Error) -> Self {
        SpotifyError::RemoteService(e.to_string())
    }
}

impl From<SpotifyError> for PlayerError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::NotAuthenticated => PlayerError::NotAuthenticated,
            SpotifyError::NoDeviceAvailable => PlayerError::NoDeviceAvailable,
            SpotifyError::RemoteService(message) => PlayerError::RemoteService(message),
        }
    }
}
