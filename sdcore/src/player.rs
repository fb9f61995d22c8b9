//! Contrat de contrôle de lecture consommé par le dispatcher
//!
//! Le dispatcher ne dépend d'aucun client concret: il ne voit que cette
//! surface, limitée aux variantes `_auto` (résolution de device déléguée à
//! l'implémentation) et à la lecture de l'état courant.

use async_trait::async_trait;
use thiserror::Error;

/// Type Result des opérations de lecture
pub type PlayerResult<T> = std::result::Result<T, PlayerError>;

/// Vocabulaire d'erreur que le dispatcher traduit en texte de statut
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Aucun credential exploitable; l'appelant doit passer par le login
    #[error("Not authenticated: no usable credential, log in first")]
    NotAuthenticated,

    /// Le compte ne présente aucun device de lecture joignable
    #[error("No playback device available")]
    NoDeviceAvailable,

    /// Échec remonté par le service distant, message d'origine conservé
    #[error("Remote service error: {0}")]
    RemoteService(String),
}

/// Image de pochette rapportée par le service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Élément en cours de lecture (instantané par appel, jamais mis en cache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artists: Vec<String>,
    pub album_images: Vec<CoverImage>,
}

impl NowPlaying {
    /// Premier artiste listé par le service
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    /// URL de la plus grande image de pochette disponible.
    ///
    /// Les images sans dimensions passent derrière celles qui en ont.
    pub fn largest_cover(&self) -> Option<&str> {
        self.album_images
            .iter()
            .max_by_key(|image| {
                u64::from(image.width.unwrap_or(0)) * u64::from(image.height.unwrap_or(0))
            })
            .map(|image| image.url.as_str())
    }
}

/// Surface de lecture auto-device requise par le dispatcher
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    /// Lit l'état courant puis met en pause ou reprend (best-effort, les deux
    /// appels distants ne sont pas atomiques)
    async fn toggle_pause_resume_auto(&self) -> PlayerResult<()>;

    async fn next_auto(&self) -> PlayerResult<()>;

    async fn previous_auto(&self) -> PlayerResult<()>;

    async fn play_track_auto(&self, uri: &str) -> PlayerResult<()>;

    async fn play_playlist_auto(&self, uri: &str) -> PlayerResult<()>;

    async fn play_uris_auto(&self, uris: &[String]) -> PlayerResult<()>;

    /// Élément en cours, `None` quand rien ne joue
    async fn current_song(&self) -> PlayerResult<Option<NowPlaying>>;
}
