//! Client haut-niveau de contrôle de lecture
//!
//! Chaque opération obtient d'abord un token vivant auprès de `sdauth`
//! (`NotAuthenticated` si aucun credential n'est en cache: la décision de
//! relancer un login appartient à l'appelant), puis invoque la primitive
//! distante correspondante.

use crate::api::SpotifyApi;
use crate::error::{Result, SpotifyError};
use crate::models::{Device, DevicesPayload, PlaybackState, TrackInfo};
use async_trait::async_trait;
use sdauth::{AuthError, SpotifyAuth};
use sdcore::{NowPlaying, PlaybackControl, PlayerResult};
use std::sync::Arc;
use tracing::debug;

/// Client de lecture adossé au flow d'authentification PKCE
pub struct SpotifyClient {
    api: SpotifyApi,
    auth: Arc<SpotifyAuth>,
}

impl SpotifyClient {
    pub fn new(auth: Arc<SpotifyAuth>) -> Result<Self> {
        Ok(Self {
            api: SpotifyApi::new()?,
            auth,
        })
    }

    /// Client pointé sur une autre URL de base (tests)
    pub fn with_base_url(auth: Arc<SpotifyAuth>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api: SpotifyApi::with_base_url(base_url)?,
            auth,
        })
    }

    /// Token vivant, rafraîchi au besoin par la couche credential
    async fn bearer(&self) -> Result<String> {
        match self.auth.access_token().await {
            Ok(token) => Ok(token),
            Err(AuthError::NotLoggedIn) => Err(SpotifyError::NotAuthenticated),
            Err(e) => Err(SpotifyError::RemoteService(e.to_string())),
        }
    }

    /// Liste les devices de lecture du compte
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let token = self.bearer().await?;
        let payload: Option<DevicesPayload> =
            self.api.get_json(&token, "/me/player/devices").await?;
        Ok(payload.map(DevicesPayload::into_devices).unwrap_or_default())
    }

    /// Politique de résolution automatique de device, centralisée ici.
    ///
    /// Aucun device -> `NoDeviceAvailable`; sinon le device actif, à défaut
    /// le premier dans l'ordre renvoyé par le service.
    pub async fn pick_device(&self) -> Result<Device> {
        let mut devices = self.list_devices().await?;
        if devices.is_empty() {
            return Err(SpotifyError::NoDeviceAvailable);
        }
        let index = devices.iter().position(|d| d.is_active).unwrap_or(0);
        let device = devices.remove(index);
        debug!("Resolved playback device {} ({})", device.name, device.id);
        Ok(device)
    }

    /// Transfère la lecture vers un device donné
    pub async fn transfer_playback(&self, device_id: &str, force_play: bool) -> Result<()> {
        let token = self.bearer().await?;
        let body = serde_json::json!({ "device_ids": [device_id], "play": force_play });
        self.api.put(&token, "/me/player", &[], Some(&body)).await
    }

    /// Lance la lecture d'une piste sur un device donné
    pub async fn play_track(&self, device_id: &str, uri: &str) -> Result<()> {
        self.start_playback(Some(device_id), serde_json::json!({ "uris": [uri] }))
            .await
    }

    /// Lance la lecture d'une playlist (context URI) sur un device donné
    pub async fn play_playlist(&self, device_id: &str, uri: &str) -> Result<()> {
        self.start_playback(Some(device_id), serde_json::json!({ "context_uri": uri }))
            .await
    }

    /// Lance la lecture d'une liste d'URIs sur un device donné
    pub async fn play_uris(&self, device_id: &str, uris: &[String]) -> Result<()> {
        self.start_playback(Some(device_id), serde_json::json!({ "uris": uris }))
            .await
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Result<()> {
        let token = self.bearer().await?;
        self.api
            .put(&token, "/me/player/pause", &device_query(device_id), None)
            .await
    }

    pub async fn resume(&self, device_id: Option<&str>) -> Result<()> {
        let token = self.bearer().await?;
        self.api
            .put(&token, "/me/player/play", &device_query(device_id), None)
            .await
    }

    /// Variante auto-device de [`SpotifyClient::pause`]
    pub async fn pause_auto(&self) -> Result<()> {
        let device = self.pick_device().await?;
        self.pause(Some(&device.id)).await
    }

    /// Variante auto-device de [`SpotifyClient::resume`]
    pub async fn resume_auto(&self) -> Result<()> {
        let device = self.pick_device().await?;
        self.resume(Some(&device.id)).await
    }

    pub async fn skip_next(&self, device_id: Option<&str>) -> Result<()> {
        let token = self.bearer().await?;
        self.api
            .post(&token, "/me/player/next", &device_query(device_id))
            .await
    }

    pub async fn skip_previous(&self, device_id: Option<&str>) -> Result<()> {
        let token = self.bearer().await?;
        self.api
            .post(&token, "/me/player/previous", &device_query(device_id))
            .await
    }

    /// État de lecture complet, `None` quand aucune session n'est active
    pub async fn current_playback(&self) -> Result<Option<PlaybackState>> {
        let token = self.bearer().await?;
        self.api.get_json(&token, "/me/player").await
    }

    /// Piste en cours, `None` quand rien ne joue
    pub async fn current_song_info(&self) -> Result<Option<TrackInfo>> {
        Ok(self.current_playback().await?.and_then(|state| state.item))
    }

    async fn start_playback(
        &self,
        device_id: Option<&str>,
        body: serde_json::Value,
    ) -> Result<()> {
        let token = self.bearer().await?;
        self.api
            .put(&token, "/me/player/play", &device_query(device_id), Some(&body))
            .await
    }
}

fn device_query(device_id: Option<&str>) -> Vec<(&'static str, &str)> {
    match device_id {
        Some(id) => vec![("device_id", id)],
        None => Vec::new(),
    }
}

/// Les variantes auto-device du contrat de lecture passent toutes par
/// [`SpotifyClient::pick_device`].
#[async_trait]
impl PlaybackControl for SpotifyClient {
    /// Lecture de l'état puis pause-ou-reprise: deux appels distants
    /// distincts, best-effort face aux changements concurrents
    async fn toggle_pause_resume_auto(&self) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        let playing = self
            .current_playback()
            .await?
            .map(|state| state.is_playing)
            .unwrap_or(false);

        if playing {
            self.pause(Some(&device.id)).await?;
        } else {
            self.resume(Some(&device.id)).await?;
        }
        Ok(())
    }

    async fn next_auto(&self) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        self.skip_next(Some(&device.id)).await?;
        Ok(())
    }

    async fn previous_auto(&self) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        self.skip_previous(Some(&device.id)).await?;
        Ok(())
    }

    async fn play_track_auto(&self, uri: &str) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        self.play_track(&device.id, uri).await?;
        Ok(())
    }

    async fn play_playlist_auto(&self, uri: &str) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        self.play_playlist(&device.id, uri).await?;
        Ok(())
    }

    async fn play_uris_auto(&self, uris: &[String]) -> PlayerResult<()> {
        let device = self.pick_device().await?;
        self.play_uris(&device.id, uris).await?;
        Ok(())
    }

    async fn current_song(&self) -> PlayerResult<Option<NowPlaying>> {
        let track = self.current_song_info().await?;
        Ok(track.map(TrackInfo::into_now_playing))
    }
}
