//! Routage des actions abstraites vers le contrôle de lecture
//!
//! Le dispatcher est la frontière d'erreur du coeur: tout échec levé par le
//! contrôle de lecture pendant un dispatch ou un rafraîchissement est rattrapé
//! ici et converti en texte pour le callback d'erreur. Rien ne remonte à
//! l'appelant, ni ne termine le process.

use crate::actions::Action;
use crate::bindings::{Binding, BindingKind, BindingTable};
use crate::player::{PlaybackControl, PlayerResult};
use crate::reporter::Reporter;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use url::Url;

/// Période par défaut du rafraîchissement de l'état de lecture
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(700);

/// État partagé entre les appelants concurrents du dispatcher.
///
/// Unique frontière d'accès exclusif: table de bindings et cache de
/// suppression de pochette vivent sous le même verrou, jamais tenu au-delà
/// d'un await.
struct DispatchState {
    bindings: BindingTable,
    last_cover_url: Option<String>,
}

/// Coeur de routage des commandes
pub struct Dispatcher {
    player: Arc<dyn PlaybackControl>,
    reporter: Arc<dyn Reporter>,
    state: Mutex<DispatchState>,
}

impl Dispatcher {
    pub fn new(
        player: Arc<dyn PlaybackControl>,
        reporter: Arc<dyn Reporter>,
        bindings: BindingTable,
    ) -> Self {
        Self {
            player,
            reporter,
            state: Mutex::new(DispatchState {
                bindings,
                last_cover_url: None,
            }),
        }
    }

    /// Route une action vers le contrôle de lecture.
    ///
    /// Un slot sans binding rapporte une erreur sans toucher au client; tout
    /// échec distant est rapporté via le callback d'erreur.
    pub async fn handle_action(&self, action: Action, source: &str) {
        debug!("Action {} received from {}", action, source);
        self.reporter
            .set_status(&format!("Action: {action} (from {source})"));

        let result = match action {
            Action::PlayPause => self.player.toggle_pause_resume_auto().await,
            Action::Next => self.player.next_auto().await,
            Action::Previous => self.player.previous_auto().await,
            Action::Slot(slot) => {
                // Instantané sous verrou; le dispatch en cours garde sa copie
                // même si la table est remplacée entre-temps
                let binding = self.state.lock().unwrap().bindings.get(slot).cloned();
                match binding {
                    None => {
                        self.reporter.set_error(&format!("No binding for slot {slot}"));
                        return;
                    }
                    Some(binding) => self.play_binding(&binding).await,
                }
            }
        };

        if let Err(e) = result {
            self.reporter.set_error(&e.to_string());
        }
    }

    async fn play_binding(&self, binding: &Binding) -> PlayerResult<()> {
        match binding.kind() {
            BindingKind::Track => self.player.play_track_auto(binding.target()).await,
            BindingKind::Playlist => self.player.play_playlist_auto(binding.target()).await,
            BindingKind::UriList => self.player.play_uris_auto(&binding.uri_list()).await,
        }
    }

    /// Rafraîchit la ligne de statut et la pochette.
    ///
    /// Chaque cycle est indépendant: un échec saute la mise à jour du tick et
    /// réessaie au suivant.
    pub async fn refresh_playback(&self) {
        let song = match self.player.current_song().await {
            Ok(song) => song,
            Err(e) => {
                self.reporter.set_error(&e.to_string());
                return;
            }
        };

        let Some(now) = song else {
            return;
        };

        let status = match now.primary_artist() {
            Some(artist) => format!("{} - {}", now.title, artist),
            None => now.title.clone(),
        };
        self.reporter.set_status(&status);

        if let Some(cover) = now.largest_cover() {
            self.emit_cover_if_new(cover);
        }
    }

    /// Remplace la table de bindings pour tous les dispatchs suivants
    pub fn update_bindings(&self, bindings: BindingTable) {
        debug!("Binding table replaced ({} slots)", bindings.len());
        self.state.lock().unwrap().bindings = bindings;
    }

    /// Lance la boucle périodique de rafraîchissement
    pub fn spawn_refresh_task(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        let dispatcher = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                dispatcher.refresh_playback().await;
            }
        })
    }

    /// N'émet la pochette que si l'URL est exploitable et nouvelle
    fn emit_cover_if_new(&self, cover_url: &str) {
        if !is_valid_cover_url(cover_url) {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            if state.last_cover_url.as_deref() == Some(cover_url) {
                return;
            }
            state.last_cover_url = Some(cover_url.to_string());
        }
        self.reporter.set_cover_url(cover_url);
    }
}

/// Une URL de pochette doit être bien formée et en http(s)
fn is_valid_cover_url(cover_url: &str) -> bool {
    match Url::parse(cover_url) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
