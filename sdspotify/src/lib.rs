//! # sdspotify - Client de lecture pour l'API Web Spotify
//!
//! Wrapper fin et fail-fast au-dessus des primitives de lecture du service:
//! liste des devices, lancement de piste/playlist/liste d'URIs, pause,
//! reprise, sauts, état courant. Chaque opération obtient son credential
//! auprès de [`sdauth`] et traduit les échecs distants en une seule erreur
//! `RemoteService` portant le message d'origine.
//!
//! La résolution automatique de device (le device actif, à défaut le premier
//! listé) est centralisée dans [`SpotifyClient::pick_device`]; les variantes
//! `_auto` exposées via le trait [`sdcore::PlaybackControl`] s'appuient
//! toutes dessus.
//!
//! ## Exemple
//!
//! ```no_run
//! use sdauth::SpotifyAuth;
//! use sdspotify::SpotifyClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = Arc::new(SpotifyAuth::new(
//!         "client-id",
//!         "http://127.0.0.1:8888/callback",
//!         "user-read-playback-state user-modify-playback-state",
//!     )?);
//!     let client = SpotifyClient::new(auth)?;
//!
//!     for device in client.list_devices().await? {
//!         println!("{} ({})", device.name, device.kind);
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod error;
mod models;

pub use client::SpotifyClient;
pub use error::{Result, SpotifyError};
pub use models::{Album, Artist, Device, Image, PlaybackState, TrackInfo};
