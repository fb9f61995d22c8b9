//! # sdcore - Coeur de routage des commandes de SpotDeck
//!
//! Cette crate contient tout ce qui ne dépend ni d'un service distant concret
//! ni d'une couche de présentation:
//!
//! - [`Action`]: les actions abstraites émises par les sources d'entrée
//! - [`BindingTable`]: la table slot -> cible jouable, remplacée en bloc
//! - [`PlaybackControl`]: le contrat de lecture auto-device que le client
//!   Spotify implémente
//! - [`Reporter`]: les trois callbacks de remontée (statut, erreur, pochette)
//! - [`Dispatcher`]: le routeur, frontière d'erreur unique du coeur
//!
//! ## Exemple
//!
//! ```no_run
//! use sdcore::{Action, BindingTable, Dispatcher, LogReporter};
//! use std::sync::Arc;
//!
//! # async fn example(player: Arc<dyn sdcore::PlaybackControl>) {
//! let dispatcher = Arc::new(Dispatcher::new(
//!     player,
//!     Arc::new(LogReporter),
//!     BindingTable::new(),
//! ));
//!
//! // Boucle périodique de statut/pochette
//! let refresh = Arc::clone(&dispatcher).spawn_refresh_task(sdcore::DEFAULT_REFRESH_INTERVAL);
//!
//! dispatcher.handle_action(Action::PlayPause, "ui").await;
//! # refresh.abort();
//! # }
//! ```

mod actions;
mod bindings;
mod config_ext;
mod dispatcher;
mod error;
mod player;
mod reporter;

pub use actions::Action;
pub use bindings::{Binding, BindingKind, BindingTable};
pub use config_ext::SettingsExt;
pub use dispatcher::{DEFAULT_REFRESH_INTERVAL, Dispatcher};
pub use error::CoreError;
pub use player::{CoverImage, NowPlaying, PlaybackControl, PlayerError, PlayerResult};
pub use reporter::{LogReporter, Reporter};
