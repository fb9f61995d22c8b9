//! # sdauth - Login PKCE et cache de token pour SpotDeck
//!
//! Cette crate possède tout le flow d'authentification de SpotDeck:
//!
//! - Génération de la paire PKCE (verifier + challenge S256)
//! - Listener HTTP éphémère capturant le code d'autorisation en local
//! - Échange du code contre un token et refresh transparent
//! - Persistance du credential dans le cache applicatif
//!
//! ## Flow typique
//!
//! ```no_run
//! use sdauth::SpotifyAuth;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sdauth::AuthError> {
//!     let auth = SpotifyAuth::new(
//!         "client-id",
//!         "http://127.0.0.1:8888/callback",
//!         "user-read-playback-state user-modify-playback-state",
//!     )?;
//!
//!     let state = auth.login_state();
//!     if !state.is_logged_in {
//!         // Ouvre le navigateur et attend le callback local
//!         auth.ensure_automatic_login(
//!             "127.0.0.1",
//!             8888,
//!             "/callback",
//!             Duration::from_secs(180),
//!         )
//!         .await?;
//!     }
//!
//!     let token = auth.access_token().await?;
//!     println!("access token: {token}");
//!     Ok(())
//! }
//! ```

mod auth;
mod callback;
mod error;
mod pkce;
mod token;

pub use auth::{AuthEndpoints, LoginState, SpotifyAuth};
pub use callback::CallbackListener;
pub use error::{AuthError, Result};
pub use pkce::PkcePair;
pub use token::{CachedToken, TokenStore};
