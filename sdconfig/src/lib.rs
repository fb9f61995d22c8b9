//! # SpotDeck Configuration Module
//!
//! This module provides configuration management for SpotDeck, including:
//! - Loading the settings document from a JSON file
//! - Creating a default settings file on first run
//! - Environment variable override for the configuration directory
//! - Typed access to the Spotify connection parameters and slot bindings
//!
//! ## Usage
//!
//! ```no_run
//! use sdconfig::Settings;
//!
//! let settings = Settings::load_or_create()?;
//! println!("client id: {}", settings.spotify.client_id);
//! for binding in &settings.bindings {
//!     println!("slot {} -> {}", binding.slot_id, binding.uri);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use std::{env, fs, path::Path, path::PathBuf};
use tracing::info;

mod settings;

pub use settings::{BindingRecord, BindingType, Settings, SpotifySettings};

/// Variable d'environnement pour surcharger le répertoire de configuration
pub const ENV_CONFIG_DIR: &str = "SPOTDECK_CONFIG";

/// Nom du fichier de configuration
pub const SETTINGS_FILE: &str = "settings.json";

/// Résout le répertoire de configuration de SpotDeck.
///
/// Ordre de résolution :
/// 1. `$SPOTDECK_CONFIG` si défini
/// 2. `.spotdeck` dans le répertoire personnel de l'utilisateur
///
/// Le répertoire est créé s'il n'existe pas encore.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match env::var(ENV_CONFIG_DIR) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => home_dir()
            .ok_or_else(|| anyhow!("Cannot determine the user home directory"))?
            .join(".spotdeck"),
    };

    validate_config_dir(&dir)?;
    Ok(dir)
}

/// Chemin complet du fichier de configuration
pub fn settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

fn validate_config_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        info!("Creating configuration directory {}", path.display());
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create config directory {}", path.display()))?;
    }
    if !path.is_dir() {
        return Err(anyhow!("{} exists but is not a directory", path.display()));
    }
    Ok(())
}
