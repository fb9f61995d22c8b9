//! Document de configuration de SpotDeck
//!
//! Le fichier `settings.json` regroupe les paramètres de connexion Spotify et
//! la liste des bindings de slots. Tous les champs ont une valeur par défaut
//! pour qu'un document partiel reste chargeable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::info;

/// Scope OAuth par défaut (lecture + contrôle de la lecture)
const DEFAULT_SCOPE: &str = "user-read-playback-state user-modify-playback-state";

/// Paramètres de connexion au service Spotify
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpotifySettings {
    /// Client ID de l'application (flow PKCE, pas de secret)
    pub client_id: String,
    /// Hôte d'écoute du callback OAuth
    pub redirect_host: String,
    /// Port d'écoute du callback OAuth
    pub redirect_port: u16,
    /// Chemin du callback OAuth
    pub redirect_path: String,
    /// Scopes OAuth demandés (séparés par des espaces)
    pub scope: String,
    /// Période de rafraîchissement de l'état de lecture (millisecondes)
    pub refresh_interval_ms: u64,
    /// Délai maximal d'attente du code d'autorisation (secondes)
    pub login_timeout_secs: u64,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_host: "127.0.0.1".to_string(),
            redirect_port: 8888,
            redirect_path: "/callback".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            refresh_interval_ms: 700,
            login_timeout_secs: 180,
        }
    }
}

impl SpotifySettings {
    /// URI de redirection complète dérivée des champs host/port/path
    pub fn redirect_uri(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.redirect_host, self.redirect_port, self.redirect_path
        )
    }
}

/// Type de cible jouable associée à un slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BindingType {
    Track,
    Playlist,
    UriList,
}

/// Association slot -> cible jouable, telle que stockée dans le fichier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindingRecord {
    /// Identifiant du slot (entier strictement positif)
    pub slot_id: u32,
    /// Interprétation du champ `uri`
    #[serde(rename = "type")]
    pub binding_type: BindingType,
    /// URI Spotify, ou liste d'URIs séparées par des virgules pour `uri_list`
    pub uri: String,
    /// Nom d'affichage optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Document de configuration complet
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub spotify: SpotifySettings,
    pub bindings: Vec<BindingRecord>,
}

impl Settings {
    /// Charge la configuration depuis un fichier JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Sauvegarde la configuration dans un fichier JSON (indenté)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Charge la configuration depuis l'emplacement standard, en créant un
    /// document par défaut si aucun fichier n'existe encore.
    pub fn load_or_create() -> Result<Self> {
        let path = crate::settings_path()?;
        if !path.exists() {
            info!("No settings file found, writing defaults to {}", path.display());
            let defaults = Settings::default();
            defaults.save(&path)?;
            return Ok(defaults);
        }
        Self::load(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.spotify.redirect_port, 8888);
        assert_eq!(settings.spotify.redirect_path, "/callback");
        assert_eq!(settings.spotify.refresh_interval_ms, 700);
        assert!(settings.bindings.is_empty());
        assert_eq!(
            settings.spotify.redirect_uri(),
            "http://127.0.0.1:8888/callback"
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.spotify.client_id = "abc123".to_string();
        settings.bindings.push(BindingRecord {
            slot_id: 1,
            binding_type: BindingType::Playlist,
            uri: "spotify:playlist:4zqPelMTbUfaSpAKWHux7M".to_string(),
            name: Some("Favoris".to_string()),
        });

        settings.save(&path).unwrap();
        let reloaded = Settings::load(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_partial_document_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "spotify": { "client_id": "xyz" }, "bindings": [
                { "slot_id": 2, "type": "track", "uri": "spotify:track:6woV8uWxn7rcLZxJKYruS1" }
            ] }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.spotify.client_id, "xyz");
        assert_eq!(settings.spotify.redirect_port, 8888);
        assert_eq!(settings.bindings.len(), 1);
        assert_eq!(settings.bindings[0].binding_type, BindingType::Track);
        assert_eq!(settings.bindings[0].name, None);
    }

    #[test]
    fn test_binding_type_wire_format() {
        let record = BindingRecord {
            slot_id: 3,
            binding_type: BindingType::UriList,
            uri: "a,b,c".to_string(),
            name: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""type":"uri_list""#));
    }
}
