//! Modèles des payloads de l'API Web Spotify

use sdcore::{CoverImage, NowPlaying};
use serde::Deserialize;

/// Device de lecture rapporté par le service.
///
/// Instantané par appel: l'activité d'un device change hors de notre
/// contrôle, la liste n'est jamais mise en cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Type rapporté par le service (`Computer`, `Smartphone`, ...)
    pub kind: String,
    pub is_active: bool,
    pub volume_percent: Option<u8>,
}

/// Payload brut de l'endpoint des devices
#[derive(Debug, Deserialize)]
pub(crate) struct DevicesPayload {
    #[serde(default)]
    devices: Vec<DevicePayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DevicePayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    volume_percent: Option<u8>,
}

impl DevicesPayload {
    /// Les devices sans identifiant (restreints) sont inutilisables: éliminés
    pub(crate) fn into_devices(self) -> Vec<Device> {
        self.devices
            .into_iter()
            .filter_map(|d| {
                d.id.map(|id| Device {
                    id,
                    name: d.name,
                    kind: d.kind,
                    is_active: d.is_active,
                    volume_percent: d.volume_percent,
                })
            })
            .collect()
    }
}

/// État de lecture courant (`GET /me/player`)
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackState {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<TrackInfo>,
}

/// Piste en cours de lecture
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrackInfo {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Album {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl TrackInfo {
    /// Projette la piste sur le modèle du coeur
    pub fn into_now_playing(self) -> NowPlaying {
        NowPlaying {
            title: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album_images: self
                .album
                .map(|album| {
                    album
                        .images
                        .into_iter()
                        .map(|image| CoverImage {
                            url: image.url,
                            width: image.width,
                            height: image.height,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devices_without_id_are_dropped() {
        let payload: DevicesPayload = serde_json::from_str(
            r#"{ "devices": [
                { "id": "dev1", "name": "Desktop", "type": "Computer", "is_active": false, "volume_percent": 80 },
                { "id": null, "name": "Restricted", "type": "Speaker", "is_active": true }
            ] }"#,
        )
        .unwrap();

        let devices = payload.into_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "dev1");
        assert_eq!(devices[0].volume_percent, Some(80));
    }

    #[test]
    fn test_track_into_now_playing() {
        let track: TrackInfo = serde_json::from_str(
            r#"{
                "name": "Song",
                "artists": [{ "name": "First" }, { "name": "Second" }],
                "album": { "images": [
                    { "url": "https://i.scdn.co/image/big", "width": 640, "height": 640 },
                    { "url": "https://i.scdn.co/image/small", "width": 64, "height": 64 }
                ] }
            }"#,
        )
        .unwrap();

        let now = track.into_now_playing();
        assert_eq!(now.title, "Song");
        assert_eq!(now.primary_artist(), Some("First"));
        assert_eq!(now.largest_cover(), Some("https://i.scdn.co/image/big"));
    }
}
