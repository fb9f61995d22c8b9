//! Tests d'intégration du client de lecture contre un serveur HTTP simulé.

use chrono::{Duration, Utc};
use mockito::Matcher;
use sdauth::{AuthEndpoints, CachedToken, SpotifyAuth, TokenStore};
use sdcore::{PlaybackControl, PlayerError};
use sdspotify::{SpotifyClient, SpotifyError};
use std::sync::Arc;
use tempfile::TempDir;

const SCOPE: &str = "user-read-playback-state user-modify-playback-state";

fn token(expires_in_hours: i64) -> CachedToken {
    CachedToken {
        access_token: "AQ-token".to_string(),
        token_type: "Bearer".to_string(),
        scope: Some(SCOPE.to_string()),
        refresh_token: Some("AQ-refresh".to_string()),
        expires_at: Utc::now() + Duration::hours(expires_in_hours),
    }
}

fn auth_with_token(token_url: &str, cached: Option<CachedToken>) -> (TempDir, Arc<SpotifyAuth>) {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::at_path(dir.path().join("token_cache.json"));
    if let Some(cached) = cached {
        store.save(&cached).unwrap();
    }
    let auth = SpotifyAuth::with_store("client-id", "http://127.0.0.1:8888/callback", SCOPE, store)
        .unwrap()
        .with_endpoints(AuthEndpoints {
            authorize_url: "https://accounts.example.com/authorize".to_string(),
            token_url: token_url.to_string(),
        })
        .open_browser(false);
    (dir, Arc::new(auth))
}

fn logged_in_client(server: &mockito::ServerGuard) -> (TempDir, SpotifyClient) {
    let (dir, auth) = auth_with_token("http://127.0.0.1:1/api/token", Some(token(1)));
    let client = SpotifyClient::with_base_url(auth, server.url()).unwrap();
    (dir, client)
}

const DEVICES_ONE_ACTIVE_LAST: &str = r#"{ "devices": [
    { "id": "dev1", "name": "Desktop", "type": "Computer", "is_active": false, "volume_percent": 80 },
    { "id": "dev2", "name": "Phone", "type": "Smartphone", "is_active": false },
    { "id": "dev3", "name": "Speaker", "type": "Speaker", "is_active": true, "volume_percent": 40 }
] }"#;

const DEVICES_NONE_ACTIVE: &str = r#"{ "devices": [
    { "id": "dev1", "name": "Desktop", "type": "Computer", "is_active": false },
    { "id": "dev2", "name": "Phone", "type": "Smartphone", "is_active": false }
] }"#;

const DEVICES_SINGLE: &str = r#"{ "devices": [
    { "id": "dev1", "name": "Desktop", "type": "Computer", "is_active": true }
] }"#;

#[tokio::test]
async fn list_devices_sends_bearer_and_drops_restricted_devices() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/me/player/devices")
        .match_header("authorization", "Bearer AQ-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{ "devices": [
                { "id": "dev1", "name": "Desktop", "type": "Computer", "is_active": false },
                { "id": null, "name": "Restricted", "type": "Speaker", "is_active": true }
            ] }"#,
        )
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "dev1");
    mock.assert_async().await;
}

#[tokio::test]
async fn pick_device_prefers_the_active_device() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_ONE_ACTIVE_LAST)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    let device = client.pick_device().await.unwrap();

    // Le device actif gagne quelle que soit sa position dans la liste
    assert_eq!(device.id, "dev3");
    assert!(device.is_active);
}

#[tokio::test]
async fn pick_device_falls_back_to_the_first_listed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_NONE_ACTIVE)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    assert_eq!(client.pick_device().await.unwrap().id, "dev1");
}

#[tokio::test]
async fn pick_device_fails_without_devices() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "devices": [] }"#)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    assert!(matches!(
        client.pick_device().await,
        Err(SpotifyError::NoDeviceAvailable)
    ));
}

#[tokio::test]
async fn operations_fail_fast_without_credential() {
    let server = mockito::Server::new_async().await;
    let (_dir, auth) = auth_with_token("http://127.0.0.1:1/api/token", None);
    let client = SpotifyClient::with_base_url(auth, server.url()).unwrap();

    // Jamais converti en login automatique: erreur typée pour l'appelant
    assert!(matches!(
        client.list_devices().await,
        Err(SpotifyError::NotAuthenticated)
    ));
    assert!(matches!(
        client.current_song().await,
        Err(PlayerError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn toggle_pauses_when_something_is_playing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_SINGLE)
        .create_async()
        .await;
    server
        .mock("GET", "/me/player")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "is_playing": true }"#)
        .create_async()
        .await;
    let pause = server
        .mock("PUT", "/me/player/pause")
        .match_query(Matcher::UrlEncoded("device_id".into(), "dev1".into()))
        .with_status(204)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    client.toggle_pause_resume_auto().await.unwrap();
    pause.assert_async().await;
}

#[tokio::test]
async fn toggle_resumes_when_nothing_is_playing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_SINGLE)
        .create_async()
        .await;
    // 204: aucune session de lecture active
    server
        .mock("GET", "/me/player")
        .with_status(204)
        .create_async()
        .await;
    let resume = server
        .mock("PUT", "/me/player/play")
        .match_query(Matcher::UrlEncoded("device_id".into(), "dev1".into()))
        .with_status(204)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    client.toggle_pause_resume_auto().await.unwrap();
    resume.assert_async().await;
}

#[tokio::test]
async fn play_uris_auto_sends_the_uri_array() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_SINGLE)
        .create_async()
        .await;
    let play = server
        .mock("PUT", "/me/player/play")
        .match_query(Matcher::UrlEncoded("device_id".into(), "dev1".into()))
        .match_body(Matcher::Json(serde_json::json!({
            "uris": ["spotify:track:a", "spotify:track:b"]
        })))
        .with_status(204)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    client
        .play_uris_auto(&["spotify:track:a".to_string(), "spotify:track:b".to_string()])
        .await
        .unwrap();
    play.assert_async().await;
}

#[tokio::test]
async fn current_song_maps_to_the_core_model() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "is_playing": true,
                "item": {
                    "name": "Song",
                    "artists": [{ "name": "First" }, { "name": "Second" }],
                    "album": { "images": [
                        { "url": "https://i.scdn.co/image/small", "width": 64, "height": 64 },
                        { "url": "https://i.scdn.co/image/big", "width": 640, "height": 640 }
                    ] }
                }
            }"#,
        )
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    let now = client.current_song().await.unwrap().unwrap();

    assert_eq!(now.title, "Song");
    assert_eq!(now.primary_artist(), Some("First"));
    assert_eq!(now.largest_cover(), Some("https://i.scdn.co/image/big"));
}

#[tokio::test]
async fn current_song_is_none_when_nothing_plays() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player")
        .with_status(204)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    assert_eq!(client.current_song().await.unwrap(), None);
}

#[tokio::test]
async fn remote_errors_carry_the_service_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/player/devices")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "error": { "status": 404, "message": "Device not found" } }"#)
        .create_async()
        .await;

    let (_dir, client) = logged_in_client(&server);
    match client.list_devices().await {
        Err(SpotifyError::RemoteService(message)) => assert_eq!(message, "Device not found"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn expired_token_is_refreshed_transparently() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/token")
        .match_body(Matcher::Regex("grant_type=refresh_token".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "access_token": "AQ-fresh",
                "token_type": "Bearer",
                "expires_in": 3600
            }"#,
        )
        .create_async()
        .await;
    let devices = server
        .mock("GET", "/me/player/devices")
        .match_header("authorization", "Bearer AQ-fresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEVICES_SINGLE)
        .create_async()
        .await;

    // Token expiré en cache, avec refresh token
    let token_url = format!("{}/api/token", server.url());
    let (_dir, auth) = auth_with_token(&token_url, Some(token(-1)));
    let client = SpotifyClient::with_base_url(auth.clone(), server.url()).unwrap();

    let listed = client.list_devices().await.unwrap();
    assert_eq!(listed.len(), 1);
    refresh.assert_async().await;
    devices.assert_async().await;

    // Le token rafraîchi est persisté, l'ancien refresh token conservé
    let cached = auth.store().load().unwrap().unwrap();
    assert_eq!(cached.access_token, "AQ-fresh");
    assert_eq!(cached.refresh_token.as_deref(), Some("AQ-refresh"));
}
