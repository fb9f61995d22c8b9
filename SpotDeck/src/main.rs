use sdauth::SpotifyAuth;
use sdconfig::Settings;
use sdcore::{Dispatcher, LogReporter, SettingsExt};
use sdinput::{EmitFn, FakeSerialBackend, InputBackend, standard_mapping};
use sdspotify::SpotifyClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ========== PHASE 1 : Configuration ==========

    let settings = Settings::load_or_create()?;
    if settings.spotify.client_id.is_empty() {
        return Err(format!(
            "No Spotify client id configured, set spotify.client_id in {}",
            sdconfig::settings_path()?.display()
        )
        .into());
    }

    let bindings = settings.binding_table()?;
    info!("🎛️ {} slot binding(s) loaded", bindings.len());

    // ========== PHASE 2 : Authentification ==========

    let auth = Arc::new(SpotifyAuth::new(
        settings.spotify.client_id.clone(),
        settings.spotify.redirect_uri(),
        &settings.spotify.scope,
    )?);

    let state = auth.login_state();
    if state.is_logged_in {
        info!("🔓 Already logged in, cached credential found");
    } else {
        if let Some(url) = &state.login_url {
            info!("🔐 Login required: {}", url);
        }
        // Le login tourne en tâche de fond: l'application reste réactive
        // pendant l'aller-retour navigateur
        let login = Arc::clone(&auth);
        let spotify = settings.spotify.clone();
        tokio::spawn(async move {
            match login
                .ensure_automatic_login(
                    &spotify.redirect_host,
                    spotify.redirect_port,
                    &spotify.redirect_path,
                    Duration::from_secs(spotify.login_timeout_secs),
                )
                .await
            {
                Ok(()) => info!("✅ Login completed"),
                Err(e) => error!("Automatic login failed: {}", e),
            }
        });
    }

    // ========== PHASE 3 : Coeur de dispatch ==========

    let client = Arc::new(SpotifyClient::new(Arc::clone(&auth))?);
    let dispatcher = Arc::new(Dispatcher::new(client, Arc::new(LogReporter), bindings));
    let refresh = Arc::clone(&dispatcher)
        .spawn_refresh_task(Duration::from_millis(settings.spotify.refresh_interval_ms));

    // ========== PHASE 4 : Sources d'entrée ==========

    let mut backend =
        FakeSerialBackend::new(standard_mapping(settings.bindings.iter().map(|b| b.slot_id)));

    let emit: EmitFn = {
        let dispatcher = Arc::clone(&dispatcher);
        let handle = tokio::runtime::Handle::current();
        Arc::new(move |action, source: &str| {
            let dispatcher = Arc::clone(&dispatcher);
            let source = source.to_string();
            handle.spawn(async move {
                dispatcher.handle_action(action, &source).await;
            });
        })
    };
    backend.start(emit)?;

    info!("🎧 SpotDeck ready, type PLAY_PAUSE / NEXT / PREV / SLOT_<n> (Ctrl+C to quit)");

    // stdin joue le rôle du port série pendant les tests sur Wayland
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => backend.inject(&line),
                    Ok(None) => {
                        info!("stdin closed, shutting down");
                        break;
                    }
                    Err(e) => {
                        warn!("stdin error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    backend.stop();
    refresh.abort();
    Ok(())
}
