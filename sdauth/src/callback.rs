//! Listener HTTP éphémère pour le callback OAuth
//!
//! Ressource acquise pour la durée d'une tentative de login: liée à un
//! `host:port`, elle ne répond que sur le chemin de redirection configuré,
//! capture le paramètre `code` de la première requête correspondante, et est
//! systématiquement relâchée avant de rendre la main (succès, timeout ou
//! erreur).

use crate::error::{AuthError, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Délai accordé à l'arrêt gracieux avant d'avorter la tâche serveur
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Page de confirmation renvoyée au navigateur
const CONFIRMATION_BODY: &str = "<h2>Spotify login OK</h2><p>You can close this window.</p>";

type CodeSender = oneshot::Sender<Option<String>>;

#[derive(Clone)]
struct CaptureState {
    tx: Arc<Mutex<Option<CodeSender>>>,
}

/// Listener à usage unique attendant un code d'autorisation
pub struct CallbackListener {
    addr: SocketAddr,
    code_rx: oneshot::Receiver<Option<String>>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CallbackListener {
    /// Lie le listener et démarre le serveur en tâche de fond.
    ///
    /// Seul le chemin `path` répond (HTTP 200 + page de confirmation); toute
    /// autre route renvoie un 404 sans signaler de code. Un port déjà occupé
    /// (autre tentative de login en cours) échoue avec `Listener`.
    pub async fn bind(host: &str, port: u16, path: &str) -> Result<Self> {
        let route_path = normalize_path(path);

        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .map_err(AuthError::Listener)?;
        let addr = listener.local_addr().map_err(AuthError::Listener)?;

        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = CaptureState {
            tx: Arc::new(Mutex::new(Some(code_tx))),
        };
        let app = Router::new()
            .route(&route_path, get(capture))
            .fallback(not_found)
            .with_state(state);

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                warn!("Callback listener terminated with an error: {}", e);
            }
        });

        debug!("Callback listener bound on http://{}{}", addr, route_path);
        Ok(Self {
            addr,
            code_rx,
            shutdown_tx,
            task,
        })
    }

    /// Adresse effectivement liée (utile avec un port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Attend le premier code d'autorisation, au plus `timeout`.
    ///
    /// Consomme le listener; le socket est relâché sur tous les chemins de
    /// sortie avant le retour. Code absent ou vide -> `AuthTimeout`.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String> {
        let Self {
            code_rx,
            shutdown_tx,
            task,
            ..
        } = self;

        let outcome = tokio::time::timeout(timeout, code_rx).await;
        shutdown(shutdown_tx, task).await;

        match outcome {
            Ok(Ok(Some(code))) if !code.is_empty() => Ok(code),
            Ok(Ok(_)) => Err(AuthError::AuthTimeout),
            Ok(Err(_)) => Err(AuthError::AuthTimeout),
            Err(_) => Err(AuthError::AuthTimeout),
        }
    }
}

/// Arrêt du serveur: signal gracieux, puis abort si la tâche s'attarde
async fn shutdown(shutdown_tx: oneshot::Sender<()>, mut task: JoinHandle<()>) {
    let _ = shutdown_tx.send(());
    if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
        task.abort();
        let _ = task.await;
    }
    debug!("Callback listener stopped");
}

async fn capture(
    State(state): State<CaptureState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    let code = params.get("code").cloned();
    // Seule la première requête sur le bon chemin signale un résultat
    if let Some(tx) = state.tx.lock().unwrap().take() {
        let _ = tx.send(code);
    }
    Html(CONFIRMATION_BODY)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
