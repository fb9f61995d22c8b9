//! # sdinput - Sources d'entrée de SpotDeck
//!
//! Contrat des backends d'entrée (hotkeys, série, UI) et backend série
//! simulé. Un backend traduit ses événements physiques en [`Action`]
//! abstraites et les émet vers le coeur avec un label de source; il ne sait
//! rien du dispatcher ni du service de lecture.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use sdcore::Action;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Label de source du backend série simulé
const FAKE_SERIAL_SOURCE: &str = "fake_serial";

/// Période de polling du worker (borne le délai de prise en compte du stop)
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Callback d'émission vers le coeur; peut être appelé depuis le thread du
/// backend
pub type EmitFn = Arc<dyn Fn(Action, &str) + Send + Sync>;

/// Erreurs du cycle de vie d'un backend
#[derive(Error, Debug)]
pub enum InputError {
    /// L'environnement courant ne permet pas ce backend
    #[error("Input backend not supported in this environment")]
    Unsupported,

    /// `start` appelé deux fois sans `stop` intermédiaire
    #[error("Input backend already started")]
    AlreadyStarted,
}

/// Contrat minimal d'une source d'entrée
pub trait InputBackend {
    fn is_supported(&self) -> bool;

    fn start(&mut self, emit: EmitFn) -> Result<(), InputError>;

    fn stop(&mut self);
}

/// Table de correspondance standard ligne -> action.
///
/// `PLAY_PAUSE`, `NEXT`, `PREV`, plus `SLOT_<n>` pour chaque slot fourni.
pub fn standard_mapping(slots: impl IntoIterator<Item = u32>) -> HashMap<String, Action> {
    let mut mapping = HashMap::from([
        ("PLAY_PAUSE".to_string(), Action::PlayPause),
        ("NEXT".to_string(), Action::Next),
        ("PREV".to_string(), Action::Previous),
    ]);
    for slot in slots {
        mapping.insert(format!("SLOT_{slot}"), Action::Slot(slot));
    }
    mapping
}

/// Simule un périphérique série.
///
/// Les lignes injectées via [`FakeSerialBackend::inject`] sont drainées par
/// un worker dédié, traduites par la table de correspondance et émises avec
/// le label `fake_serial`. Les lignes inconnues sont ignorées.
pub struct FakeSerialBackend {
    mapping: HashMap<String, Action>,
    tx: Sender<String>,
    rx: Receiver<String>,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FakeSerialBackend {
    pub fn new(mapping: HashMap<String, Action>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            mapping,
            tx,
            rx,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Simule la réception d'une ligne sur le port série
    pub fn inject(&self, line: &str) {
        let _ = self.tx.send(line.to_string());
    }
}

impl InputBackend for FakeSerialBackend {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, emit: EmitFn) -> Result<(), InputError> {
        if self.worker.is_some() {
            return Err(InputError::AlreadyStarted);
        }

        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);
        let mapping = self.mapping.clone();
        let rx = self.rx.clone();

        self.worker = Some(std::thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(line) => {
                        let line = line.trim();
                        match mapping.get(line) {
                            Some(action) => emit(*action, FAKE_SERIAL_SOURCE),
                            None if line.is_empty() => {}
                            None => debug!("Ignoring unmapped input line '{}'", line),
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }));
        Ok(())
    }

    /// Idempotent; joint le worker avant de rendre la main
    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for FakeSerialBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_emit() -> (EmitFn, Arc<Mutex<Vec<(Action, String)>>>) {
        let seen: Arc<Mutex<Vec<(Action, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let emit: EmitFn = Arc::new(move |action, source| {
            sink.lock().unwrap().push((action, source.to_string()));
        });
        (emit, seen)
    }

    fn wait_for_emissions(seen: &Arc<Mutex<Vec<(Action, String)>>>, count: usize) {
        for _ in 0..200 {
            if seen.lock().unwrap().len() >= count {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("expected {count} emissions, got {}", seen.lock().unwrap().len());
    }

    #[test]
    fn test_standard_mapping() {
        let mapping = standard_mapping([1, 4]);
        assert_eq!(mapping.get("PLAY_PAUSE"), Some(&Action::PlayPause));
        assert_eq!(mapping.get("SLOT_4"), Some(&Action::Slot(4)));
        assert_eq!(mapping.get("SLOT_2"), None);
    }

    #[test]
    fn test_injected_lines_are_translated_and_emitted() {
        let mut backend = FakeSerialBackend::new(standard_mapping([1]));
        let (emit, seen) = recording_emit();

        backend.start(emit).unwrap();
        backend.inject("SLOT_1");
        backend.inject("  PLAY_PAUSE  ");
        backend.inject("UNKNOWN_LINE");
        backend.inject("NEXT");

        wait_for_emissions(&seen, 3);
        backend.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Action::Slot(1), "fake_serial".to_string()),
                (Action::PlayPause, "fake_serial".to_string()),
                (Action::Next, "fake_serial".to_string()),
            ]
        );
    }

    #[test]
    fn test_stop_halts_the_worker() {
        let mut backend = FakeSerialBackend::new(standard_mapping([]));
        let (emit, seen) = recording_emit();

        backend.start(emit).unwrap();
        backend.inject("PLAY_PAUSE");
        wait_for_emissions(&seen, 1);

        backend.stop();
        // Deuxième stop toléré
        backend.stop();

        backend.inject("PLAY_PAUSE");
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut backend = FakeSerialBackend::new(standard_mapping([]));
        let (emit, _seen) = recording_emit();

        backend.start(emit.clone()).unwrap();
        assert!(matches!(backend.start(emit), Err(InputError::AlreadyStarted)));
        backend.stop();
    }
}
