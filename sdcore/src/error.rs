//! Gestion des erreurs du coeur applicatif

use thiserror::Error;

/// Erreurs de construction de la table de bindings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Une cible vide est rejetée à la construction, jamais au dispatch
    #[error("Binding target is empty")]
    EmptyTarget,

    /// Binding invalide dans le document de configuration
    #[error("Invalid binding for slot {slot}: {reason}")]
    InvalidBinding { slot: u32, reason: String },

    /// Les identifiants de slot commencent à 1
    #[error("Slot id must be a positive integer")]
    InvalidSlotId,
}
