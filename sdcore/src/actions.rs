//! Actions abstraites émises par les sources d'entrée
//!
//! Une action est une valeur immuable, indépendante de la source qui l'a
//! produite (hotkey, série simulée, bouton d'UI). L'égalité par valeur permet
//! de s'en servir directement comme clé de table.

use std::fmt;

/// Action abstraite routée vers le dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Bascule lecture/pause sur le device actif
    PlayPause,
    /// Piste suivante
    Next,
    /// Piste précédente
    Previous,
    /// Lance la cible associée au slot numéroté (>= 1)
    Slot(u32),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PlayPause => write!(f, "play_pause"),
            Action::Next => write!(f, "next"),
            Action::Previous => write!(f, "previous"),
            Action::Slot(id) => write!(f, "slot {id}"),
        }
    }
}
