//! Table des bindings slot -> cible jouable

use crate::error::CoreError;
use std::collections::HashMap;

/// Interprétation de la cible d'un binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Une URI de piste
    Track,
    /// Une URI de playlist (context URI)
    Playlist,
    /// Une liste d'URIs séparées par des virgules
    UriList,
}

/// Association entre un slot et une cible jouable.
///
/// Invariant: la cible n'est jamais vide; la validation a lieu ici, à la
/// construction, pour que le dispatch n'ait aucun cas dégénéré à gérer.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    kind: BindingKind,
    target: String,
    name: Option<String>,
}

impl Binding {
    pub fn new(
        kind: BindingKind,
        target: impl Into<String>,
        name: Option<String>,
    ) -> Result<Self, CoreError> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(CoreError::EmptyTarget);
        }
        Ok(Self { kind, target, name })
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Découpe la cible sur les virgules.
    ///
    /// Les éléments vides sont éliminés: `"a,b,"` donne `["a", "b"]`.
    pub fn uri_list(&self) -> Vec<String> {
        self.target
            .split(',')
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Table slot -> binding, remplacée en bloc, jamais modifiée en place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    slots: HashMap<u32, Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit la table à partir d'entrées validées.
    ///
    /// Les identifiants de slot commencent à 1; en cas de doublon la dernière
    /// entrée gagne.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (u32, Binding)>,
    ) -> Result<Self, CoreError> {
        let mut slots = HashMap::new();
        for (slot, binding) in entries {
            if slot == 0 {
                return Err(CoreError::InvalidSlotId);
            }
            slots.insert(slot, binding);
        }
        Ok(Self { slots })
    }

    pub fn get(&self, slot: u32) -> Option<&Binding> {
        self.slots.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots connus, sans ordre particulier
    pub fn slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target_rejected_at_construction() {
        assert_eq!(
            Binding::new(BindingKind::Track, "", None),
            Err(CoreError::EmptyTarget)
        );
        assert_eq!(
            Binding::new(BindingKind::Playlist, "   ", None),
            Err(CoreError::EmptyTarget)
        );
    }

    #[test]
    fn test_uri_list_split() {
        let binding = Binding::new(BindingKind::UriList, "a,b,c", None).unwrap();
        assert_eq!(binding.uri_list(), vec!["a", "b", "c"]);

        // Élément vide de fin: éliminé, pas d'URI fantôme
        let binding = Binding::new(BindingKind::UriList, "a,b,", None).unwrap();
        assert_eq!(binding.uri_list(), vec!["a", "b"]);

        let binding = Binding::new(BindingKind::UriList, " a , b ", None).unwrap();
        assert_eq!(binding.uri_list(), vec!["a", "b"]);
    }

    #[test]
    fn test_table_rejects_slot_zero() {
        let binding = Binding::new(BindingKind::Track, "spotify:track:x", None).unwrap();
        assert_eq!(
            BindingTable::from_entries([(0, binding)]),
            Err(CoreError::InvalidSlotId)
        );
    }

    #[test]
    fn test_table_lookup() {
        let track = Binding::new(BindingKind::Track, "spotify:track:x", None).unwrap();
        let table = BindingTable::from_entries([(1, track.clone())]).unwrap();

        assert_eq!(table.get(1), Some(&track));
        assert_eq!(table.get(2), None);
        assert_eq!(table.len(), 1);
    }
}
