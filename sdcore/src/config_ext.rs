//! Extension de `sdconfig::Settings` vers la table de bindings du coeur

use crate::bindings::{Binding, BindingKind, BindingTable};
use crate::error::CoreError;
use sdconfig::{BindingType, Settings};

/// Conversion du document de configuration en table validée
pub trait SettingsExt {
    /// Construit la table de bindings, en rejetant les enregistrements
    /// invalides (cible vide, slot 0) avec le slot fautif dans l'erreur.
    fn binding_table(&self) -> Result<BindingTable, CoreError>;
}

impl SettingsExt for Settings {
    fn binding_table(&self) -> Result<BindingTable, CoreError> {
        let mut entries = Vec::with_capacity(self.bindings.len());
        for record in &self.bindings {
            let kind = match record.binding_type {
                BindingType::Track => BindingKind::Track,
                BindingType::Playlist => BindingKind::Playlist,
                BindingType::UriList => BindingKind::UriList,
            };
            let binding = Binding::new(kind, record.uri.clone(), record.name.clone()).map_err(
                |e| CoreError::InvalidBinding {
                    slot: record.slot_id,
                    reason: e.to_string(),
                },
            )?;
            entries.push((record.slot_id, binding));
        }
        BindingTable::from_entries(entries)
    }
}
