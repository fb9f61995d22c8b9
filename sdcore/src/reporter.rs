//! Remontée de statut vers la couche de présentation
//!
//! Petite interface de capacité à trois méthodes, pour que l'UI, un logger ou
//! un harnais de test puissent se substituer l'un à l'autre sans que le
//! dispatcher ne dépende d'une couche de présentation concrète. Les méthodes
//! peuvent être appelées depuis des tâches de fond; le marshaling éventuel
//! vers un thread d'UI est l'affaire de l'implémentation.

use tracing::{error, info};

/// Callbacks de statut, d'erreur et de pochette
pub trait Reporter: Send + Sync {
    fn set_status(&self, text: &str);

    fn set_error(&self, text: &str);

    fn set_cover_url(&self, url: &str);
}

/// Reporter par défaut des fronts headless: tout passe par le logging
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn set_status(&self, text: &str) {
        info!("status: {}", text);
    }

    fn set_error(&self, text: &str) {
        error!("{}", text);
    }

    fn set_cover_url(&self, url: &str) {
        info!("cover: {}", url);
    }
}
