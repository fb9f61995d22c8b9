//! Génération de la paire PKCE (RFC 7636, méthode S256)

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};

/// Longueur du code verifier généré (43..=128 caractères autorisés)
const VERIFIER_LEN: usize = 64;

/// Paire verifier/challenge utilisée pour une tentative de login.
///
/// Le challenge est dérivé du verifier une fois pour toutes : l'URL
/// d'autorisation et l'échange de code doivent utiliser la même paire.
#[derive(Debug, Clone)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Génère un verifier aléatoire et son challenge S256
    pub fn generate() -> Self {
        let verifier = Alphanumeric.sample_string(&mut rand::rng(), VERIFIER_LEN);
        Self::from_verifier(&verifier)
    }

    /// Construit la paire à partir d'un verifier existant
    pub fn from_verifier(verifier: &str) -> Self {
        let digest = Sha256::digest(verifier.as_bytes());
        Self {
            verifier: verifier.to_string(),
            challenge: URL_SAFE_NO_PAD.encode(digest),
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}
