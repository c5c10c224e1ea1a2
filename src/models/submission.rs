// ============================================================================
// Structure : FormSubmission
// ============================================================================
// Valeur éphémère créée après validation réussie du formulaire
// Écrite dans le journal local (append-only), jamais relue
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Une inscription à la waitlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Champ requis (email ou adresse de wallet selon la variante)
    pub identifier: String,

    /// Email secondaire optionnel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Note libre optionnelle (pseudo Telegram, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl FormSubmission {
    pub fn new(identifier: String, email: Option<String>, note: Option<String>) -> Self {
        Self {
            identifier,
            email,
            note,
            timestamp: Utc::now(),
        }
    }

    /// Clé du journal : "<namespace>_<timestamp en millisecondes>"
    pub fn log_key(&self, namespace: &str) -> String {
        format!("{}_{}", namespace, self.timestamp.timestamp_millis())
    }
}
