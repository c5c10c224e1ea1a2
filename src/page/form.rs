// ============================================================================
// Formulaire de pré-inscription (waitlist)
// ============================================================================
// Valide le champ requis, incrémente le compteur de holders, journalise
// l'inscription (best effort). N'échoue jamais vers l'appelant : le résultat
// est un SubmitOutcome, pas un Result.
// ============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{FormSubmission, StatId};
use crate::page::ticker::{DisplayBoard, Ticker};
use crate::storage::SubmissionLog;

/// Nature du champ requis selon la variante de la page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Adresse email, validée par forme
    #[default]
    Email,

    /// Adresse de wallet, seulement non vide
    Wallet,
}

/// Champ du formulaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Identifier,
    Email,
    Note,
}

impl FormField {
    /// Champ suivant (touche Tab)
    pub fn next(self) -> Self {
        match self {
            FormField::Identifier => FormField::Email,
            FormField::Email => FormField::Note,
            FormField::Note => FormField::Identifier,
        }
    }
}

/// Valeurs saisies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub identifier: String,
    pub email: String,
    pub note: String,
}

impl FormFields {
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Identifier => &mut self.identifier,
            FormField::Email => &mut self.email,
            FormField::Note => &mut self.note,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Identifier => &self.identifier,
            FormField::Email => &self.email,
            FormField::Note => &self.note,
        }
    }

    pub fn clear(&mut self) {
        self.identifier.clear();
        self.email.clear();
        self.note.clear();
    }
}

/// Erreur de saisie, affichée puis oubliée
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserInputError {
    #[error("Please enter your email address")]
    EmptyEmail,

    #[error("Please enter your wallet address")]
    EmptyWallet,

    #[error("Please enter a valid email address")]
    MalformedEmail,

    #[error("Please enter a valid contact email")]
    MalformedSecondaryEmail,
}

impl UserInputError {
    /// Champ fautif (indicateur d'erreur)
    pub fn field(&self) -> FormField {
        match self {
            UserInputError::MalformedSecondaryEmail => FormField::Email,
            _ => FormField::Identifier,
        }
    }
}

/// Résultat d'une soumission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(FormSubmission),
    Rejected(UserInputError),
}

/// Message de succès affiché après une inscription
pub const SUCCESS_MESSAGE: &str = "✓ Pre-registration successful! Check your email for confirmation.";

/// Vérifie la forme "local@domaine.tld"
///
/// Pas d'espace, un seul '@', partie locale non vide, et un '.' dans le
/// domaine avec du texte de part et d'autre.
pub fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Gestionnaire du formulaire
#[derive(Debug, Clone)]
pub struct FormHandler {
    kind: FieldKind,

    /// Préfixe des clés du journal
    namespace: String,
}

impl FormHandler {
    pub fn new(kind: FieldKind, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Valide les champs, sans effet de bord
    pub fn validate(&self, fields: &FormFields) -> Result<(), UserInputError> {
        let identifier = fields.identifier.trim();

        match self.kind {
            FieldKind::Email if identifier.is_empty() => return Err(UserInputError::EmptyEmail),
            FieldKind::Email if !is_email_shaped(identifier) => {
                return Err(UserInputError::MalformedEmail)
            }
            FieldKind::Wallet if identifier.is_empty() => return Err(UserInputError::EmptyWallet),
            _ => {}
        }

        let email = fields.email.trim();
        if !email.is_empty() && !is_email_shaped(email) {
            return Err(UserInputError::MalformedSecondaryEmail);
        }

        Ok(())
    }

    /// Soumet le formulaire
    ///
    /// Succès : holders + 1, inscription journalisée (échec du journal ignoré)
    pub fn submit(
        &self,
        fields: &FormFields,
        ticker: &mut Ticker,
        board: &mut DisplayBoard,
        log: &mut dyn SubmissionLog,
    ) -> SubmitOutcome {
        if let Err(e) = self.validate(fields) {
            info!(reason = %e, "Form submission rejected");
            return SubmitOutcome::Rejected(e);
        }

        let submission = FormSubmission::new(
            fields.identifier.trim().to_string(),
            non_empty(&fields.email),
            non_empty(&fields.note),
        );

        ticker.bump(StatId::Holders, board);

        let key = submission.log_key(&self.namespace);
        match log.append(&key, &submission) {
            Ok(()) => info!(%key, "Form submission recorded"),
            Err(e) => warn!(%key, error = %e, "Failed to persist submission, ignoring"),
        }

        SubmitOutcome::Accepted(submission)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
