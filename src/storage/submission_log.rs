// ============================================================================
// Journal des inscriptions
// ============================================================================
// Chaque inscription est une ligne JSON :
// {"key":"waitlist_1718000000000","submission":{...}}
// ============================================================================

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::FormSubmission;

/// Nom du fichier dans le répertoire de données
pub const LOG_FILE_NAME: &str = "submissions.jsonl";

/// Erreurs du stockage local (jamais montrées à l'utilisateur)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Journal en ajout seul
pub trait SubmissionLog {
    fn append(&mut self, key: &str, submission: &FormSubmission) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct LogLine<'a> {
    key: &'a str,
    submission: &'a FormSubmission,
}

// ============================================================================
// JsonlLog : fichier sur disque
// ============================================================================

/// Journal JSON lines sur disque
#[derive(Debug, Clone)]
pub struct JsonlLog {
    path: PathBuf,
}

impl JsonlLog {
    /// Ouvre (ou crée) le journal dans `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(LOG_FILE_NAME),
        })
    }

    /// Répertoire par défaut : ~/.local/share/tokenpage sur Linux
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("tokenpage"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionLog for JsonlLog {
    #[instrument(skip(self, submission), fields(path = %self.path.display()))]
    fn append(&mut self, key: &str, submission: &FormSubmission) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(&LogLine { key, submission })?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!("Submission appended");
        Ok(())
    }
}

// ============================================================================
// MemoryLog et DisabledLog
// ============================================================================

/// Journal en mémoire
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Vec<(String, FormSubmission)>,
}

impl MemoryLog {
    pub fn entries(&self) -> &[(String, FormSubmission)] {
        &self.entries
    }
}

impl SubmissionLog for MemoryLog {
    fn append(&mut self, key: &str, submission: &FormSubmission) -> Result<(), StorageError> {
        self.entries.push((key.to_string(), submission.clone()));
        Ok(())
    }
}

/// Stockage indisponible (répertoire de données introuvable ou non créable)
#[derive(Debug, Clone)]
pub struct DisabledLog {
    reason: String,
}

impl DisabledLog {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl SubmissionLog for DisabledLog {
    fn append(&mut self, _key: &str, _submission: &FormSubmission) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(identifier: &str) -> FormSubmission {
        FormSubmission::new(identifier.to_string(), None, Some("tg: @someone".to_string()))
    }

    #[test]
    fn test_jsonl_appends_one_line_per_submission() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = JsonlLog::open(dir.path().join("nested")).unwrap();

        log.append("waitlist_1", &submission("a@example.com")).unwrap();
        log.append("waitlist_2", &submission("b@example.com")).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["key"], "waitlist_1");
        assert_eq!(first["submission"]["identifier"], "a@example.com");
        assert_eq!(first["submission"]["note"], "tg: @someone");
    }

    #[test]
    fn test_open_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "x").unwrap();

        assert!(matches!(JsonlLog::open(&file), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_disabled_log_always_fails() {
        let mut log = DisabledLog::new("no data dir");
        let err = log.append("k", &submission("a@example.com")).unwrap_err();
        assert_eq!(err.to_string(), "storage unavailable: no data dir");
    }
}
