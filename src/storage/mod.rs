// ============================================================================
// Module : storage
// ============================================================================
// Journal local des inscriptions : ajout uniquement, jamais relu
//
// CONCEPT RUST : Trait comme point d'extension
// - SubmissionLog : interface commune
// - JsonlLog : fichier JSON lines sur disque
// - MemoryLog : en mémoire (tests)
// - DisabledLog : stockage indisponible
// ============================================================================

pub mod submission_log;

pub use submission_log::{DisabledLog, JsonlLog, MemoryLog, StorageError, SubmissionLog};
