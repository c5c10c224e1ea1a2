// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de la page
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod section;    // Sections et affordances de navigation
pub mod stat;       // Statistiques simulées
pub mod submission; // Inscriptions à la waitlist

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use tokenpage::models::section::Section;
// On peut faire : use tokenpage::models::Section;
pub use section::{NavAffordance, NavSurface, Section, SectionId, SectionKind};
pub use stat::{StatFormat, StatId, StatMotion, TickerStat};
pub use submission::FormSubmission;
