// ============================================================================
// TokenPage - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod app;     // État de l'application
pub mod config;  // Table de liaison (sections, affordances, stats)
pub mod links;   // Ouverture des liens externes
pub mod models;  // Structures de données
pub mod page;    // Router, viewport, ticker, formulaire
pub mod storage; // Journal des inscriptions
pub mod ui;      // Interface utilisateur
