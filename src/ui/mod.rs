// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events; // Gestion des événements clavier, souris, frames
pub mod layout; // Zones de l'écran et hit-testing
pub mod page;   // Rendu de la page

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use page::render;
