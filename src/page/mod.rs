// ============================================================================
// Module : page
// ============================================================================
// Le coeur de la page : routeur de sections, ticker de statistiques,
// formulaire de pré-inscription
// ============================================================================

pub mod form;     // Formulaire waitlist
pub mod router;   // Section courante + affordances
pub mod schedule; // Tâche planifiée du ticker
pub mod ticker;   // Statistiques simulées
pub mod viewport; // Fenêtre visible et smooth scroll

pub use form::{FieldKind, FormField, FormFields, FormHandler, SubmitOutcome, UserInputError};
pub use router::{Fragment, Router};
pub use schedule::{TickerPulse, TickerTask};
pub use ticker::{DisplayBoard, Ticker};
pub use viewport::Viewport;
