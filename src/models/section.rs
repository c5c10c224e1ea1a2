// ============================================================================
// Structures : Section, NavSurface, NavAffordance
// ============================================================================
// Une Section est une région logique de la page (accueil, tokenomics, roadmap...)
// Une NavAffordance est un contrôle cliquable lié à exactement une Section
//
// CONCEPTS RUST :
// 1. Newtype pattern : SectionId enveloppe un String pour le typage fort
// 2. Borrow<str> : permet de comparer un SectionId avec un &str sans allocation
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiant d'une section (ex: "home", "roadmap")
///
/// CONCEPT RUST : Newtype pattern
/// - Un struct tuple à un seul champ
/// - Impossible de confondre un SectionId avec un autre String
/// - #[serde(transparent)] : sérialisé comme un simple string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contenu dynamique rendu dans une section, en plus de son texte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Texte seul
    #[default]
    Text,

    /// Tableau des statistiques du ticker
    Stats,

    /// Formulaire de pré-inscription
    Form,

    /// Table des liens externes
    Links,
}

/// Une section de la page
#[derive(Debug, Clone)]
pub struct Section {
    /// Identifiant stable (cible des liens et des fragments)
    pub id: SectionId,

    /// Titre affiché dans l'en-tête de la section
    pub title: String,

    pub kind: SectionKind,

    /// Texte de la section, une entrée par ligne
    pub body: Vec<String>,

    /// Hauteur en lignes dans la page empilée
    pub height: u16,

    /// Élément d'affichage actif (mis en évidence)
    /// Un seul à la fois, maintenu par le Router
    pub active: bool,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, height: u16) -> Self {
        Self {
            id: SectionId::new(id),
            title: title.into(),
            kind: SectionKind::Text,
            body: Vec::new(),
            // Une section vide ne pourrait jamais devenir visible
            height: height.max(1),
            active: false,
        }
    }

    pub fn with_kind(mut self, kind: SectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: Vec<String>) -> Self {
        self.body = body;
        self
    }
}

// ============================================================================
// Enum : NavSurface
// ============================================================================
// Les trois surfaces de navigation de la page
// ============================================================================

/// Surface de navigation portant des affordances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavSurface {
    /// Barre de navigation en haut de page
    TopNav,

    /// Liens du tiroir latéral (menu hamburger)
    Sidebar,

    /// Icônes du dock en bas de page
    Dock,
}

impl NavSurface {
    pub const ALL: [NavSurface; 3] = [NavSurface::TopNav, NavSurface::Sidebar, NavSurface::Dock];
}

/// Contrôle de navigation lié à une section
#[derive(Debug, Clone)]
pub struct NavAffordance {
    pub surface: NavSurface,
    pub label: String,

    /// Section cible
    pub section: SectionId,

    /// État visuel "actif"
    /// INVARIANT : active == (section == section courante du Router)
    pub active: bool,
}

impl NavAffordance {
    pub fn new(surface: NavSurface, label: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            surface,
            label: label.into(),
            section: SectionId::new(section),
            active: false,
        }
    }

    /// Vérifie si l'affordance pointe vers la section donnée
    pub fn targets(&self, id: &str) -> bool {
        self.section == *id
    }
}
