// ============================================================================
// Configuration de la page
// ============================================================================
// Table de liaison construite une seule fois au démarrage :
// sections, affordances par surface, statistiques et slots, formulaire, liens.
//
// Chaque champ a une valeur par défaut : un fichier absent ou partiel suffit.
//
// CONCEPTS RUST :
// 1. #[serde(default)] : champs manquants -> Default::default()
// 2. thiserror : erreurs typées, converties en anyhow dans le binaire
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
    NavAffordance, NavSurface, Section, SectionKind, StatFormat, StatId, StatMotion, TickerStat,
};
use crate::page::{DisplayBoard, FieldKind, FormHandler, Router, Ticker};

/// Fichier lu dans le répertoire courant si --config n'est pas fourni
pub const DEFAULT_CONFIG_FILE: &str = "tokenpage.toml";

/// Erreurs de configuration (démarrage uniquement)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("at least one section is required")]
    NoSections,

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("duplicate section '{0}'")]
    DuplicateSection(String),

    #[error("visibility threshold must be in (0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("ticker interval must be positive")]
    InvalidInterval,

    #[error("stat {0:?}: invalid range or seed")]
    InvalidStat(StatId),
}

// ============================================================================
// Structures désérialisées
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub kind: SectionKind,

    #[serde(default)]
    pub body: Vec<String>,

    /// Hauteur imposée (sinon calculée depuis le contenu)
    #[serde(default)]
    pub height: Option<u16>,
}

/// Une affordance : libellé -> section
#[derive(Debug, Clone, Deserialize)]
pub struct LinkBinding {
    pub label: String,
    pub section: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub top_nav: Vec<LinkBinding>,
    pub sidebar: Vec<LinkBinding>,
    pub dock: Vec<LinkBinding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatConfig {
    pub id: StatId,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub seed: f64,
    pub format: StatFormat,
    pub motion: StatMotion,

    #[serde(default)]
    pub slot: Option<String>,
}

/// Lien sortant (exchange, chart, réseaux sociaux)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
}

/// Configuration complète de la page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Nom affiché dans l'en-tête
    pub brand: String,

    /// Section d'accueil (fragment absent)
    pub home: String,

    /// Seuil de visibilité de la détection par défilement
    pub threshold: f64,

    /// Intervalle du ticker en millisecondes
    pub ticker_interval_ms: u64,

    /// Champ requis du formulaire
    pub field: FieldKind,

    /// Préfixe des clés du journal
    pub namespace: String,

    /// Répertoire du journal (défaut : répertoire de données de l'utilisateur)
    pub storage_dir: Option<PathBuf>,

    pub sections: Vec<SectionConfig>,
    pub nav: NavConfig,
    pub stats: Vec<StatConfig>,

    /// Slots d'affichage présents sur la page
    pub slots: Vec<String>,

    pub links: Vec<ExternalLink>,
}

impl Default for PageConfig {
    fn default() -> Self {
        let section = |id: &str, title: &str, kind: SectionKind, body: &[&str]| SectionConfig {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            body: body.iter().map(|s| s.to_string()).collect(),
            height: None,
        };
        let bind = |label: &str, section: &str| LinkBinding {
            label: label.to_string(),
            section: section.to_string(),
        };
        let link = |name: &str, url: &str| ExternalLink {
            name: name.to_string(),
            url: url.to_string(),
        };

        Self {
            brand: "GOLDEN TOKEN".to_string(),
            home: "home".to_string(),
            threshold: 0.5,
            ticker_interval_ms: 5_000,
            field: FieldKind::Email,
            namespace: "waitlist".to_string(),
            storage_dir: None,
            sections: vec![
                section("home", "Home", SectionKind::Text, &[
                    "The community token built to shine.",
                    "Fair launch. No presale whales. Liquidity locked at launch.",
                    "",
                    "Join the waitlist to be first in line when trading opens.",
                ]),
                section("tokenomics", "Tokenomics", SectionKind::Stats, &[
                    "Total supply: 1,000,000,000",
                    "Liquidity 60%  ·  Community 25%  ·  Marketing 10%  ·  Team 5%",
                ]),
                section("roadmap", "Roadmap", SectionKind::Text, &[
                    "Phase 1  Community building and waitlist",
                    "Phase 2  Fair launch and liquidity lock",
                    "Phase 3  CEX listings and partnerships",
                    "Phase 4  Ecosystem and governance",
                ]),
                section("presale", "Pre-registration", SectionKind::Form, &[
                    "Reserve your spot before launch.",
                ]),
                section("community", "Community", SectionKind::Links, &[
                    "Follow the launch on every platform.",
                ]),
            ],
            nav: NavConfig {
                top_nav: vec![
                    bind("Home", "home"),
                    bind("Tokenomics", "tokenomics"),
                    bind("Roadmap", "roadmap"),
                    bind("Join", "presale"),
                ],
                sidebar: vec![
                    bind("Home", "home"),
                    bind("Tokenomics", "tokenomics"),
                    bind("Roadmap", "roadmap"),
                    bind("Pre-register", "presale"),
                    bind("Community", "community"),
                ],
                dock: vec![
                    bind("⌂ Home", "home"),
                    bind("◔ Stats", "tokenomics"),
                    bind("⚑ Roadmap", "roadmap"),
                    bind("✉ Join", "presale"),
                    bind("☺ Social", "community"),
                ],
            },
            stats: vec![
                StatConfig {
                    id: StatId::Price,
                    label: "Price".to_string(),
                    min: 0.0030,
                    max: 0.0060,
                    seed: 0.0042,
                    format: StatFormat::Currency { decimals: 4, suffix: String::new() },
                    motion: StatMotion::Drift { delta: 0.0004 },
                    slot: Some("tokenPrice".to_string()),
                },
                StatConfig {
                    id: StatId::MarketCap,
                    label: "Market Cap".to_string(),
                    min: 3.5,
                    max: 5.0,
                    seed: 4.2,
                    format: StatFormat::Currency { decimals: 1, suffix: "M".to_string() },
                    motion: StatMotion::Drift { delta: 0.05 },
                    slot: Some("marketCap".to_string()),
                },
                StatConfig {
                    id: StatId::Holders,
                    label: "Holders".to_string(),
                    min: 0.0,
                    max: 1.0e12,
                    seed: 1234.0,
                    format: StatFormat::Integer,
                    motion: StatMotion::Growth { min_step: 1, max_step: 5 },
                    slot: Some("holders".to_string()),
                },
                StatConfig {
                    id: StatId::Change24h,
                    label: "24h".to_string(),
                    min: -8.0,
                    max: 12.0,
                    seed: 2.4,
                    format: StatFormat::Percent { decimals: 2 },
                    motion: StatMotion::Drift { delta: 0.35 },
                    slot: Some("change24h".to_string()),
                },
            ],
            slots: ["tokenPrice", "marketCap", "holders", "change24h"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            links: vec![
                link("Swap", "https://raydium.io/swap/"),
                link("Chart", "https://dexscreener.com/"),
                link("X / Twitter", "https://x.com/"),
                link("Telegram", "https://t.me/"),
            ],
        }
    }
}

impl PageConfig {
    /// Charge la configuration
    ///
    /// - `path` fourni : le fichier doit exister
    /// - sinon : tokenpage.toml du répertoire courant s'il existe, défauts sinon
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    debug!("No config file, using defaults");
                    let config = Self::default();
                    config.validate()?;
                    return Ok(config);
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parse et valide un contenu TOML
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie la cohérence de la table de liaison
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::NoSections);
        }

        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(ConfigError::DuplicateSection(section.id.clone()));
            }
        }

        if !seen.contains(self.home.as_str()) {
            return Err(ConfigError::UnknownSection(self.home.clone()));
        }

        let bindings = self.nav.top_nav.iter().chain(&self.nav.sidebar).chain(&self.nav.dock);
        for binding in bindings {
            if !seen.contains(binding.section.as_str()) {
                return Err(ConfigError::UnknownSection(binding.section.clone()));
            }
        }

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        if self.ticker_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        for stat in &self.stats {
            let range_ok = stat.min <= stat.max && (stat.min..=stat.max).contains(&stat.seed);
            let motion_ok = match stat.motion {
                StatMotion::Drift { delta } => delta >= 0.0 && delta.is_finite(),
                // Croissance stricte à chaque tick
                StatMotion::Growth { min_step, max_step } => min_step >= 1 && min_step <= max_step,
            };
            if !range_ok || !motion_ok {
                return Err(ConfigError::InvalidStat(stat.id));
            }
        }

        Ok(())
    }

    pub fn ticker_interval(&self) -> Duration {
        Duration::from_millis(self.ticker_interval_ms)
    }

    /// Hauteur d'une section : imposée, ou calculée depuis son contenu
    fn section_height(&self, section: &SectionConfig) -> u16 {
        if let Some(height) = section.height {
            return height;
        }

        let extra = match section.kind {
            SectionKind::Text => 0,
            SectionKind::Stats => self.stats.len() + 1,
            SectionKind::Form => 6,
            SectionKind::Links => self.links.len() + 1,
        };
        // Bordures + ligne de titre
        (section.body.len() + extra + 3).min(u16::MAX as usize) as u16
    }

    pub fn build_router(&self) -> Result<Router, ConfigError> {
        let sections = self
            .sections
            .iter()
            .map(|s| {
                Section::new(&s.id, &s.title, self.section_height(s))
                    .with_kind(s.kind)
                    .with_body(s.body.clone())
            })
            .collect();

        let surfaces = [
            (NavSurface::TopNav, &self.nav.top_nav),
            (NavSurface::Sidebar, &self.nav.sidebar),
            (NavSurface::Dock, &self.nav.dock),
        ];
        let affordances = surfaces
            .iter()
            .flat_map(|(surface, bindings)| {
                bindings
                    .iter()
                    .map(move |b| NavAffordance::new(*surface, &b.label, &b.section))
            })
            .collect();

        Router::new(sections, affordances, &self.home, self.threshold)
    }

    pub fn build_ticker(&self) -> Ticker {
        let stats = self
            .stats
            .iter()
            .map(|s| {
                let stat = TickerStat::new(
                    s.id,
                    &s.label,
                    (s.min, s.max),
                    s.seed,
                    s.format.clone(),
                    s.motion.clone(),
                );
                match &s.slot {
                    Some(slot) => stat.with_slot(slot),
                    None => stat,
                }
            })
            .collect();
        Ticker::new(stats)
    }

    pub fn build_board(&self) -> DisplayBoard {
        DisplayBoard::new(self.slots.iter().cloned())
    }

    pub fn form_handler(&self) -> FormHandler {
        FormHandler::new(self.field, &self.namespace)
    }
}
