// ============================================================================
// Router : section courante et affordances synchronisées
// ============================================================================
// Le Router est la seule source de vérité pour la section courante.
// Toutes les affordances (top nav, tiroir latéral, dock) sont des vues
// dérivées, resynchronisées à chaque changement.
//
// Deux chemins :
// - écriture : navigation explicite (clic, deep link, historique)
//   -> met à jour l'état ET fait défiler la page
// - lecture : détection par défilement (fraction visible)
//   -> met à jour l'état SANS défilement (pas de boucle de rétroaction)
// ============================================================================

use tracing::{debug, info};

use crate::config::ConfigError;
use crate::models::{NavAffordance, NavSurface, Section, SectionId};
use crate::page::viewport::Viewport;

/// Seuil de visibilité par défaut (moitié de la section visible)
pub const DEFAULT_THRESHOLD: f64 = 0.5;

// ============================================================================
// Fragment : "#roadmap" -> "roadmap"
// ============================================================================

/// Helpers pour les fragments d'URL (deep links)
pub struct Fragment;

impl Fragment {
    /// Extrait l'identifiant d'un fragment
    ///
    /// "#roadmap" et "roadmap" donnent Some("roadmap"), "" et "#" donnent None
    pub fn parse(raw: &str) -> Option<&str> {
        let id = raw.trim();
        let id = id.strip_prefix('#').unwrap_or(id).trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn format(id: &SectionId) -> String {
        format!("#{}", id)
    }
}

// ============================================================================
// History : navigation précédent / suivant
// ============================================================================

/// Historique des sections visitées (indices dans Router::sections)
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<usize>,
    cursor: usize,
}

impl History {
    fn new(root: usize) -> Self {
        Self {
            entries: vec![root],
            cursor: 0,
        }
    }

    /// Ajoute une entrée, les entrées "suivantes" sont abandonnées
    fn push(&mut self, index: usize) {
        if self.entries.get(self.cursor) == Some(&index) {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(index);
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, index: usize) {
        self.entries[self.cursor] = index;
    }

    fn back(&mut self) -> Option<usize> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor])
    }

    fn forward(&mut self) -> Option<usize> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor])
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

// ============================================================================
// Structure : Router
// ============================================================================

/// Routeur de sections de la page
#[derive(Debug, Clone)]
pub struct Router {
    sections: Vec<Section>,
    affordances: Vec<NavAffordance>,

    /// Index de la section courante dans `sections`
    current: usize,

    /// Section d'accueil (fragment absent)
    home: usize,

    /// Tiroir latéral ouvert
    drawer_open: bool,

    viewport: Viewport,

    /// Seuil de visibilité dans (0, 1)
    threshold: f64,

    /// Dernières fractions observées (détection des franchissements)
    observed: Vec<f64>,

    history: History,
}

impl Router {
    /// Crée le routeur et active la section d'accueil
    ///
    /// Les affordances liées à une section inconnue sont conservées mais ne
    /// deviennent jamais actives.
    pub fn new(
        sections: Vec<Section>,
        affordances: Vec<NavAffordance>,
        home: &str,
        threshold: f64,
    ) -> Result<Self, ConfigError> {
        if sections.is_empty() {
            return Err(ConfigError::NoSections);
        }
        let home_index = sections
            .iter()
            .position(|s| s.id == *home)
            .ok_or_else(|| ConfigError::UnknownSection(home.to_string()))?;

        let viewport = Viewport::new(sections.iter().map(|s| s.height));
        let observed = vec![0.0; sections.len()];

        let mut router = Self {
            sections,
            affordances,
            current: home_index,
            home: home_index,
            drawer_open: false,
            viewport,
            threshold,
            observed,
            history: History::new(home_index),
        };
        router.sync_views(home_index);
        Ok(router)
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn affordances(&self) -> &[NavAffordance] {
        &self.affordances
    }

    /// Affordances d'une surface, avec leur index global
    pub fn affordances_on(&self, surface: NavSurface) -> impl Iterator<Item = (usize, &NavAffordance)> {
        self.affordances
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.surface == surface)
    }

    pub fn current(&self) -> &Section {
        &self.sections[self.current]
    }

    pub fn current_id(&self) -> &SectionId {
        &self.sections[self.current].id
    }

    /// Section d'accueil
    pub fn home(&self) -> &SectionId {
        &self.sections[self.home].id
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == *id)
    }

    /// Fragment reflétant la section courante ("#roadmap")
    pub fn fragment(&self) -> String {
        Fragment::format(self.current_id())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ========================================================================
    // Tiroir latéral
    // ========================================================================

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    pub fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    // ========================================================================
    // Chemin d'écriture : navigation explicite
    // ========================================================================

    /// Affiche la section `id`
    ///
    /// Section inconnue : aucun effet, retourne false.
    /// Sinon, en une seule passe : sections, affordances, section courante,
    /// smooth scroll vers la section, fermeture du tiroir.
    pub fn switch_section(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(section = %id, "Unknown section, ignoring navigation");
            return false;
        };

        info!(section = %id, "Switching section");
        self.history.push(index);
        self.sync_views(index);
        self.viewport.scroll_to(index);
        self.drawer_open = false;
        true
    }

    /// Clic sur une affordance (index global)
    pub fn activate(&mut self, affordance: usize) -> bool {
        match self.affordances.get(affordance) {
            Some(item) => {
                let target = item.section.clone();
                debug!(surface = ?item.surface, label = %item.label, section = %target, "Affordance activated");
                self.switch_section(target.as_str())
            }
            None => false,
        }
    }

    /// Arrivée par deep link ("#roadmap")
    ///
    /// Fragment absent : section d'accueil. Fragment inconnu : aucun effet.
    /// Positionnement direct, sans smooth scroll.
    pub fn restore_fragment(&mut self, raw: &str) -> bool {
        let Some(index) = self.resolve_fragment(raw) else {
            return false;
        };
        self.history.push(index);
        self.restore(index);
        true
    }

    /// Position initiale au démarrage : remplace la racine de l'historique
    pub fn start_at(&mut self, raw: &str) -> bool {
        let Some(index) = self.resolve_fragment(raw) else {
            return false;
        };
        self.history.replace(index);
        self.restore(index);
        true
    }

    /// Navigation "précédent"
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(index) => {
                self.restore(index);
                true
            }
            None => false,
        }
    }

    /// Navigation "suivant"
    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(index) => {
                self.restore(index);
                true
            }
            None => false,
        }
    }

    fn resolve_fragment(&self, raw: &str) -> Option<usize> {
        match Fragment::parse(raw) {
            None => Some(self.home),
            Some(id) => {
                let index = self.index_of(id);
                if index.is_none() {
                    debug!(fragment = %raw, "Unknown fragment, ignoring");
                }
                index
            }
        }
    }

    fn restore(&mut self, index: usize) {
        info!(section = %self.sections[index].id, "Restoring section from fragment");
        self.sync_views(index);
        self.viewport.jump_to(index);
        self.drawer_open = false;
        self.observed = self.viewport.fractions();
    }

    // ========================================================================
    // Chemin de lecture : détection par défilement
    // ========================================================================

    /// Défilement utilisateur de `delta` lignes
    ///
    /// Retourne la section devenue courante si un seuil a été franchi
    pub fn scroll_by(&mut self, delta: i32) -> Option<SectionId> {
        if !self.viewport.scroll_by(delta) {
            return None;
        }
        self.observe()
    }

    /// Compare les fractions visibles au dernier relevé
    ///
    /// Une section qui franchit le seuil en montant devient courante.
    /// Suspendu pendant un smooth scroll.
    pub fn observe(&mut self) -> Option<SectionId> {
        if self.viewport.is_animating() {
            return None;
        }

        let fractions = self.viewport.fractions();
        let crossed = fractions
            .iter()
            .zip(&self.observed)
            .enumerate()
            .filter(|(_, (now, before))| **before < self.threshold && **now >= self.threshold)
            .map(|(i, _)| i)
            .last();
        self.observed = fractions;

        let index = crossed?;
        if index != self.current {
            debug!(section = %self.sections[index].id, "Section crossed visibility threshold");
            self.sync_views(index);
        }
        Some(self.sections[index].id.clone())
    }

    /// Avance le smooth scroll d'une frame
    ///
    /// Retourne true si l'animation continue
    pub fn advance_frame(&mut self) -> bool {
        if !self.viewport.is_animating() {
            return false;
        }
        let running = self.viewport.advance();
        if !running {
            // Nouveau point de référence, sans déclencher de franchissement
            self.observed = self.viewport.fractions();
        }
        running
    }

    /// Resize du terminal
    pub fn set_viewport_height(&mut self, height: u16) {
        if self.viewport.height() == u32::from(height) {
            return;
        }
        self.viewport.set_height(height);
        if !self.viewport.is_animating() {
            self.observed = self.viewport.fractions();
        }
    }

    // ========================================================================
    // Synchronisation des vues dérivées
    // ========================================================================

    /// Une seule section active, affordances alignées sur la section courante
    fn sync_views(&mut self, index: usize) {
        self.current = index;

        for (i, section) in self.sections.iter_mut().enumerate() {
            section.active = i == index;
        }

        let id = &self.sections[index].id;
        for item in self.affordances.iter_mut() {
            item.active = item.targets(id.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let sections = vec![
            Section::new("home", "Home", 10),
            Section::new("tokenomics", "Tokenomics", 10),
            Section::new("roadmap", "Roadmap", 10),
            Section::new("community", "Community", 10),
        ];

        let mut affordances = Vec::new();
        for surface in NavSurface::ALL {
            for id in ["home", "tokenomics", "roadmap", "community"] {
                affordances.push(NavAffordance::new(surface, id, id));
            }
        }

        let mut router = Router::new(sections, affordances, "home", DEFAULT_THRESHOLD).unwrap();
        router.set_viewport_height(10);
        router
    }

    /// Vérifie les deux invariants : une seule section active, affordances alignées
    fn assert_consistent(router: &Router, expected: &str) {
        let active: Vec<_> = router.sections().iter().filter(|s| s.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_str(), expected);
        assert_eq!(router.current_id().as_str(), expected);

        for item in router.affordances() {
            assert_eq!(item.active, item.section == *expected, "affordance {:?}", item);
        }
    }

    fn finish_animation(router: &mut Router) {
        while router.advance_frame() {}
    }

    #[test]
    fn test_fragment_parse() {
        assert_eq!(Fragment::parse("#roadmap"), Some("roadmap"));
        assert_eq!(Fragment::parse("roadmap"), Some("roadmap"));
        assert_eq!(Fragment::parse("  #roadmap "), Some("roadmap"));
        assert_eq!(Fragment::parse("#"), None);
        assert_eq!(Fragment::parse(""), None);
    }

    #[test]
    fn test_new_requires_known_home() {
        let sections = vec![Section::new("home", "Home", 10)];
        assert!(Router::new(sections, Vec::new(), "nowhere", 0.5).is_err());
        assert!(Router::new(Vec::new(), Vec::new(), "home", 0.5).is_err());
    }

    #[test]
    fn test_initial_state() {
        let router = router();
        assert_consistent(&router, "home");
        assert_eq!(router.fragment(), "#home");
    }

    #[test]
    fn test_switch_section_updates_everything() {
        let mut router = router();
        router.open_drawer();

        assert!(router.switch_section("roadmap"));
        assert_consistent(&router, "roadmap");
        assert!(!router.is_drawer_open());
        assert!(router.viewport().is_animating());

        finish_animation(&mut router);
        assert_eq!(router.viewport().offset(), 20);
    }

    #[test]
    fn test_unknown_section_is_noop() {
        let mut router = router();
        router.switch_section("tokenomics");
        router.open_drawer();

        assert!(!router.switch_section("presale"));
        assert_consistent(&router, "tokenomics");
        assert!(router.is_drawer_open());
    }

    #[test]
    fn test_single_active_section_after_any_sequence() {
        let mut router = router();
        for id in ["roadmap", "bogus", "", "community", "#home", "tokenomics", "nope"] {
            router.switch_section(id);
        }
        assert_consistent(&router, "tokenomics");

        let mut untouched = self::router();
        for id in ["bogus", "", "#home"] {
            untouched.switch_section(id);
        }
        assert_consistent(&untouched, "home");
    }

    #[test]
    fn test_switch_section_is_idempotent() {
        let mut once = router();
        once.switch_section("community");
        finish_animation(&mut once);

        let mut twice = router();
        twice.switch_section("community");
        twice.switch_section("community");
        finish_animation(&mut twice);

        assert_eq!(once.current_id(), twice.current_id());
        assert_eq!(once.viewport().offset(), twice.viewport().offset());
        let flags = |r: &Router| r.affordances().iter().map(|a| a.active).collect::<Vec<_>>();
        assert_eq!(flags(&once), flags(&twice));
        assert_eq!(once.history().can_go_back(), twice.history().can_go_back());
    }

    #[test]
    fn test_last_click_wins() {
        let mut router = router();
        let dock: Vec<usize> = router.affordances_on(NavSurface::Dock).map(|(i, _)| i).collect();

        // Deux clics dans la même passe : tokenomics puis community
        router.activate(dock[1]);
        router.activate(dock[3]);
        assert_consistent(&router, "community");
    }

    #[test]
    fn test_activate_out_of_range() {
        let mut router = router();
        assert!(!router.activate(999));
        assert_consistent(&router, "home");
    }

    #[test]
    fn test_deep_link_jumps_without_animation() {
        let mut router = router();
        assert!(router.start_at("#roadmap"));
        assert_consistent(&router, "roadmap");
        assert!(!router.viewport().is_animating());
        assert_eq!(router.viewport().offset(), 20);
        // La racine de l'historique est remplacée
        assert!(!router.history().can_go_back());
    }

    #[test]
    fn test_empty_fragment_goes_home() {
        let mut router = router();
        router.switch_section("roadmap");
        assert!(router.restore_fragment(""));
        assert_consistent(&router, "home");
    }

    #[test]
    fn test_unknown_fragment_is_noop() {
        let mut router = router();
        router.switch_section("roadmap");
        assert!(!router.restore_fragment("#moon"));
        assert_consistent(&router, "roadmap");
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut router = router();
        router.switch_section("tokenomics");
        router.switch_section("roadmap");

        assert!(router.back());
        assert_consistent(&router, "tokenomics");
        assert!(router.back());
        assert_consistent(&router, "home");
        assert!(!router.back());

        assert!(router.forward());
        assert_consistent(&router, "tokenomics");

        // Une nouvelle navigation abandonne les entrées suivantes
        router.switch_section("community");
        assert!(!router.forward());
    }

    #[test]
    fn test_scroll_crossing_syncs_without_scrolling() {
        let mut router = router();
        router.open_drawer();

        // Fenêtre [6, 16) : tokenomics visible à 60%
        let crossed = router.scroll_by(6);
        assert_eq!(crossed.as_ref().map(SectionId::as_str), Some("tokenomics"));
        assert_consistent(&router, "tokenomics");
        assert!(!router.viewport().is_animating());
        assert_eq!(router.viewport().offset(), 6);
        assert!(router.is_drawer_open());
    }

    #[test]
    fn test_scroll_below_threshold_changes_nothing() {
        let mut router = router();
        assert!(router.scroll_by(3).is_none());
        assert_consistent(&router, "home");
    }

    #[test]
    fn test_scroll_back_up_recrosses_home() {
        let mut router = router();
        router.scroll_by(8);
        assert_consistent(&router, "tokenomics");

        router.scroll_by(-6);
        assert_consistent(&router, "home");
    }

    #[test]
    fn test_observation_suspended_during_smooth_scroll() {
        let mut router = router();
        router.switch_section("community");

        // Les frames intermédiaires traversent tokenomics et roadmap
        while router.viewport().is_animating() {
            assert!(router.observe().is_none());
            router.advance_frame();
            assert_consistent(&router, "community");
        }
        assert_consistent(&router, "community");
    }

    #[test]
    fn test_custom_threshold() {
        let sections = vec![Section::new("a", "A", 10), Section::new("b", "B", 10)];
        let mut router = Router::new(sections, Vec::new(), "a", 0.2).unwrap();
        router.set_viewport_height(10);

        router.scroll_by(2);
        assert_eq!(router.current_id().as_str(), "b");
    }
}
