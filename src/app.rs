// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de la page TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Composition : App possède Router, Ticker, FormHandler
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Un seul thread logique : les pulses du ticker arrivent par channel et
//   sont appliqués ici, comme les événements clavier
// ============================================================================

use std::sync::mpsc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ExternalLink, PageConfig};
use crate::models::{NavSurface, SectionKind};
use crate::page::{
    DisplayBoard, FormField, FormFields, FormHandler, Router, SubmitOutcome, Ticker, TickerPulse,
    TickerTask,
};
use crate::storage::SubmissionLog;
use crate::ui::layout::Hit;

/// Durée d'affichage des messages (succès / erreur)
pub const FLASH_TTL: Duration = Duration::from_secs(5);

/// Durée de l'indicateur d'erreur sur un champ
pub const FIELD_ERROR_TTL: Duration = Duration::from_millis(1200);

/// Délai simulé de préparation du whitepaper
pub const WHITEPAPER_DELAY: Duration = Duration::from_secs(2);

pub const WHITEPAPER_MESSAGE: &str = "Whitepaper will be available at launch!";
pub const WALLET_MESSAGE: &str = "Wallet connection opens at launch";

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul mode actif à la fois
// ============================================================================

/// Mode d'interaction courant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Navigation dans la page
    Page,

    /// Saisie dans le formulaire de pré-inscription
    /// - Tab change de champ, Enter soumet, ESC annule
    FormInput,

    /// Table des liens externes affichée
    Links,
}

/// Type de message transitoire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

/// Message transitoire, retiré automatiquement
#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
    pub expires_at: Instant,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    pub current_screen: Screen,

    pub brand: String,

    pub router: Router,
    pub ticker: Ticker,

    /// Slots d'affichage alimentés par le ticker
    pub board: DisplayBoard,

    pub form: FormHandler,
    pub fields: FormFields,
    pub focus: FormField,

    /// Champ en erreur et fin de l'indicateur
    pub field_error: Option<(FormField, Instant)>,

    pub flash: Option<Flash>,

    /// Whitepaper demandé : fin du "Preparing..."
    pub whitepaper_ready_at: Option<Instant>,

    pub links: Vec<ExternalLink>,

    /// Lien sélectionné dans le tiroir latéral (index parmi ses affordances)
    pub drawer_selection: usize,

    rng: StdRng,
    log: Box<dyn SubmissionLog>,
    ticker_task: Option<TickerTask>,
}

impl App {
    /// Construit l'application depuis la configuration
    pub fn new(config: &PageConfig, log: Box<dyn SubmissionLog>) -> Result<Self, ConfigError> {
        Self::with_rng(config, log, StdRng::from_entropy())
    }

    /// Comme new(), avec un générateur fourni (tests déterministes)
    pub fn with_rng(config: &PageConfig, log: Box<dyn SubmissionLog>, rng: StdRng) -> Result<Self, ConfigError> {
        let router = config.build_router()?;
        let ticker = config.build_ticker();
        let mut board = config.build_board();

        // Les slots affichent les valeurs initiales avant le premier tick
        ticker.project(&mut board);

        Ok(Self {
            running: true,
            confirm_quit: false,
            current_screen: Screen::Page,
            brand: config.brand.clone(),
            router,
            ticker,
            board,
            form: config.form_handler(),
            fields: FormFields::default(),
            focus: FormField::Identifier,
            field_error: None,
            flash: None,
            whitepaper_ready_at: None,
            links: config.links.clone(),
            drawer_selection: 0,
            rng,
            log,
            ticker_task: None,
        })
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Démarre le ticker planifié et retourne le récepteur des pulses
    pub fn start_ticker(&mut self, period: Duration) -> std::io::Result<mpsc::Receiver<TickerPulse>> {
        // Un seul timer à la fois
        self.stop_ticker();
        let (tx, rx) = mpsc::channel();
        self.ticker_task = Some(TickerTask::start(period, tx)?);
        Ok(rx)
    }

    /// Arrête le ticker (teardown), sans effet s'il est déjà arrêté
    pub fn stop_ticker(&mut self) {
        if let Some(mut task) = self.ticker_task.take() {
            task.stop();
        }
    }

    /// Applique un pulse du timer
    pub fn apply_pulse(&mut self, pulse: TickerPulse) {
        debug!(seq = pulse.seq, "Applying ticker pulse");
        self.ticker.tick(&mut self.rng, &mut self.board);
    }

    /// Appelé à chaque frame : animation, expiration des messages
    pub fn on_frame(&mut self, now: Instant) {
        self.router.advance_frame();

        if self.flash.as_ref().is_some_and(|f| now >= f.expires_at) {
            self.flash = None;
        }
        if self.field_error.is_some_and(|(_, until)| now >= until) {
            self.field_error = None;
        }
        if self.whitepaper_ready_at.is_some_and(|at| now >= at) {
            self.whitepaper_ready_at = None;
            self.show_flash(WHITEPAPER_MESSAGE, FlashKind::Success, now);
        }
    }

    pub fn show_flash(&mut self, text: impl Into<String>, kind: FlashKind, now: Instant) {
        self.flash = Some(Flash {
            text: text.into(),
            kind,
            expires_at: now + FLASH_TTL,
        });
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigation explicite vers une section
    pub fn navigate(&mut self, id: &str) -> bool {
        let switched = self.router.switch_section(id);
        if switched {
            self.after_switch();
        }
        switched
    }

    /// Clic sur une affordance (index global)
    pub fn activate_affordance(&mut self, index: usize) -> bool {
        let switched = self.router.activate(index);
        if switched {
            self.after_switch();
        }
        switched
    }

    /// Deep link (arrivée ou changement de fragment)
    pub fn restore_fragment(&mut self, fragment: &str) -> bool {
        let switched = self.router.restore_fragment(fragment);
        if switched {
            self.after_switch();
        }
        switched
    }

    /// Position initiale (fragment de la ligne de commande)
    pub fn start_at(&mut self, fragment: &str) -> bool {
        let switched = self.router.start_at(fragment);
        if switched {
            self.after_switch();
        }
        switched
    }

    /// Retour à l'accueil (touche Home)
    pub fn go_home(&mut self) -> bool {
        let home = self.router.home().clone();
        self.navigate(home.as_str())
    }

    pub fn back(&mut self) -> bool {
        let switched = self.router.back();
        if switched {
            self.after_switch();
        }
        switched
    }

    pub fn forward(&mut self) -> bool {
        let switched = self.router.forward();
        if switched {
            self.after_switch();
        }
        switched
    }

    /// Défilement utilisateur
    pub fn scroll(&mut self, delta: i32) {
        if let Some(section) = self.router.scroll_by(delta) {
            debug!(%section, "Navigation synced from scroll position");
        }
    }

    // ========================================================================
    // Souris
    // ========================================================================
    // Seul le mode Page réagit au pointeur : la saisie et les overlays
    // gardent la page immobile sous eux.

    /// Molette
    pub fn on_wheel(&mut self, delta: i32) {
        if self.current_screen == Screen::Page {
            self.scroll(delta);
        }
    }

    /// Clic gauche, déjà résolu par le hit-testing
    ///
    /// Overlay des liens ouvert : le clic le ferme, sans naviguer
    pub fn on_click(&mut self, hit: Hit) -> bool {
        match self.current_screen {
            Screen::Links => {
                self.hide_links();
                false
            }
            Screen::FormInput => false,
            Screen::Page => match hit {
                Hit::Affordance(index) => self.activate_affordance(index),
                Hit::OutsideDrawer => {
                    self.close_drawer();
                    false
                }
                Hit::Nothing => false,
            },
        }
    }

    /// Section des statistiques affichée : rafraîchit les slots
    fn after_switch(&mut self) {
        if self.router.current().kind == SectionKind::Stats {
            self.ticker.project(&mut self.board);
        }
    }

    // ========================================================================
    // Tiroir latéral
    // ========================================================================

    pub fn toggle_drawer(&mut self) {
        self.router.toggle_drawer();
        if self.router.is_drawer_open() {
            // Sélection initiale : le lien de la section courante
            self.drawer_selection = self
                .router
                .affordances_on(NavSurface::Sidebar)
                .position(|(_, a)| a.active)
                .unwrap_or(0);
        }
    }

    pub fn close_drawer(&mut self) {
        self.router.close_drawer();
    }

    fn sidebar_len(&self) -> usize {
        self.router.affordances_on(NavSurface::Sidebar).count()
    }

    pub fn drawer_up(&mut self) {
        self.drawer_selection = self.drawer_selection.saturating_sub(1);
    }

    pub fn drawer_down(&mut self) {
        let max_index = self.sidebar_len().saturating_sub(1);
        self.drawer_selection = (self.drawer_selection + 1).min(max_index);
    }

    /// Active le lien sélectionné du tiroir (ferme le tiroir)
    pub fn drawer_confirm(&mut self) -> bool {
        let target = self
            .router
            .affordances_on(NavSurface::Sidebar)
            .nth(self.drawer_selection)
            .map(|(i, _)| i);
        match target {
            Some(index) => self.activate_affordance(index),
            None => false,
        }
    }

    // ========================================================================
    // Formulaire
    // ========================================================================

    /// Entre en mode saisie (navigue vers la section du formulaire)
    pub fn start_form(&mut self) {
        let form_section = self
            .router
            .sections()
            .iter()
            .find(|s| s.kind == SectionKind::Form)
            .map(|s| s.id.clone());
        if let Some(id) = form_section {
            if *self.router.current_id() != id {
                self.navigate(id.as_str());
            }
        }
        self.current_screen = Screen::FormInput;
        self.focus = FormField::Identifier;
    }

    pub fn cancel_form(&mut self) {
        self.current_screen = Screen::Page;
    }

    pub fn is_in_form(&self) -> bool {
        self.current_screen == Screen::FormInput
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn append_char(&mut self, c: char) {
        self.fields.field_mut(self.focus).push(c);
    }

    pub fn backspace(&mut self) {
        self.fields.field_mut(self.focus).pop();
    }

    /// Soumet le formulaire
    ///
    /// Erreur : message 5 s + indicateur sur le champ 1.2 s
    /// Succès : champs vidés, message 5 s, retour à la page
    pub fn submit_form(&mut self, now: Instant) -> bool {
        let outcome = self
            .form
            .submit(&self.fields, &mut self.ticker, &mut self.board, self.log.as_mut());

        match outcome {
            SubmitOutcome::Accepted(_) => {
                self.fields.clear();
                self.field_error = None;
                self.current_screen = Screen::Page;
                self.show_flash(crate::page::form::SUCCESS_MESSAGE, FlashKind::Success, now);
                true
            }
            SubmitOutcome::Rejected(e) => {
                self.focus = e.field();
                self.field_error = Some((e.field(), now + FIELD_ERROR_TTL));
                self.show_flash(e.to_string(), FlashKind::Error, now);
                false
            }
        }
    }

    // ========================================================================
    // Actions annexes
    // ========================================================================

    /// Bouton whitepaper : "Preparing..." puis message
    pub fn request_whitepaper(&mut self, now: Instant) {
        if self.whitepaper_ready_at.is_some() {
            return;
        }
        info!("Whitepaper requested");
        self.whitepaper_ready_at = Some(now + WHITEPAPER_DELAY);
    }

    pub fn is_preparing_whitepaper(&self) -> bool {
        self.whitepaper_ready_at.is_some()
    }

    /// Connexion wallet : non disponible avant le lancement
    pub fn connect_wallet(&mut self, now: Instant) {
        info!("Wallet connect requested (stub)");
        self.show_flash(WALLET_MESSAGE, FlashKind::Info, now);
    }

    pub fn show_links(&mut self) {
        self.current_screen = Screen::Links;
    }

    pub fn hide_links(&mut self) {
        self.current_screen = Screen::Page;
    }

    /// Lien externe par position (touches 1..9)
    pub fn link(&self, index: usize) -> Option<&ExternalLink> {
        self.links.get(index)
    }

    /// Résultat de l'ouverture d'un lien
    pub fn link_opened(&mut self, link: &ExternalLink, result: std::io::Result<()>, now: Instant) {
        match result {
            Ok(()) => self.show_flash(format!("Opening {}…", link.name), FlashKind::Info, now),
            Err(e) => {
                warn!(url = %link.url, error = %e, "Failed to open external link");
                self.show_flash(format!("Could not open {}", link.name), FlashKind::Error, now);
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatId;
    use crate::storage::MemoryLog;

    fn app() -> App {
        let mut app = App::with_rng(
            &PageConfig::default(),
            Box::new(MemoryLog::default()),
            StdRng::seed_from_u64(11),
        )
        .unwrap();
        app.router.set_viewport_height(20);
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.append_char(c);
        }
    }

    fn holders(app: &App) -> f64 {
        app.ticker.value(StatId::Holders).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert_eq!(app.router.current_id().as_str(), "home");
        // Valeurs initiales projetées avant le premier tick
        assert_eq!(app.board.get("marketCap"), Some("$4.2M"));
        assert_eq!(app.board.get("holders"), Some("1,234"));
    }

    #[test]
    fn test_app_quit() {
        let mut app = app();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_pulses_tick_the_stats() {
        let mut app = app();
        let before = holders(&app);
        app.apply_pulse(TickerPulse { seq: 0 });
        app.apply_pulse(TickerPulse { seq: 1 });

        assert_eq!(app.ticker.ticks(), 2);
        assert!(holders(&app) > before);
        // Le ticker ne touche jamais la navigation
        assert_eq!(app.router.current_id().as_str(), "home");
    }

    #[test]
    fn test_empty_submit_shows_errors() {
        let mut app = app();
        let now = Instant::now();
        app.start_form();

        assert!(!app.submit_form(now));
        assert_eq!(holders(&app), 1234.0);

        let flash = app.flash.as_ref().unwrap();
        assert_eq!(flash.kind, FlashKind::Error);
        assert_eq!(flash.text, "Please enter your email address");
        assert_eq!(app.field_error.map(|(f, _)| f), Some(FormField::Identifier));
        assert!(app.is_in_form());

        // L'indicateur disparaît après 1.2 s, le message après 5 s
        app.on_frame(now + Duration::from_millis(1300));
        assert!(app.field_error.is_none());
        assert!(app.flash.is_some());
        app.on_frame(now + Duration::from_secs(6));
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_valid_submit_counts_and_clears() {
        let mut app = app();
        let now = Instant::now();
        app.start_form();
        assert_eq!(app.router.current_id().as_str(), "presale");

        type_text(&mut app, "user@example.com");
        assert!(app.submit_form(now));

        assert_eq!(holders(&app), 1235.0);
        assert_eq!(app.fields, FormFields::default());
        assert_eq!(app.current_screen, Screen::Page);
        assert_eq!(app.flash.as_ref().map(|f| f.kind), Some(FlashKind::Success));
    }

    #[test]
    fn test_holders_never_decrease() {
        let mut app = app();
        let now = Instant::now();
        let mut last = holders(&app);

        for i in 0..50 {
            if i % 5 == 0 {
                app.start_form();
                type_text(&mut app, "fan@example.com");
                app.submit_form(now);
            } else {
                app.apply_pulse(TickerPulse { seq: i });
            }
            assert!(holders(&app) >= last);
            last = holders(&app);
        }
    }

    #[test]
    fn test_two_clicks_in_one_pass_second_wins() {
        let mut app = app();
        let dock: Vec<usize> = app.router.affordances_on(NavSurface::Dock).map(|(i, _)| i).collect();

        app.activate_affordance(dock[2]);
        app.activate_affordance(dock[4]);

        assert_eq!(app.router.current_id().as_str(), "community");
        for item in app.router.affordances() {
            assert_eq!(item.active, item.section == *"community");
        }
    }

    #[test]
    fn test_drawer_navigation() {
        let mut app = app();
        app.toggle_drawer();
        assert!(app.router.is_drawer_open());
        assert_eq!(app.drawer_selection, 0);

        app.drawer_down();
        app.drawer_down();
        assert!(app.drawer_confirm());

        assert_eq!(app.router.current_id().as_str(), "roadmap");
        assert!(!app.router.is_drawer_open());
    }

    #[test]
    fn test_drawer_selection_is_clamped() {
        let mut app = app();
        app.toggle_drawer();
        for _ in 0..20 {
            app.drawer_down();
        }
        assert_eq!(app.drawer_selection, 4);
        app.drawer_up();
        assert_eq!(app.drawer_selection, 3);
    }

    #[test]
    fn test_whitepaper_request() {
        let mut app = app();
        let now = Instant::now();

        app.request_whitepaper(now);
        assert!(app.is_preparing_whitepaper());
        // Deuxième pression ignorée pendant la préparation
        app.request_whitepaper(now + Duration::from_secs(1));

        app.on_frame(now + Duration::from_millis(1500));
        assert!(app.is_preparing_whitepaper());

        app.on_frame(now + Duration::from_secs(2));
        assert!(!app.is_preparing_whitepaper());
        assert_eq!(app.flash.as_ref().map(|f| f.text.as_str()), Some(WHITEPAPER_MESSAGE));
    }

    #[test]
    fn test_back_and_forward() {
        let mut app = app();
        app.navigate("roadmap");
        app.navigate("tokenomics");

        assert!(app.back());
        assert_eq!(app.router.current_id().as_str(), "roadmap");
        assert!(app.forward());
        assert_eq!(app.router.current_id().as_str(), "tokenomics");
    }

    #[test]
    fn test_start_at_deep_link_and_go_home() {
        let mut app = app();
        assert!(app.start_at("#roadmap"));
        assert_eq!(app.router.current_id().as_str(), "roadmap");
        assert!(!app.router.viewport().is_animating());
        assert!(!app.router.history().can_go_back());

        assert!(!app.start_at("#moon"));
        assert_eq!(app.router.current_id().as_str(), "roadmap");

        assert!(app.go_home());
        assert_eq!(app.router.current_id().as_str(), "home");
        assert!(app.router.history().can_go_back());
    }

    #[test]
    fn test_pointer_is_ignored_while_typing() {
        let mut app = app();
        app.start_form();
        while app.router.advance_frame() {}
        let offset = app.router.viewport().offset();
        let dock: Vec<usize> = app.router.affordances_on(NavSurface::Dock).map(|(i, _)| i).collect();

        app.on_wheel(-3);
        assert!(!app.on_click(Hit::Affordance(dock[0])));

        assert_eq!(app.router.viewport().offset(), offset);
        assert_eq!(app.router.current_id().as_str(), "presale");
        assert!(app.is_in_form());
    }

    #[test]
    fn test_click_closes_links_overlay_without_navigating() {
        let mut app = app();
        let dock: Vec<usize> = app.router.affordances_on(NavSurface::Dock).map(|(i, _)| i).collect();
        app.show_links();

        assert!(!app.on_click(Hit::Affordance(dock[2])));

        assert_eq!(app.current_screen, Screen::Page);
        assert_eq!(app.router.current_id().as_str(), "home");
    }

    #[test]
    fn test_click_on_page_navigates() {
        let mut app = app();
        let dock: Vec<usize> = app.router.affordances_on(NavSurface::Dock).map(|(i, _)| i).collect();

        assert!(app.on_click(Hit::Affordance(dock[2])));
        assert_eq!(app.router.current_id().as_str(), "roadmap");

        app.toggle_drawer();
        assert!(!app.on_click(Hit::OutsideDrawer));
        assert!(!app.router.is_drawer_open());
    }

    #[test]
    fn test_link_open_failure_is_reported() {
        let mut app = app();
        let now = Instant::now();
        let link = app.link(0).cloned().unwrap();

        app.link_opened(&link, Err(std::io::Error::other("no browser")), now);

        assert_eq!(app.flash.as_ref().map(|f| f.kind), Some(FlashKind::Error));
        assert!(app.is_running());
    }

    #[test]
    fn test_start_and_stop_ticker() {
        let mut app = app();
        let rx = app.start_ticker(Duration::from_secs(3600)).unwrap();

        let pulse = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.apply_pulse(pulse);
        assert_eq!(app.ticker.ticks(), 1);

        app.stop_ticker();
        app.stop_ticker();
    }
}
