// ============================================================================
// TokenPage - Page de lancement de token dans le terminal
// ============================================================================
// Programme TUI : page à sections empilées, navigation synchronisée,
// statistiques simulées et formulaire de pré-inscription
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Channels : les pulses du ticker arrivent depuis un worker thread
// 4. RAII : restauration du terminal, même après un panic
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use tokenpage::app::{App, Screen};
use tokenpage::config::PageConfig;
use tokenpage::links::open_url;
use tokenpage::models::NavSurface;
use tokenpage::page::TickerPulse;
use tokenpage::storage::{DisabledLog, JsonlLog, SubmissionLog};
use tokenpage::ui::layout::{hit_test, page_layout, PageLayout};
use tokenpage::ui::{events::EventHandler, render, Event};

// ============================================================================
// Ligne de commande
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Token launch page in the terminal", long_about = None)]
struct Cli {
    /// Section initiale, ex. '#roadmap'
    fragment: Option<String>,

    /// Section initiale (sans '#')
    #[arg(long, conflicts_with = "fragment")]
    section: Option<String>,

    /// Fichier de configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Intervalle du ticker en secondes
    #[arg(long)]
    interval: Option<f64>,

    /// Seuil de visibilité de la détection par défilement, dans (0, 1)
    #[arg(long)]
    threshold: Option<f64>,
}

impl Cli {
    /// Fragment initial, "" pour l'accueil
    fn start_fragment(&self) -> String {
        self.fragment
            .clone()
            .or_else(|| self.section.clone())
            .unwrap_or_default()
    }

    /// Les options de la ligne de commande priment sur le fichier
    fn apply(&self, config: &mut PageConfig) -> Result<()> {
        if let Some(secs) = self.interval {
            if !(secs.is_finite() && secs > 0.0) {
                anyhow::bail!("--interval must be a positive number of seconds");
            }
            config.ticker_interval_ms = (secs * 1000.0).round().max(1.0) as u64;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.validate().context("Invalid command line options")?;
        Ok(())
    }
}

// ============================================================================
// Logging
// ============================================================================
// stdout appartient au TUI : les logs vont dans ./logs/tokenpage.log
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f logs/tokenpage.log
/// RUST_LOG=tokenpage=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "tokenpage.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokenpage=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Journal des inscriptions, désactivé si le stockage est indisponible
fn open_submission_log(config: &PageConfig) -> Box<dyn SubmissionLog> {
    let Some(dir) = config.storage_dir.clone().or_else(JsonlLog::default_dir) else {
        warn!("No data directory, submissions will not be recorded");
        return Box::new(DisabledLog::new("no data directory"));
    };

    match JsonlLog::open(&dir) {
        Ok(log) => {
            info!(path = %log.path().display(), "Submission log ready");
            Box::new(log)
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Submission log unavailable");
            Box::new(DisabledLog::new(e.to_string()))
        }
    }
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("TokenPage starting up");

    let mut config = PageConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config)?;

    let log = open_submission_log(&config);
    let mut app = App::new(&config, log).context("Failed to build the page")?;

    let fragment = cli.start_fragment();
    if !fragment.is_empty() && !app.start_at(&fragment) {
        warn!(%fragment, "Unknown start section, staying on home");
    }

    // Un panic ne doit jamais laisser le terminal en raw mode
    install_panic_hook();

    let pulses = app
        .start_ticker(config.ticker_interval())
        .context("Failed to start the ticker")?;
    info!(interval = ?config.ticker_interval(), "Ticker started");

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &pulses);

    // Teardown : le timer s'arrête avant la restauration du terminal
    app.stop_ticker();

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Restaure le terminal puis délègue au hook par défaut
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        error!(panic = %info, "Application panicked");
        default_hook(info);
    }));
}

// ============================================================================
// Event loop
// ============================================================================
// Un seul thread logique : pulses, frames et événements sont appliqués ici
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    pulses: &mpsc::Receiver<TickerPulse>,
) -> Result<()> {
    while app.is_running() {
        // Géométrie de l'écran : le viewport suit la hauteur du corps
        let size = terminal.size()?;
        let layout = page_layout(size, app.router.is_drawer_open());
        app.router.set_viewport_height(layout.body.height);

        // Pulses du ticker (non bloquant)
        loop {
            match pulses.try_recv() {
                Ok(pulse) => app.apply_pulse(pulse),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Ticker thread disconnected!");
                    break;
                }
            }
        }

        app.on_frame(Instant::now());

        terminal.draw(|frame| render(frame, &*app))?;

        match events.next() {
            Ok(event) => handle_event(app, event, &layout),
            Err(e) => warn!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: Event, layout: &PageLayout) {
    use tokenpage::ui::events::is_interrupt_event;

    if is_interrupt_event(&event) {
        info!("Interrupted (Ctrl+C)");
        app.quit();
        return;
    }

    match event {
        Event::Key(_) => match app.current_screen {
            Screen::FormInput => handle_form_key(app, &event),
            Screen::Links => handle_links_key(app, &event),
            Screen::Page if app.router.is_drawer_open() => handle_drawer_key(app, &event),
            Screen::Page => handle_page_key(app, &event),
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.on_wheel(-3),
            MouseEventKind::ScrollDown => app.on_wheel(3),
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = hit_test(layout, &app.router, mouse.column, mouse.row);
                app.on_click(hit);
            }
            _ => {}
        },
        Event::Resize(width, height) => {
            debug!(width, height, "Terminal resized");
        }
        Event::Tick => {}
    }
}

fn handle_page_key(app: &mut App, event: &Event) {
    use tokenpage::ui::events::*;

    // Two-step quit : toute autre touche annule
    if app.is_awaiting_quit_confirmation() {
        if is_quit_event(event) {
            info!("Quit confirmed");
            app.quit();
        } else {
            app.cancel_quit();
        }
        return;
    }

    let page = app.router.viewport().height().saturating_sub(1).max(1) as i32;
    let now = Instant::now();

    if is_quit_event(event) {
        app.request_quit();
    } else if is_up_event(event) {
        app.scroll(-1);
    } else if is_down_event(event) {
        app.scroll(1);
    } else if is_page_up_event(event) {
        app.scroll(-page);
    } else if is_page_down_event(event) {
        app.scroll(page);
    } else if is_back_event(event) {
        app.back();
    } else if is_forward_event(event) {
        app.forward();
    } else if is_home_event(event) {
        app.go_home();
    } else if is_menu_event(event) {
        app.toggle_drawer();
    } else if is_register_event(event) {
        app.start_form();
    } else if is_whitepaper_event(event) {
        app.request_whitepaper(now);
    } else if is_wallet_event(event) {
        app.connect_wallet(now);
    } else if is_links_event(event) {
        app.show_links();
    } else if let Some(position) = digit_from_event(event) {
        // 1..9 : icônes du dock
        let target = app.router.affordances_on(NavSurface::Dock).nth(position).map(|(i, _)| i);
        if let Some(index) = target {
            app.activate_affordance(index);
        }
    }
}

fn handle_drawer_key(app: &mut App, event: &Event) {
    use tokenpage::ui::events::*;

    if is_escape_event(event) || is_menu_event(event) {
        app.close_drawer();
    } else if is_up_event(event) {
        app.drawer_up();
    } else if is_down_event(event) {
        app.drawer_down();
    } else if is_enter_event(event) {
        app.drawer_confirm();
    }
}

fn handle_form_key(app: &mut App, event: &Event) {
    use tokenpage::ui::events::*;

    if is_escape_event(event) {
        app.cancel_form();
    } else if is_enter_event(event) {
        app.submit_form(Instant::now());
    } else if is_tab_event(event) {
        app.next_field();
    } else if is_backspace_event(event) {
        app.backspace();
    } else if let Some(c) = get_char_from_event(event) {
        app.append_char(c);
    }
}

fn handle_links_key(app: &mut App, event: &Event) {
    use tokenpage::ui::events::*;

    if is_escape_event(event) || is_links_event(event) {
        app.hide_links();
    } else if let Some(position) = digit_from_event(event) {
        if let Some(link) = app.link(position).cloned() {
            let result = open_url(&link.url);
            app.link_opened(&link, result, Instant::now());
            app.hide_links();
        }
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_fragment_and_section() {
        let cli = Cli::parse_from(["tokenpage", "#roadmap"]);
        assert_eq!(cli.start_fragment(), "#roadmap");

        let cli = Cli::parse_from(["tokenpage", "--section", "presale"]);
        assert_eq!(cli.start_fragment(), "presale");

        let cli = Cli::parse_from(["tokenpage"]);
        assert_eq!(cli.start_fragment(), "");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["tokenpage", "--interval", "3.2", "--threshold", "0.4"]);
        let mut config = PageConfig::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(config.ticker_interval(), Duration::from_millis(3200));
        assert_eq!(config.threshold, 0.4);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        let mut config = PageConfig::default();
        let cli = Cli::parse_from(["tokenpage", "--threshold", "1.5"]);
        assert!(cli.apply(&mut config).is_err());

        let cli = Cli::parse_from(["tokenpage", "--interval", "0"]);
        assert!(cli.apply(&mut PageConfig::default()).is_err());
    }
}
