// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier, souris, resize et les ticks de frame
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Error handling avec Result
// 3. Helpers is_*_event : pattern matching sur KeyCode
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};

/// Durée max d'attente d'un événement : cadence des frames (smooth scroll)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Enum Event
// ============================================================================

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Clic ou molette
    Mouse(MouseEvent),

    /// Terminal redimensionné
    Resize(u16, u16),

    /// Pas d'événement pendant FRAME_INTERVAL
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            timeout: FRAME_INTERVAL,
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus une frame
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.timeout)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                CrosstermEvent::Mouse(mouse) => Ok(Event::Mouse(mouse)),
                CrosstermEvent::Resize(w, h) => Ok(Event::Resize(w, h)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        _ => None,
    }
}

/// 'q' (quitter, deux fois)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Ctrl+C : sortie immédiate
pub fn is_interrupt_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    } else {
        false
    }
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_tab_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

pub fn is_page_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageUp))
}

pub fn is_page_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageDown | KeyCode::Char(' ')))
}

/// 'h' ou ← : historique précédent
pub fn is_back_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h') | KeyCode::Left))
}

/// 'l' ou → : historique suivant
pub fn is_forward_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l') | KeyCode::Right))
}

/// Home : retour à l'accueil
pub fn is_home_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Home))
}

/// 'm' : menu hamburger (tiroir latéral)
pub fn is_menu_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('m') | KeyCode::Char('M')))
}

/// 'i' : pré-inscription (mode saisie)
pub fn is_register_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('i') | KeyCode::Char('I')))
}

/// 'w' : whitepaper
pub fn is_whitepaper_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('w') | KeyCode::Char('W')))
}

/// 'c' : connexion wallet
pub fn is_wallet_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('c') | KeyCode::Char('C'))) && !is_interrupt_event(event)
}

/// 'o' : liens externes
pub fn is_links_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('o') | KeyCode::Char('O')))
}

/// Chiffre 1..9 -> index 0..8
pub fn digit_from_event(event: &Event) -> Option<usize> {
    match key_code(event) {
        Some(KeyCode::Char(c @ '1'..='9')) => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

/// Caractère imprimable (saisie du formulaire)
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        if let KeyCode::Char(c) = key.code {
            if !c.is_control() {
                return Some(c);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_digits() {
        assert_eq!(digit_from_event(&key(KeyCode::Char('1'))), Some(0));
        assert_eq!(digit_from_event(&key(KeyCode::Char('9'))), Some(8));
        assert_eq!(digit_from_event(&key(KeyCode::Char('0'))), None);
        assert_eq!(digit_from_event(&Event::Tick), None);
    }

    #[test]
    fn test_ctrl_c_is_not_wallet() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_interrupt_event(&ctrl_c));
        assert!(!is_wallet_event(&ctrl_c));
        assert!(get_char_from_event(&ctrl_c).is_none());
        assert!(is_wallet_event(&key(KeyCode::Char('c'))));
    }

    #[test]
    fn test_chars_for_form() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char('@'))), Some('@'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
    }
}
