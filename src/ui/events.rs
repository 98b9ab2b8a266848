// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : matches! sur les KeyCode
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Resize, souris, Release : ignorés
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
// Helper : Convertir KeyEvent en action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// Flèche droite ou 'l' : métrique suivante
pub fn is_next_metric_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

/// Flèche gauche ou 'h' : métrique précédente
pub fn is_previous_metric_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// 'c' : change le type de graphique
pub fn is_chart_mode_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('c') | KeyCode::Char('C')))
}

/// '/' ou 's' : nouvelle recherche
pub fn is_new_search_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('/') | KeyCode::Char('s')))
}

/// PageDown / PageUp : défilement des champs de la table
pub fn is_page_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageDown))
}

pub fn is_page_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageUp))
}

/// '[' : enregistrements plus anciens, ']' : plus récents
pub fn is_older_records_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('[')))
}

pub fn is_newer_records_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(']')))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère acceptable dans un ticker : alphanumérique, '-', '.', '^'
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || c == '-' || c == '.' || c == '^'
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

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
    fn test_metric_navigation_keys() {
        assert!(is_next_metric_event(&key(KeyCode::Right)));
        assert!(is_next_metric_event(&key(KeyCode::Char('l'))));
        assert!(is_previous_metric_event(&key(KeyCode::Left)));
        assert!(!is_previous_metric_event(&key(KeyCode::Char('l'))));
    }

    #[test]
    fn test_ticker_chars() {
        assert!(is_ticker_char_event(&key(KeyCode::Char('B'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('.'))));
        assert!(!is_ticker_char_event(&key(KeyCode::Char(' '))));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('x'))), Some('x'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
    }
}
