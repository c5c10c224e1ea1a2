// ============================================================================
// Page - Rendu de l'interface principale
// ============================================================================
// Dessine la page empilée, les barres de navigation et les overlays
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Paragraph::scroll : la page entière défile sous le viewport
// 3. Clear : efface une zone avant de dessiner un overlay
// 4. Style : couleurs et attributs de texte
// ============================================================================

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, FlashKind, Screen};
use crate::models::{NavSurface, Section, SectionKind};
use crate::page::{FieldKind, FormField};
use crate::ui::layout::{nav_cells, page_layout, PageLayout};

/// Durée de l'effet "pulse" sur une valeur mise à jour
pub const PULSE_DURATION: Duration = Duration::from_millis(200);

const GOLD: Color = Color::Rgb(255, 196, 0);

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let layout = page_layout(frame.size(), app.router.is_drawer_open());

    render_header(frame, app, layout.header);
    render_bar(frame, app, NavSurface::TopNav, layout.top_nav, false);
    render_body(frame, app, layout.body);
    render_bar(frame, app, NavSurface::Dock, layout.dock, true);
    render_footer(frame, app, layout.footer);

    render_overlays(frame, app, &layout);
}

fn render_overlays(frame: &mut Frame, app: &App, layout: &PageLayout) {
    if let Some(drawer) = layout.drawer {
        render_drawer(frame, app, drawer);
    }
    if app.current_screen == Screen::Links {
        render_links_popup(frame, app, layout.body);
    }
}

// ============================================================================
// Header : marque, fragment, statistiques en direct
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.router.history();
    let arrow = |enabled: bool, symbol: &'static str| {
        if enabled {
            Span::styled(symbol, Style::default().fg(Color::White))
        } else {
            Span::styled(symbol, Style::default().fg(Color::DarkGray))
        }
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", app.brand), key_style(GOLD)),
        arrow(history.can_go_back(), "◀"),
        arrow(history.can_go_forward(), "▶"),
        Span::styled(format!(" {} ", app.router.fragment()), Style::default().fg(Color::Cyan)),
    ];

    if app.is_preparing_whitepaper() {
        spans.push(Span::styled(" Preparing... ", key_style(Color::Yellow)));
    }

    // Bandeau des valeurs projetées
    for stat in app.ticker.stats() {
        let Some(slot) = stat.slot.as_deref() else {
            continue;
        };
        let Some(text) = app.board.get(slot) else {
            continue;
        };
        spans.push(Span::styled(format!(" {} ", stat.label), Style::default().fg(Color::Gray)));
        spans.push(Span::styled(text.to_string(), value_style(app, slot)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Valeur mise à jour récemment : mise en évidence brève
fn value_style(app: &App, slot: &str) -> Style {
    if app.board.is_fresh(slot, PULSE_DURATION) {
        key_style(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

// ============================================================================
// Barres de navigation (haut et dock)
// ============================================================================

fn render_bar(frame: &mut Frame, app: &App, surface: NavSurface, area: Rect, bordered: bool) {
    let area = if bordered {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        inner
    } else {
        area
    };

    let items: Vec<_> = app.router.affordances_on(surface).map(|(_, a)| a).collect();
    for (cell, item) in nav_cells(area, items.len()).into_iter().zip(items) {
        let style = if item.active {
            key_style(GOLD).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Gray)
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(item.label.as_str(), style))).alignment(Alignment::Center);
        frame.render_widget(paragraph, cell);
    }
}

// ============================================================================
// Page empilée
// ============================================================================
// Chaque section occupe exactement `height` lignes : le rendu et le
// Viewport partagent la même géométrie.
// ============================================================================

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let lines: Vec<Line> = app
        .router
        .sections()
        .iter()
        .flat_map(|section| section_lines(app, section, width))
        .collect();

    let offset = app.router.viewport().offset().min(u16::MAX as u32) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}

/// Lignes d'une section, complétées ou tronquées à sa hauteur
fn section_lines<'a>(app: &'a App, section: &'a Section, width: usize) -> Vec<Line<'a>> {
    let title_style = if section.active {
        key_style(GOLD)
    } else {
        key_style(Color::White)
    };
    let marker = if section.active { "▌ " } else { "  " };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(GOLD)),
            Span::styled(section.title.as_str(), title_style),
        ]),
        Line::from(Span::styled("─".repeat(width), Style::default().fg(Color::DarkGray))),
    ];

    lines.extend(
        section
            .body
            .iter()
            .map(|text| Line::from(format!("  {}", text))),
    );

    match section.kind {
        SectionKind::Text => {}
        SectionKind::Stats => lines.extend(stats_lines(app)),
        SectionKind::Form => lines.extend(form_lines(app)),
        SectionKind::Links => lines.extend(links_lines(app)),
    }

    let height = section.height as usize;
    lines.truncate(height);
    lines.resize(height, Line::from(""));
    lines
}

fn stats_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("  {:<14}{:>14}", "Stat", "Value"),
        Style::default().fg(Color::DarkGray),
    ))];

    for stat in app.ticker.stats() {
        let (text, style) = match stat.slot.as_deref() {
            Some(slot) => (
                app.board.get(slot).map(str::to_string).unwrap_or_else(|| "—".to_string()),
                value_style(app, slot),
            ),
            None => ("—".to_string(), Style::default().fg(Color::DarkGray)),
        };
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<14}", stat.label)),
            Span::styled(format!("{:>14}", text), style),
        ]));
    }
    lines
}

fn form_lines(app: &App) -> Vec<Line<'_>> {
    let identifier_label = match app.form.kind() {
        FieldKind::Email => "Email",
        FieldKind::Wallet => "Wallet",
    };
    let fields = [
        (FormField::Identifier, identifier_label),
        (FormField::Email, "Contact (optional)"),
        (FormField::Note, "Note (optional)"),
    ];

    let mut lines = vec![Line::from("")];
    for (field, label) in fields {
        let focused = app.is_in_form() && app.focus == field;
        let in_error = app.field_error.is_some_and(|(f, _)| f == field);

        let label_style = if in_error {
            key_style(Color::Red)
        } else if focused {
            key_style(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(format!("  {:<20}", label), label_style),
            Span::styled(format!("[{}", app.fields.field(field)), Style::default().fg(Color::White)),
        ];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)));
        }
        spans.push(Span::styled("]", Style::default().fg(Color::White)));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(if app.is_in_form() {
        Line::from(vec![
            Span::styled("  [Tab]", key_style(Color::Yellow)),
            Span::raw(" Next field  "),
            Span::styled("[Enter]", key_style(Color::Green)),
            Span::raw(" Register  "),
            Span::styled("[ESC]", key_style(Color::Red)),
            Span::raw(" Cancel"),
        ])
    } else {
        Line::from(vec![
            Span::styled("  [i]", key_style(Color::Green)),
            Span::raw(" Pre-register"),
        ])
    });
    lines
}

fn links_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from("")];
    lines.extend(app.links.iter().enumerate().map(|(i, link)| {
        Line::from(vec![
            Span::styled(format!("  [{}] ", i + 1), key_style(Color::Yellow)),
            Span::styled(link.name.as_str(), Style::default().fg(Color::White)),
            Span::styled(format!("  {}", link.url), Style::default().fg(Color::DarkGray)),
        ])
    }));
    lines
}

// ============================================================================
// Footer : message, confirmation ou raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", key_style(Color::Yellow)),
            Span::styled(
                "[q]",
                key_style(Color::Red).add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel ⚠", key_style(Color::Yellow)),
        ])
    } else if let Some(flash) = &app.flash {
        let color = match flash.kind {
            FlashKind::Success => Color::Green,
            FlashKind::Error => Color::Red,
            FlashKind::Info => Color::Cyan,
        };
        Line::from(Span::styled(flash.text.as_str(), key_style(color)))
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key_style(Color::Yellow)),
            Span::raw(" Scroll  "),
            Span::styled("[h l]", key_style(Color::Yellow)),
            Span::raw(" Back/Fwd  "),
            Span::styled("[m]", key_style(Color::Yellow)),
            Span::raw(" Menu  "),
            Span::styled("[i]", key_style(Color::Green)),
            Span::raw(" Register  "),
            Span::styled("[w]", key_style(Color::Yellow)),
            Span::raw(" Whitepaper  "),
            Span::styled("[o]", key_style(Color::Yellow)),
            Span::raw(" Links  "),
            Span::styled("[c]", key_style(Color::Yellow)),
            Span::raw(" Wallet"),
        ])
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

// ============================================================================
// Overlays
// ============================================================================

/// Tiroir latéral (menu hamburger)
fn render_drawer(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .router
        .affordances_on(NavSurface::Sidebar)
        .enumerate()
        .map(|(position, (_, item))| {
            let mut style = if item.active {
                key_style(GOLD)
            } else {
                Style::default().fg(Color::White)
            };
            if position == app.drawer_selection {
                style = style.add_modifier(Modifier::REVERSED);
            }
            ListItem::new(format!(" {}", item.label)).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GOLD))
        .title(" Menu ");

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(block), area);
}

/// Popup des liens externes
fn render_links_popup(frame: &mut Frame, app: &App, body: Rect) {
    let height = (app.links.len() as u16 + 4).min(body.height);
    let width = 48.min(body.width);
    let area = Rect {
        x: body.x + (body.width - width) / 2,
        y: body.y + (body.height - height) / 2,
        width,
        height,
    };

    let mut lines = links_lines(app);
    lines.push(Line::from(vec![
        Span::styled("  [1-9]", key_style(Color::Green)),
        Span::raw(" Open  "),
        Span::styled("[ESC]", key_style(Color::Red)),
        Span::raw(" Close"),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Links ");

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::storage::MemoryLog;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(&PageConfig::default(), Box::new(MemoryLog::default())).unwrap()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_sections_fill_their_height() {
        let app = app();
        for section in app.router.sections() {
            assert_eq!(section_lines(&app, section, 40).len(), section.height as usize);
        }
    }

    #[test]
    fn test_render_page() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        app.router.set_viewport_height(24);

        terminal.draw(|frame| render(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("GOLDEN TOKEN"));
        assert!(text.contains("#home"));
        assert!(text.contains("$4.2M"));

        app.toggle_drawer();
        app.show_links();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Menu"));
        assert!(text.contains("Telegram"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let mut app = app();
        app.toggle_drawer();
        app.show_links();
        let mut terminal = Terminal::new(TestBackend::new(10, 6)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
