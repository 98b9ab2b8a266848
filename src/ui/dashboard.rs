// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// CONCEPTS RUST :
// 1. Routing avec match sur enum : un écran par variant de Screen
// 2. &App : le rendu lit l'état, ne le modifie jamais
// 3. Builder pattern : construction fluide des widgets
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::ui::chart::render_chart;
use crate::ui::table::{render_table, TableView};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Match exhaustif
/// - Le compilateur force à gérer tous les variants de Screen
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    match app.current_screen {
        Screen::Input => render_input(frame, app, chunks[1]),
        Screen::Results => render_results(frame, app, chunks[1]),
        Screen::ChartView => render_chart_view(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec() // Convertit Rc<[Rect]> en Vec<Rect>
}

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Header
// ============================================================================

/// Dessine le header : titre, ticker courant, état du chargement
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Finscope ")
        .title_alignment(Alignment::Center);

    let mut spans = vec![Span::styled(
        "Financial data explorer",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];

    if let Some(results) = &app.results {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            results.ticker.to_string(),
            key_style(Color::Yellow),
        ));
        spans.push(Span::raw(format!(
            "  {} loaded, {} failed",
            results.succeeded(),
            results.failed()
        )));
    }

    if app.is_loading_data() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            app.loading_message
                .clone()
                .unwrap_or_else(|| "Loading...".to_string()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Écran de saisie
// ============================================================================

/// Dessine la saisie du ticker
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)) // Vert pour indiquer mode input
        .title(" Search ");

    let mut text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(&app.input_prompt, key_style(Color::Cyan)),
            Span::styled(&app.input_buffer, Style::default().fg(Color::White)),
            Span::styled(
                "█", // Curseur
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ),
        ]),
        Line::from(""),
    ];

    if let Some(warning) = &app.warning {
        text.push(Line::from(Span::styled(
            format!("⚠ {}", warning),
            key_style(Color::Yellow),
        )));
    }

    if app.is_loading_data() {
        text.push(Line::from(Span::styled(
            app.loading_message.as_deref().unwrap_or("Loading..."),
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Écran Results : endpoints + table
// ============================================================================

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(area);

    render_endpoint_list(frame, app, chunks[0]);
    render_endpoint_panel(frame, app, chunks[1]);
}

/// Liste des endpoints : ✓ chargé, ✗ en échec
fn render_endpoint_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Endpoints ");

    let items: Vec<ListItem> = app
        .outcomes()
        .iter()
        .enumerate()
        .map(|(index, outcome)| {
            let (mark, color) = if outcome.is_success() {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };

            let style = Style::default().fg(color);
            let item = ListItem::new(format!(" {} {}", mark, outcome.name())).style(style);

            if index == app.selected_index {
                item.style(style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Table de l'endpoint sélectionné, ou son avis d'échec
fn render_endpoint_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(outcome) = app.selected_outcome() else {
        return;
    };

    match &outcome.result {
        Ok(table) => {
            let view = TableView {
                field_scroll: app.field_scroll,
                record_offset: app.record_offset,
            };
            render_table(frame, table, outcome.name(), view, area);
        }
        Err(e) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" {} ", outcome.name()));

            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    outcome.notice().unwrap_or_default(),
                    key_style(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Gray))),
            ];

            let paragraph = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }
}

// ============================================================================
// Écran ChartView
// ============================================================================

fn render_chart_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let endpoint = app.selected_outcome().map(|o| o.name()).unwrap_or("?");
    let metric = app.selected_metric().unwrap_or("-");
    let metric_count = app.metrics().len();

    let info = Paragraph::new(Line::from(vec![
        Span::styled(endpoint, key_style(Color::Cyan)),
        Span::raw("  metric: "),
        Span::styled(metric, key_style(Color::Yellow)),
        Span::raw(format!(
            " ({}/{})",
            (app.metric_index + 1).min(metric_count),
            metric_count
        )),
        Span::raw("  mode: "),
        Span::styled(app.chart_mode.label(), key_style(Color::Magenta)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .alignment(Alignment::Center);
    frame.render_widget(info, chunks[0]);

    match app.current_chart() {
        Some(chart) => render_chart(frame, &chart, chunks[1]),
        None => {
            let notice = app
                .selected_outcome()
                .and_then(|o| o.notice())
                .unwrap_or_else(|| "No data".to_string());
            crate::ui::chart::render_no_data(frame, chunks[1], &notice);
        }
    }
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    // CONCEPT : Confirmation de quit two-step
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", key_style(Color::Yellow)),
            Span::styled(
                "[q]",
                key_style(Color::Red).add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel ⚠", key_style(Color::Yellow)),
        ])
    } else {
        match app.current_screen {
            Screen::Input => {
                let esc = if app.results.is_some() { " Back" } else { " Quit" };
                Line::from(vec![
                    Span::styled("[Enter]", key_style(Color::Green)),
                    Span::raw(" Search  "),
                    Span::styled("[ESC]", key_style(Color::Red)),
                    Span::raw(esc),
                ])
            }
            Screen::Results => Line::from(vec![
                Span::styled("[q]", key_style(Color::Yellow)),
                Span::raw(" Quit  "),
                Span::styled("[↑↓ / j k]", key_style(Color::Yellow)),
                Span::raw(" Endpoint  "),
                Span::styled("[Enter]", key_style(Color::Yellow)),
                Span::raw(" Chart  "),
                Span::styled("[PgUp PgDn]", key_style(Color::Yellow)),
                Span::raw(" Fields  "),
                Span::styled("[ [ ] ]", key_style(Color::Yellow)),
                Span::raw(" Records  "),
                Span::styled("[/]", key_style(Color::Green)),
                Span::raw(" New search"),
            ]),
            Screen::ChartView => Line::from(vec![
                Span::styled("[q]", key_style(Color::Yellow)),
                Span::raw(" Quit  "),
                Span::styled("[ESC]", key_style(Color::Yellow)),
                Span::raw(" Back  "),
                Span::styled("[←→ / h l]", key_style(Color::Yellow)),
                Span::raw(" Metric  "),
                Span::styled("[c]", key_style(Color::Yellow)),
                Span::raw(" Chart type  "),
                Span::styled("[↑↓]", key_style(Color::Yellow)),
                Span::raw(" Endpoint"),
            ]),
        }
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
