// ============================================================================
// Table - Rendu d'une table normalisée
// ============================================================================
// Affiche une Table transposée : une ligne par champ, une colonne par
// enregistrement (date ou symbole en en-tête), comme un état financier.
//
// CONCEPTS RATATUI :
// 1. Table widget : lignes, en-tête, largeurs de colonnes
// 2. Fenêtrage : on ne construit que les cellules visibles
// ============================================================================

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table as TableWidget},
    Frame,
};

use crate::models::{Cell, Table};

/// Largeur de la colonne des noms de champs
const FIELD_WIDTH: u16 = 28;

/// Largeur d'une colonne d'enregistrement
const RECORD_WIDTH: u16 = 14;

/// Position de la fenêtre d'affichage dans la table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableView {
    /// Premier champ affiché
    pub field_scroll: usize,
    /// Décalage depuis l'enregistrement le plus récent
    pub record_offset: usize,
}

/// Nombre d'enregistrements qui tiennent dans la largeur disponible
fn visible_records(area: Rect) -> usize {
    let inner = area.width.saturating_sub(2 + FIELD_WIDTH);
    usize::from((inner / (RECORD_WIDTH + 1)).max(1))
}

/// Plage d'enregistrements affichés : les plus récents en fin de table
fn record_window(total: usize, visible: usize, offset: usize) -> std::ops::Range<usize> {
    let max_offset = total.saturating_sub(visible);
    let end = total - offset.min(max_offset);
    end.saturating_sub(visible)..end
}

fn cell_style(cell: &Cell) -> Style {
    match cell {
        Cell::Number(v) if *v < 0.0 => Style::default().fg(Color::Red),
        Cell::Number(_) => Style::default().fg(Color::White),
        Cell::Date(_) => Style::default().fg(Color::Cyan),
        Cell::Text(_) => Style::default().fg(Color::Gray),
        Cell::Missing => Style::default().fg(Color::DarkGray),
    }
}

/// Dessine une table dans `area`
pub fn render_table(frame: &mut Frame, table: &Table, title: &str, view: TableView, area: Rect) {
    if table.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No records", Style::default().fg(Color::Gray))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", title)),
        )
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let window = record_window(table.len(), visible_records(area), view.record_offset);
    let date_column = table.date_column();

    // En-tête : libellé de chaque enregistrement visible
    let header = Row::new(
        std::iter::once(TableCell::from("Field")).chain(
            window
                .clone()
                .map(|row| TableCell::from(table.row_label(row))),
        ),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    // Une ligne par champ ; la colonne date est déjà dans l'en-tête
    let rows: Vec<Row> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| Some(name.as_str()) != date_column)
        .skip(view.field_scroll)
        .map(|(col, name)| {
            let cells = window.clone().map(|row| {
                let cell = &table.rows()[row][col];
                TableCell::from(cell.to_string()).style(cell_style(cell))
            });
            Row::new(
                std::iter::once(
                    TableCell::from(name.clone()).style(Style::default().fg(Color::Cyan)),
                )
                .chain(cells),
            )
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(FIELD_WIDTH))
        .chain(window.clone().map(|_| Constraint::Length(RECORD_WIDTH)))
        .collect();

    let block_title = if window.len() < table.len() {
        format!(
            " {} ({}-{} of {} records) ",
            title,
            window.start + 1,
            window.end,
            table.len()
        )
    } else {
        format!(" {} ", title)
    };

    let widget = TableWidget::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(block_title),
        );

    frame.render_widget(widget, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn income() -> Table {
        let date = |y| Cell::Date(NaiveDate::from_ymd_opt(y, 12, 31).unwrap());
        Table::new(
            vec!["date".into(), "symbol".into(), "revenue".into()],
            vec![
                vec![date(2022), Cell::Text("AAPL".into()), Cell::Number(394_328_000_000.0)],
                vec![date(2023), Cell::Text("AAPL".into()), Cell::Number(383_285_000_000.0)],
            ],
        )
        .with_date_column("date")
    }

    #[test]
    fn test_record_window_keeps_most_recent() {
        assert_eq!(record_window(10, 4, 0), 6..10);
        assert_eq!(record_window(10, 4, 2), 4..8);
        // Décalage borné : jamais avant le premier enregistrement
        assert_eq!(record_window(10, 4, 50), 0..4);
        assert_eq!(record_window(2, 4, 0), 0..2);
    }

    #[test]
    fn test_render_table_shows_fields_and_dates() {
        let backend = TestBackend::new(100, 10);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|f| render_table(f, &income(), "Income Statement", TableView::default(), f.size()))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("revenue"));
        assert!(text.contains("2023-12-31"));
        assert!(text.contains("383.29B"));
        assert!(text.contains("Income Statement"));
    }

    #[test]
    fn test_render_empty_table() {
        let backend = TestBackend::new(40, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let empty = Table::new(vec!["date".into()], vec![]);

        terminal
            .draw(|f| render_table(f, &empty, "Key Metrics", TableView::default(), f.size()))
            .unwrap();

        assert!(buffer_text(terminal.backend().buffer()).contains("No records"));
    }
}
