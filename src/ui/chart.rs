// ============================================================================
// Chart - Rendu d'un graphique construit par crate::chart
// ============================================================================
// Série temporelle : ligne (Chart widget), x = date.
// Catégoriel : barres (BarChart widget), une par ligne ou par champ.
//
// CONCEPTS RUST :
// 1. Séparation modèle / rendu : crate::chart calcule, ce module dessine
// 2. Result en entrée : une RenderError devient un panneau d'erreur
//
// CONCEPTS RATATUI :
// 1. Chart / Dataset / Axis pour les lignes
// 2. BarChart / BarGroup / Bar pour les barres
// ============================================================================

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart as ChartWidget, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::chart::{Chart, ChartKind};
use crate::error::RenderError;
use crate::models::format_compact;

/// Hauteur logique des barres (BarChart ne prend que des u64)
const BAR_SCALE: f64 = 1000.0;

/// Dessine un graphique, ou le panneau d'erreur correspondant
pub fn render_chart(frame: &mut Frame, chart: &Result<Chart, RenderError>, area: Rect) {
    match chart {
        Ok(chart) => match chart.kind {
            ChartKind::TimeSeries => render_line(frame, chart, area),
            ChartKind::Categorical => render_bars(frame, chart, area),
        },
        Err(e) => render_no_data(frame, area, &e.to_string()),
    }
}

// ============================================================================
// Série temporelle
// ============================================================================

fn render_line(frame: &mut Frame, chart: &Chart, area: Rect) {
    let points = chart.line_points();

    let Some((min_value, max_value)) = chart.value_bounds() else {
        render_no_data(frame, area, "No data to display");
        return;
    };

    // Ajoute une marge de 5% pour que le graphique respire
    let margin = ((max_value - min_value) * 0.05).max(f64::EPSILON);
    let (y_min, y_max) = if min_value == max_value {
        (min_value - 1.0, max_value + 1.0)
    } else {
        (min_value - margin, max_value + margin)
    };

    let (x_min, x_max) = points.iter().fold((f64::MAX, f64::MIN), |(min, max), &(x, _)| {
        (min.min(x), max.max(x))
    });
    let (x_min, x_max) = if x_min >= x_max {
        (x_min - 1.0, x_max + 1.0)
    } else {
        (x_min, x_max)
    };

    let color = if points.last().map(|p| p.1) >= points.first().map(|p| p.1) {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name(chart.column.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let first = chart.points.first().map(|p| p.label.clone()).unwrap_or_default();
    let last = chart.points.last().map(|p| p.label.clone()).unwrap_or_default();
    let middle = date_label((x_min + x_max) / 2.0);

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(vec![Span::raw(first), Span::raw(middle), Span::raw(last)]);

    let y_axis = Axis::default()
        .title(chart.column.as_str())
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_compact(y_min)),
            Span::raw(format_compact((y_min + y_max) / 2.0)),
            Span::raw(format_compact(y_max)),
        ]);

    let widget = ChartWidget::new(datasets)
        .block(chart_block(chart))
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(widget, area);
}

/// Libellé d'une abscisse (jours depuis l'an 1)
fn date_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ============================================================================
// Barres
// ============================================================================

/// Largeur des barres selon la place et le nombre de points
fn bar_width(area: Rect, count: usize) -> u16 {
    let inner = usize::from(area.width.saturating_sub(2));
    let per_bar = inner / count.max(1);
    per_bar.saturating_sub(1).clamp(3, 12) as u16
}

fn render_bars(frame: &mut Frame, chart: &Chart, area: Rect) {
    let max_abs = chart
        .points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max);

    // Trop de barres : on garde les dernières qui tiennent
    let width = bar_width(area, chart.points.len());
    let capacity = (usize::from(area.width.saturating_sub(2)) / usize::from(width + 1)).max(1);
    let skip = chart.points.len().saturating_sub(capacity);

    let bars: Vec<Bar> = chart
        .points
        .iter()
        .skip(skip)
        .map(|p| {
            let height = if max_abs > 0.0 {
                (p.value.abs() / max_abs * BAR_SCALE).round() as u64
            } else {
                0
            };
            let color = if p.value < 0.0 { Color::Red } else { Color::Green };
            let label: String = p.label.chars().take(usize::from(width)).collect();

            Bar::default()
                .value(height)
                .text_value(format_compact(p.value))
                .label(Line::from(label))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let widget = BarChart::default()
        .block(chart_block(chart))
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(1)
        .max(BAR_SCALE as u64);

    frame.render_widget(widget, area);
}

fn chart_block(chart: &Chart) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} ", chart.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

/// Affiche un message quand il n'y a rien à tracer
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "[ESC] Back  [c] Chart type  [←→] Metric",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartPoint;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(chart: &Result<Chart, RenderError>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| render_chart(f, chart, f.size()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn bars() -> Chart {
        Chart {
            kind: ChartKind::Categorical,
            title: "Ratings".into(),
            column: "ratingScore".into(),
            points: vec![
                ChartPoint { label: "AAPL".into(), date: None, value: 5.0 },
                ChartPoint { label: "MSFT".into(), date: None, value: -2.0 },
            ],
        }
    }

    #[test]
    fn test_bar_width_bounds() {
        let area = Rect::new(0, 0, 80, 20);
        assert_eq!(bar_width(area, 2), 12);
        assert_eq!(bar_width(area, 500), 3);
    }

    #[test]
    fn test_render_bars_shows_title_and_labels() {
        let text = draw(&Ok(bars()));
        assert!(text.contains("Ratings"));
        assert!(text.contains("AAPL"));
    }

    #[test]
    fn test_render_error_panel() {
        let text = draw(&Err(RenderError::NoDateAxis));
        assert!(text.contains(&RenderError::NoDateAxis.to_string()));
    }

    #[test]
    fn test_date_label_round_trips_day_number() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let x = f64::from(chrono::Datelike::num_days_from_ce(&date));
        assert_eq!(date_label(x), "2023-12-31");
    }
}
