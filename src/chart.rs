// ============================================================================
// Chart - Modèle de graphique
// ============================================================================
// Construit les points à tracer à partir d'une Table et d'une colonne
// choisie. Le dessin lui-même est fait par ui::chart (ratatui).
//
// CONCEPTS RUST :
// 1. Séparation modèle / rendu : testable sans terminal
// 2. Result<Chart, RenderError> : colonne absente ou pas d'axe des temps
// ============================================================================

use std::fmt;

use chrono::NaiveDate;

use crate::error::RenderError;
use crate::metrics::plottable_columns;
use crate::models::Table;

/// Type de graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Courbe ordonnée par date (nécessite une colonne date)
    TimeSeries,
    /// Barres, une par ligne de la table
    Categorical,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::TimeSeries => f.write_str("time-series"),
            ChartKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Un point (ou une barre) du graphique
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Libellé (date, symbole, nom de champ)
    pub label: String,
    /// Date du point pour les séries temporelles
    pub date: Option<NaiveDate>,
    pub value: f64,
}

/// Graphique prêt à dessiner
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    /// Colonne tracée ("Metric" pour une décomposition par champ)
    pub column: String,
    pub points: Vec<ChartPoint>,
}

impl Chart {
    /// Bornes (min, max) des valeurs
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.value;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), p| (min.min(p.value), max.max(p.value))),
        )
    }

    /// Points (x, y) pour un tracé en ligne : x = jours depuis l'an 1
    pub fn line_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = p
                    .date
                    .map(|d| f64::from(chrono::Datelike::num_days_from_ce(&d)))
                    .unwrap_or(i as f64);
                (x, p.value)
            })
            .collect()
    }
}

/// Construit le graphique d'une colonne
///
/// # Erreurs
/// * `RenderError::MissingColumn` - la colonne n'existe pas dans la table
/// * `RenderError::NoDateAxis` - série temporelle demandée sans colonne date
/// * `RenderError::NoData` - aucune valeur numérique à tracer
pub fn render_chart(table: &Table, column: &str, kind: ChartKind) -> Result<Chart, RenderError> {
    if !table.has_column(column) {
        return Err(RenderError::MissingColumn(column.to_string()));
    }

    let points: Vec<ChartPoint> = match kind {
        ChartKind::TimeSeries => {
            if table.date_column().is_none() {
                return Err(RenderError::NoDateAxis);
            }

            let mut points: Vec<ChartPoint> = (0..table.len())
                .filter_map(|row| {
                    let date = table.row_date(row)?;
                    let value = table.cell(row, column)?.as_number()?;
                    Some(ChartPoint {
                        label: date.format("%Y-%m-%d").to_string(),
                        date: Some(date),
                        value,
                    })
                })
                .collect();

            // La table est déjà triée par le normaliseur, mais une Table
            // construite à la main peut ne pas l'être
            points.sort_by_key(|p| p.date);
            points
        }
        ChartKind::Categorical => (0..table.len())
            .filter_map(|row| {
                let value = table.cell(row, column)?.as_number()?;
                Some(ChartPoint {
                    label: table.row_label(row),
                    date: table.row_date(row),
                    value,
                })
            })
            .collect(),
    };

    if points.is_empty() {
        return Err(RenderError::NoData(column.to_string()));
    }

    let title = match kind {
        ChartKind::TimeSeries => format!("{} Over Time", column),
        ChartKind::Categorical => column.to_string(),
    };

    Ok(Chart {
        kind,
        title,
        column: column.to_string(),
        points,
    })
}

/// Décompose la première ligne en une barre par champ numérique
///
/// Utile pour les endpoints "snapshot" (une seule ligne) : Valuation,
/// Ratings, DCF, scores.
pub fn field_breakdown(table: &Table) -> Result<Chart, RenderError> {
    let points: Vec<ChartPoint> = plottable_columns(table)
        .into_iter()
        .filter_map(|name| {
            let value = table.cell(0, name)?.as_number()?;
            Some(ChartPoint {
                label: name.to_string(),
                date: None,
                value,
            })
        })
        .collect();

    if points.is_empty() {
        return Err(RenderError::NoData("Metric".to_string()));
    }

    Ok(Chart {
        kind: ChartKind::Categorical,
        title: "Metrics".to_string(),
        column: "Metric".to_string(),
        points,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================
