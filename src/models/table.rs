// ============================================================================
// Structure : Table
// ============================================================================
// Réponse d'un endpoint après normalisation : colonnes ordonnées et lignes
// de cellules typées
//
// CONCEPTS RUST :
// 1. Enum avec données : une cellule est texte, nombre, date ou absente
// 2. Invariant porté par le constructeur : chaque ligne a une cellule par colonne
// 3. Iterators : accès en colonne sans copier les données
// ============================================================================

use std::fmt;

use chrono::NaiveDate;

/// Colonnes d'identifiant : jamais converties en nombre, jamais tracées
pub const IDENTIFIER_COLUMNS: [&str; 2] = ["symbol", "cik"];

/// Vérifie si un nom de colonne est un identifiant (insensible à la casse)
pub fn is_identifier_column(name: &str) -> bool {
    IDENTIFIER_COLUMNS
        .iter()
        .any(|id| id.eq_ignore_ascii_case(name))
}

/// Valeur d'une cellule
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// null, clé absente, ou conversion échouée
    Missing,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => f.write_str(&format_compact(*v)),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Missing => f.write_str("—"),
        }
    }
}

/// Formate un nombre de manière compacte pour l'affichage
///
/// Ex: 383285000000.0 -> "383.29B", 0.2531 -> "0.2531", 12.0 -> "12"
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e4 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };

    if suffix.is_empty() {
        if value.fract() == 0.0 {
            format!("{}", value as i64)
        } else {
            let text = format!("{:.4}", value);
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    } else {
        format!("{:.2}{}", scaled, suffix)
    }
}

/// Table normalisée (Financial Record Table)
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    /// Index de la colonne date désignée (axe des temps)
    date_column: Option<usize>,
}

impl Table {
    /// Construit une table en complétant les lignes courtes par Missing
    ///
    /// CONCEPT RUST : resize() sur un Vec
    /// - Garantit l'invariant "toutes les lignes ont le même jeu de colonnes"
    /// - Les cellules en trop sont tronquées
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();

        Self {
            columns,
            rows,
            date_column: None,
        }
    }

    /// Désigne la colonne date (ignoré si le nom n'existe pas)
    pub fn with_date_column(mut self, name: &str) -> Self {
        self.date_column = self.column_index(name);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cellules d'une colonne, dans l'ordre des lignes
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell> + 'a> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Nom de la colonne date désignée
    pub fn date_column(&self) -> Option<&str> {
        self.date_column.map(|i| self.columns[i].as_str())
    }

    /// Date de la ligne `row` sur la colonne désignée
    pub fn row_date(&self, row: usize) -> Option<NaiveDate> {
        let index = self.date_column?;
        self.rows.get(row)?[index].as_date()
    }

    /// Libellé court d'une ligne : date, sinon symbole, sinon "#n"
    pub fn row_label(&self, row: usize) -> String {
        if let Some(date) = self.row_date(row) {
            return date.format("%Y-%m-%d").to_string();
        }

        let symbol = self
            .columns
            .iter()
            .position(|c| is_identifier_column(c))
            .and_then(|i| self.rows.get(row).map(|r| &r[i]));

        match symbol {
            Some(Cell::Text(s)) => s.clone(),
            _ => format!("#{}", row + 1),
        }
    }

    /// Tri stable par la colonne date, dates absentes en dernier
    pub fn sort_by_date(&mut self) {
        let Some(index) = self.date_column else {
            return;
        };

        // CONCEPT RUST : Option<T> est Ord, mais None < Some
        // On trie sur (absente?, date) pour renvoyer les None à la fin
        self.rows.sort_by_key(|row| {
            let date = row[index].as_date();
            (date.is_none(), date)
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
