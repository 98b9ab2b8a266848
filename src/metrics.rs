// ============================================================================
// Sélection des métriques
// ============================================================================
// Liste les colonnes traçables d'une table (valeurs uniformément numériques)
// ============================================================================

use crate::models::{is_identifier_column, Cell, Table};

/// Colonnes traçables, dans l'ordre de la table
///
/// Une colonne est traçable si toutes ses cellules sont des nombres ou
/// absentes (au moins un nombre), et si ce n'est pas un identifiant.
pub fn plottable_columns(table: &Table) -> Vec<&str> {
    table
        .columns()
        .iter()
        .filter(|name| !is_identifier_column(name))
        .filter(|name| is_numeric_column(table, name))
        .map(String::as_str)
        .collect()
}

fn is_numeric_column(table: &Table, name: &str) -> bool {
    let Some(cells) = table.column(name) else {
        return false;
    };

    let mut has_number = false;
    for cell in cells {
        match cell {
            Cell::Number(_) => has_number = true,
            Cell::Missing => {}
            Cell::Text(_) | Cell::Date(_) => return false,
        }
    }
    has_number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpectedShape;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_revenue_is_plottable() {
        let raw = json!([
            {"date": "2023-12-31", "symbol": "AAPL", "revenue": "383285000000"},
            {"date": "2022-12-31", "symbol": "AAPL", "revenue": "394328000000"}
        ]);
        let table = normalize(&raw, ExpectedShape::List).unwrap();

        assert_eq!(plottable_columns(&table), vec!["revenue"]);
    }

    #[test]
    fn test_mixed_column_excluded() {
        let table = Table::new(
            vec!["mixed".into(), "clean".into(), "empty".into()],
            vec![
                vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Missing],
                vec![Cell::Text("n/a".into()), Cell::Missing, Cell::Missing],
            ],
        );

        let columns = plottable_columns(&table);
        assert_eq!(columns, vec!["clean"]);

        // Aucune colonne retenue ne contient de valeur non numérique
        for name in columns {
            assert!(table
                .column(name)
                .unwrap()
                .all(|c| matches!(c, Cell::Number(_) | Cell::Missing)));
        }
    }

    #[test]
    fn test_numeric_identifier_excluded() {
        let table = Table::new(
            vec!["cik".into(), "score".into()],
            vec![vec![Cell::Number(320193.0), Cell::Number(7.0)]],
        );
        assert_eq!(plottable_columns(&table), vec!["score"]);
    }
}
