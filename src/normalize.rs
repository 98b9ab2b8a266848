// ============================================================================
// Normalisation des réponses JSON
// ============================================================================
// Transforme un payload FMP (liste d'objets, liste à un élément, objet nu)
// en Table uniforme
//
// CONCEPTS RUST :
// 1. Match sur tuple (forme attendue, valeur reçue) : pas d'inspection ad hoc
// 2. Emprunts : on lit le serde_json::Value sans le copier
// 3. Tolérance : une conversion ratée donne Cell::Missing, pas une erreur
// ============================================================================

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::NormalizeError;
use crate::models::{is_identifier_column, Cell, EndpointDescriptor, ExpectedShape, Table};

type Record = Map<String, Value>;

/// Type de colonne déduit des valeurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Identifier,
    Date,
    Numeric,
    Text,
}

/// Normalise la réponse d'un endpoint en tenant compte de sa clé englobante
///
/// Si l'endpoint déclare une payload_key, les enregistrements sont lus sous
/// cette clé. Une clé absente équivaut à une liste vide.
pub fn normalize_endpoint(
    raw: &Value,
    endpoint: &EndpointDescriptor,
) -> Result<Table, NormalizeError> {
    let Some(key) = endpoint.payload_key else {
        return normalize(raw, endpoint.shape);
    };

    match raw {
        Value::Object(map) => match map.get(key) {
            Some(inner) => normalize(inner, endpoint.shape),
            None => {
                debug!(endpoint = endpoint.name, key, "Payload key absent, treating as empty");
                normalize(&Value::Array(Vec::new()), endpoint.shape)
            }
        },
        other => Err(NormalizeError::ShapeMismatch {
            expected: endpoint.shape,
            found: format!("{} without '{}' key", json_kind(other), key),
        }),
    }
}

/// Normalise un payload JSON selon la forme attendue
///
/// # Erreurs
/// * `NormalizeError::Empty` - forme Singleton et tableau vide
/// * `NormalizeError::ShapeMismatch` - le payload n'a pas la forme attendue
pub fn normalize(raw: &Value, shape: ExpectedShape) -> Result<Table, NormalizeError> {
    let records = extract_records(raw, shape)?;
    let columns = collect_columns(&records);

    // CONCEPT RUST : Iterator + collect
    // - Chaque colonne est classée une seule fois, avant de construire les lignes
    let kinds: Vec<ColumnKind> = columns
        .iter()
        .map(|name| classify_column(name, &records))
        .collect();

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .zip(&kinds)
                .map(|(name, kind)| convert_cell(record.get(name.as_str()), *kind))
                .collect()
        })
        .collect();

    let date_column = designated_date_column(&columns, &kinds).map(str::to_string);

    let mut table = Table::new(columns, rows);
    if let Some(name) = date_column {
        table = table.with_date_column(&name);
        table.sort_by_date();
    }

    debug!(
        shape = %shape,
        rows = table.len(),
        columns = table.columns().len(),
        date_column = table.date_column().unwrap_or("-"),
        "Normalized payload"
    );
    Ok(table)
}

// ============================================================================
// Extraction des enregistrements
// ============================================================================

fn extract_records(raw: &Value, shape: ExpectedShape) -> Result<Vec<&Record>, NormalizeError> {
    match (shape, raw) {
        (ExpectedShape::List, Value::Array(items)) => items
            .iter()
            .map(|item| as_record(item, shape))
            .collect(),

        (ExpectedShape::Singleton, Value::Array(items)) => {
            let first = items.first().ok_or(NormalizeError::Empty)?;
            Ok(vec![as_record(first, shape)?])
        }

        (ExpectedShape::Object, Value::Object(map)) => Ok(vec![map]),

        (expected, other) => Err(NormalizeError::ShapeMismatch {
            expected,
            found: json_kind(other).to_string(),
        }),
    }
}

fn as_record(item: &Value, shape: ExpectedShape) -> Result<&Record, NormalizeError> {
    item.as_object().ok_or_else(|| NormalizeError::ShapeMismatch {
        expected: shape,
        found: format!("array containing {}", json_kind(item)),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Union des clés, dans l'ordre de première apparition
fn collect_columns(records: &[&Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

// ============================================================================
// Classification des colonnes
// ============================================================================

fn classify_column(name: &str, records: &[&Record]) -> ColumnKind {
    if is_identifier_column(name) {
        return ColumnKind::Identifier;
    }

    let values: Vec<&Value> = records
        .iter()
        .filter_map(|r| r.get(name))
        .filter(|v| !v.is_null())
        .collect();

    if name.eq_ignore_ascii_case("date") {
        return ColumnKind::Date;
    }

    let all_dates = !values.is_empty()
        && values
            .iter()
            .all(|v| v.as_str().and_then(parse_date).is_some());
    if all_dates {
        return ColumnKind::Date;
    }

    // Coercion "avec nulls" : majorité de valeurs numériques -> colonne numérique
    let numeric = values.iter().filter(|v| parse_number(v).is_some()).count();
    if numeric > 0 && numeric * 2 > values.len() {
        trace!(column = name, numeric, total = values.len(), "Numeric column");
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

fn designated_date_column<'a>(columns: &'a [String], kinds: &[ColumnKind]) -> Option<&'a str> {
    let dates = || {
        columns
            .iter()
            .zip(kinds)
            .filter(|(_, kind)| **kind == ColumnKind::Date)
            .map(|(name, _)| name.as_str())
    };

    dates()
        .find(|name| name.eq_ignore_ascii_case("date"))
        .or_else(|| dates().next())
}

// ============================================================================
// Conversion des cellules
// ============================================================================

fn convert_cell(value: Option<&Value>, kind: ColumnKind) -> Cell {
    let value = match value {
        None | Some(Value::Null) => return Cell::Missing,
        Some(v) => v,
    };

    match kind {
        ColumnKind::Date => value
            .as_str()
            .and_then(parse_date)
            .map(Cell::Date)
            .unwrap_or(Cell::Missing),
        ColumnKind::Numeric => parse_number(value).map(Cell::Number).unwrap_or(Cell::Missing),
        ColumnKind::Identifier | ColumnKind::Text => Cell::Text(text_of(value)),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Nombre JSON ou chaîne numérique ("383285000000", " 1.5 ")
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    // "NaN" et "inf" se parsent en f64 mais ne sont pas traçables
    number.is_finite().then_some(number)
}

/// Dates FMP : "2023-12-31" ou "2023-12-31 16:00:00"
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.date())
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_income_statement_sorted_and_coerced() {
        let raw = json!([
            {"date": "2023-12-31", "revenue": "383285000000"},
            {"date": "2022-12-31", "revenue": "394328000000"}
        ]);

        let table = normalize(&raw, ExpectedShape::List).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.date_column(), Some("date"));
        assert_eq!(table.row_date(0), Some(date("2022-12-31")));
        assert_eq!(table.row_date(1), Some(date("2023-12-31")));
        assert_eq!(table.cell(0, "revenue"), Some(&Cell::Number(394_328_000_000.0)));
    }

    #[test]
    fn test_row_count_per_shape() {
        let list = json!([{"a": 1}, {"a": 2}, {"a": 3}]);
        assert_eq!(normalize(&list, ExpectedShape::List).unwrap().len(), 3);

        let singleton = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(normalize(&singleton, ExpectedShape::Singleton).unwrap().len(), 1);

        let object = json!({"a": 1, "b": "x"});
        assert_eq!(normalize(&object, ExpectedShape::Object).unwrap().len(), 1);

        let empty = json!([]);
        assert!(normalize(&empty, ExpectedShape::List).unwrap().is_empty());
    }

    #[test]
    fn test_singleton_empty_fails() {
        let err = normalize(&json!([]), ExpectedShape::Singleton).unwrap_err();
        assert_eq!(err, NormalizeError::Empty);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = normalize(&json!({"date": "2023-12-31"}), ExpectedShape::List).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::ShapeMismatch {
                expected: ExpectedShape::List,
                found: "object".to_string(),
            }
        );

        let err = normalize(&json!([{"a": 1}]), ExpectedShape::Object).unwrap_err();
        assert!(matches!(err, NormalizeError::ShapeMismatch { .. }));

        let err = normalize(&json!([1, 2]), ExpectedShape::List).unwrap_err();
        assert!(matches!(err, NormalizeError::ShapeMismatch { ref found, .. } if found == "array containing number"));
    }

    #[test]
    fn test_coercion_failure_is_missing() {
        let raw = json!([
            {"date": "2021-12-31", "eps": "5.61"},
            {"date": "2022-12-31", "eps": "N/A"},
            {"date": "2023-12-31", "eps": 6.13}
        ]);

        let table = normalize(&raw, ExpectedShape::List).unwrap();
        assert_eq!(table.cell(0, "eps"), Some(&Cell::Number(5.61)));
        assert_eq!(table.cell(1, "eps"), Some(&Cell::Missing));
        assert_eq!(table.cell(2, "eps"), Some(&Cell::Number(6.13)));
    }

    #[test]
    fn test_missing_optional_columns_tolerated() {
        let raw = json!([
            {"date": "2023-12-31", "revenue": 10},
            {"date": "2022-12-31", "netIncome": 3}
        ]);

        let table = normalize(&raw, ExpectedShape::List).unwrap();
        assert_eq!(table.columns(), &["date", "revenue", "netIncome"]);
        // 2022 trié en premier : pas de revenue
        assert_eq!(table.cell(0, "revenue"), Some(&Cell::Missing));
        assert_eq!(table.cell(1, "netIncome"), Some(&Cell::Missing));
    }

    #[test]
    fn test_identifier_and_text_columns() {
        let raw = json!({
            "symbol": "AAPL",
            "cik": "0000320193",
            "rating": "S",
            "isActivelyTrading": true,
            "dcf": 150.2
        });

        let table = normalize(&raw, ExpectedShape::Object).unwrap();
        assert_eq!(table.cell(0, "symbol"), Some(&Cell::Text("AAPL".into())));
        assert_eq!(table.cell(0, "cik"), Some(&Cell::Text("0000320193".into())));
        assert_eq!(table.cell(0, "rating"), Some(&Cell::Text("S".into())));
        assert_eq!(table.cell(0, "isActivelyTrading"), Some(&Cell::Text("true".into())));
        assert_eq!(table.cell(0, "dcf"), Some(&Cell::Number(150.2)));
        assert_eq!(table.date_column(), None);
    }

    #[test]
    fn test_datetime_strings_detected_as_dates() {
        let raw = json!([{"symbol": "AAPL", "updated": "2024-03-01 16:00:00", "dcf": 1}]);
        let table = normalize(&raw, ExpectedShape::Singleton).unwrap();
        assert_eq!(table.date_column(), Some("updated"));
        assert_eq!(table.row_date(0), Some(date("2024-03-01")));
    }

    #[test]
    fn test_payload_key_unwrapped() {
        let endpoint = EndpointDescriptor::new("Prices", "v3/historical-price-full", ExpectedShape::List)
            .with_payload_key("historical");

        let raw = json!({
            "symbol": "AAPL",
            "historical": [
                {"date": "2024-01-03", "close": 184.25},
                {"date": "2024-01-02", "close": 185.64}
            ]
        });
        let table = normalize_endpoint(&raw, &endpoint).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.row_date(0), Some(date("2024-01-02")));

        // FMP renvoie {} pour un ticker inconnu
        let table = normalize_endpoint(&json!({}), &endpoint).unwrap();
        assert!(table.is_empty());

        let err = normalize_endpoint(&json!([]), &endpoint).unwrap_err();
        assert!(matches!(err, NormalizeError::ShapeMismatch { .. }));
    }
}
