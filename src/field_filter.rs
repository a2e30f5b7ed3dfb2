//! Strips the RunFood report columns Reckonnt does not accept.

use serde_json::{Map, Value};

/// A flat report row as it comes off the wire.
pub type FlatRecord = Map<String, Value>;

/// Columns removed from every row of both reports before the join.
///
/// Matched exactly and case-sensitively.
pub const DENYLIST: [&str; 13] = [
    "id",
    "id_md",
    "idLinea",
    "linea",
    "Categoria",
    "Familia",
    "ivaLinea",
    "telefono",
    "direccion",
    "Estado",
    "baseIva",
    "base0",
    "iva",
];

/// Returns a copy of `record` without the denylisted columns.
///
/// Columns that are already absent are simply skipped.
pub fn filter_record(record: &FlatRecord) -> FlatRecord {
    record
        .iter()
        .filter(|(key, _)| !DENYLIST.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Applies [`filter_record`] to every row, keeping row order.
pub fn filter_records(records: &[FlatRecord]) -> Vec<FlatRecord> {
    records.iter().map(filter_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlatRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[test]
    fn test_removes_every_denylisted_column() {
        let mut row = FlatRecord::new();
        for key in DENYLIST {
            row.insert(key.to_string(), json!(1));
        }
        row.insert("codigo".to_string(), json!("X1"));

        let filtered = filter_record(&row);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("codigo"), Some(&json!("X1")));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let row = record(json!({"id": 9, "telefono": "0999", "total": 50}));
        let before = row.clone();

        let filtered = filter_record(&row);
        assert_eq!(row, before);
        assert_eq!(filtered, record(json!({"total": 50})));
    }

    #[test]
    fn test_missing_columns_are_a_no_op() {
        let row = record(json!({"serie1": "001", "numero": "5"}));
        assert_eq!(filter_record(&row), row);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let row = record(json!({"ID": 1, "iva": 12, "IVA": 12, "ivaPorcentaje": 15}));
        let filtered = filter_record(&row);
        assert_eq!(filtered, record(json!({"ID": 1, "IVA": 12, "ivaPorcentaje": 15})));
    }

    #[test]
    fn test_filtering_twice_is_idempotent() {
        let row = record(json!({"id_md": "x", "Familia": "bebidas", "pvp": 2.5}));
        let once = filter_record(&row);
        assert_eq!(filter_record(&once), once);
    }

    #[test]
    fn test_filter_records_keeps_order() {
        let rows = vec![
            record(json!({"codigo": "A", "linea": 1})),
            record(json!({"codigo": "B", "linea": 2})),
        ];
        let filtered = filter_records(&rows);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0], record(json!({"codigo": "A"})));
        assert_eq!(filtered[1], record(json!({"codigo": "B"})));
        assert!(filter_records(&[]).is_empty());
    }
}
