//! Person lookups over a contract snapshot
//!
//! Both operations scan the snapshot in sheet order. A person appears once
//! per contract, so the same identifier usually shows up on several rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::source::ContractRecord;
use crate::company::normalize;
use crate::config::ColumnConfig;

/// A person found by `search_people`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    /// National identifier (cédula)
    pub identifier: String,
}

/// All contract rows whose identifier equals `cedula`, both sides trimmed
pub fn records_by_cedula(
    records: &[ContractRecord],
    id_column: &str,
    cedula: &str,
) -> Vec<ContractRecord> {
    let wanted = cedula.trim();
    records
        .iter()
        .filter(|row| row.cell(id_column).trim() == wanted)
        .cloned()
        .collect()
}

/// People whose normalized name or raw identifier contains the query
///
/// Results are keyed by identifier: a person with several contracts is
/// listed once, at the position of their first row, with the name from their
/// last matching row. Scanning stops as soon as `limit` people are collected,
/// so these are the first matches in sheet order, not a ranking. Rows without
/// an identifier are ignored and a blank query matches nothing.
pub fn search_people(
    records: &[ContractRecord],
    columns: &ColumnConfig,
    query: &str,
    limit: usize,
) -> Vec<PersonSummary> {
    let needle = normalize(query);
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut found: IndexMap<String, String> = IndexMap::new();

    for row in records {
        let identifier = row.cell(&columns.id_column);
        if identifier.trim().is_empty() {
            continue;
        }
        let name = row.cell(&columns.name_column);

        if normalize(&name).contains(&needle) || identifier.contains(&needle) {
            found.insert(identifier.trim().to_string(), name);
            if found.len() >= limit {
                break;
            }
        }
    }

    found
        .into_iter()
        .map(|(identifier, name)| PersonSummary { name, identifier })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SheetRecord;

    fn row(cedula: impl Into<serde_json::Value>, name: &str) -> ContractRecord {
        SheetRecord::new()
            .with("cedula", cedula)
            .with("nombre_completo", name)
    }

    #[test]
    fn test_records_by_cedula_exact_and_trimmed() {
        let records = vec![
            row("123", "Ana"),
            row(" 123 ", "Ana"),
            row("1234", "Beto"),
            row(123, "Ana"),
            row("0123", "Carla"),
        ];

        let found = records_by_cedula(&records, "cedula", "123 ");
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.cell("nombre_completo") == "Ana"));
    }

    #[test]
    fn test_records_by_cedula_no_match() {
        let records = vec![row("123", "Ana")];
        assert!(records_by_cedula(&records, "cedula", "12").is_empty());
    }

    #[test]
    fn test_search_by_name_ignores_accents_and_case() {
        let records = vec![row("1", "José Pérez"), row("2", "Maria Lopez")];
        let found = search_people(&records, &ColumnConfig::default(), "perez", 20);
        assert_eq!(
            found,
            vec![PersonSummary {
                name: "José Pérez".to_string(),
                identifier: "1".to_string()
            }]
        );
    }

    #[test]
    fn test_search_by_identifier_substring() {
        let records = vec![row(1094555, "Ana"), row(2000, "Beto")];
        let found = search_people(&records, &ColumnConfig::default(), "945", 20);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "1094555");
    }

    #[test]
    fn test_search_dedupes_last_name_wins() {
        let records = vec![
            row("1", "Ana Gomez"),
            row("2", "Ana Ruiz"),
            row("1", "Ana María Gómez"),
        ];
        let found = search_people(&records, &ColumnConfig::default(), "ana", 20);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].identifier, "1");
        assert_eq!(found[0].name, "Ana María Gómez");
        assert_eq!(found[1].identifier, "2");
    }

    #[test]
    fn test_search_caps_results() {
        let records: Vec<_> = (0..50).map(|i| row(i, "Persona Repetida")).collect();
        let found = search_people(&records, &ColumnConfig::default(), "persona", 20);
        assert_eq!(found.len(), 20);
        assert_eq!(found[19].identifier, "19");
    }

    #[test]
    fn test_search_blank_query() {
        let records = vec![row("1", "Ana")];
        assert!(search_people(&records, &ColumnConfig::default(), "  ", 20).is_empty());
    }

    #[test]
    fn test_search_skips_rows_without_identifier() {
        let records = vec![row("", "Ana"), row(serde_json::Value::Null, "Ana B")];
        assert!(search_people(&records, &ColumnConfig::default(), "ana", 20).is_empty());
    }
}
