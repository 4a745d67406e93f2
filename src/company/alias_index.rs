//! Alias index for company resolution
//!
//! The company sheet lists one contractor per row: a comma-separated list of
//! every spelling staff have used for it (official name first) and its tax
//! ID (NIT). `AliasIndex` maps each of those spellings to one shared
//! `CompanyAliasRecord`, so a lookup on any alias lands on the official name.
//!
//! Keys keep their original casing. Normalized forms, token sets and year
//! tokens are computed once per key at build time for the matcher.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::normalize::{extract_year, name_tokens, normalize};
use crate::config::ColumnConfig;
use crate::records::SheetRecord;

/// Canonical identity of a company
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyAliasRecord {
    /// Official company name (first alias of its row)
    pub canonical_name: String,
    /// Tax identifier (NIT), e.g. "805.029.170-0"
    pub tax_id: String,
}

/// One row of the company sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRow {
    /// Comma-separated aliases, official name first
    #[serde(alias = "Empresa")]
    pub alias_field: String,
    #[serde(alias = "Nit")]
    pub tax_id: String,
}

impl CompanyRow {
    pub fn new(alias_field: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            alias_field: alias_field.into(),
            tax_id: tax_id.into(),
        }
    }

    /// Decode a raw sheet row using the configured company columns
    pub fn from_sheet_row(row: &SheetRecord, columns: &ColumnConfig) -> Self {
        Self {
            alias_field: row.cell(&columns.company_alias_column),
            tax_id: row.cell(&columns.company_tax_id_column),
        }
    }

    /// Trimmed aliases in sheet order, empty pieces included
    fn aliases(&self) -> Vec<&str> {
        self.alias_field.split(',').map(str::trim).collect()
    }
}

/// Index entry: the shared record plus precomputed match features of its key
#[derive(Debug, Clone)]
pub(crate) struct AliasEntry {
    pub record: Arc<CompanyAliasRecord>,
    pub normalized: String,
    pub tokens: HashSet<String>,
    pub year: Option<String>,
}

impl AliasEntry {
    fn new(alias: &str, record: Arc<CompanyAliasRecord>) -> Self {
        let normalized = normalize(alias);
        let tokens = name_tokens(&normalized);
        let year = extract_year(&normalized);
        Self {
            record,
            normalized,
            tokens,
            year,
        }
    }
}

/// Ordered mapping alias → company record
///
/// Iteration follows first insertion of each key. Re-inserting an existing
/// key replaces its record but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: IndexMap<String, AliasEntry>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from company sheet rows
    ///
    /// Rows without aliases or without a tax ID are skipped. When two rows
    /// share an alias the later row wins.
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a CompanyRow>,
    {
        let mut index = Self::new();
        let mut skipped = 0usize;

        for row in rows {
            if row.alias_field.is_empty() || row.tax_id.is_empty() {
                skipped += 1;
                continue;
            }

            let aliases = row.aliases();
            let Some(canonical_name) = aliases.first() else {
                continue;
            };

            let record = Arc::new(CompanyAliasRecord {
                canonical_name: canonical_name.to_string(),
                tax_id: row.tax_id.clone(),
            });

            for alias in aliases.iter().filter(|a| !a.is_empty()) {
                index.insert(alias.to_string(), record.clone());
            }
        }

        tracing::debug!(aliases = index.len(), skipped, "Built company alias index");
        index
    }

    /// Insert (or replace) a single alias
    pub fn insert(&mut self, alias: String, record: Arc<CompanyAliasRecord>) {
        let entry = AliasEntry::new(&alias, record);
        self.entries.insert(alias, entry);
    }

    /// Exact lookup by raw alias
    pub fn get(&self, alias: &str) -> Option<&Arc<CompanyAliasRecord>> {
        self.entries.get(alias).map(|e| &e.record)
    }

    /// Raw aliases in index order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct canonical companies
    pub fn company_count(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.record.as_ref())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &AliasEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_alias_maps_to_canonical() {
        let rows = vec![CompanyRow::new(
            "CORPORACION HACIA UN VALLE SOLIDARIO, CORPORACION, CHVS",
            "805.029.170-0",
        )];
        let index = AliasIndex::build(&rows);

        assert_eq!(index.len(), 3);
        for alias in ["CORPORACION HACIA UN VALLE SOLIDARIO", "CORPORACION", "CHVS"] {
            let record = index.get(alias).unwrap();
            assert_eq!(record.canonical_name, "CORPORACION HACIA UN VALLE SOLIDARIO");
            assert_eq!(record.tax_id, "805.029.170-0");
        }
        assert_eq!(index.company_count(), 1);
    }

    #[test]
    fn test_aliases_share_one_record() {
        let rows = vec![CompanyRow::new("Consorcio Vial, CS Vial", "900.111.222-3")];
        let index = AliasIndex::build(&rows);
        let a = index.get("Consorcio Vial").unwrap();
        let b = index.get("CS Vial").unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_skips_incomplete_rows() {
        let rows = vec![
            CompanyRow::new("", "900.111.222-3"),
            CompanyRow::new("Sin Nit SAS", ""),
            CompanyRow::new("Valida SAS", "800.000.000-1"),
        ];
        let index = AliasIndex::build(&rows);
        assert_eq!(index.aliases().collect::<Vec<_>>(), vec!["Valida SAS"]);
    }

    #[test]
    fn test_ignores_blank_aliases() {
        let rows = vec![CompanyRow::new("Alfa SAS, , Alfa ,", "1")];
        let index = AliasIndex::build(&rows);
        assert_eq!(index.aliases().collect::<Vec<_>>(), vec!["Alfa SAS", "Alfa"]);
    }

    #[test]
    fn test_last_row_wins_keeps_position() {
        let rows = vec![
            CompanyRow::new("Alfa SAS, ALFA", "1"),
            CompanyRow::new("Beta SAS", "2"),
            CompanyRow::new("Alfa Ingenieria, ALFA", "3"),
        ];
        let index = AliasIndex::build(&rows);

        assert_eq!(index.get("ALFA").unwrap().tax_id, "3");
        assert_eq!(index.get("ALFA").unwrap().canonical_name, "Alfa Ingenieria");
        assert_eq!(
            index.aliases().collect::<Vec<_>>(),
            vec!["Alfa SAS", "ALFA", "Beta SAS", "Alfa Ingenieria"]
        );
    }

    #[test]
    fn test_entries_precompute_features() {
        let rows = vec![CompanyRow::new("ut Valle 2021", "1")];
        let index = AliasIndex::build(&rows);
        let (_, entry) = index.entries().next().unwrap();
        assert_eq!(entry.normalized, "UNION TEMPORAL VALLE 2021");
        assert_eq!(entry.year.as_deref(), Some("2021"));
        assert_eq!(entry.tokens.len(), 4);
    }

    #[test]
    fn test_from_sheet_row_reads_numeric_cells() {
        let row = SheetRecord::from_value(json!({
            "Empresa": "Gamma SAS",
            "Nit": 900123456
        }))
        .unwrap();
        let company = CompanyRow::from_sheet_row(&row, &ColumnConfig::default());
        assert_eq!(company, CompanyRow::new("Gamma SAS", "900123456"));
    }
}
