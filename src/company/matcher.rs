//! Company name matcher
//!
//! Resolves a free-text company name against an `AliasIndex` by escalating
//! through four stages; the first stage that produces a candidate wins:
//!
//! 1. `Exact` - the raw input is an alias key
//! 2. `Normalized` - normalized input equals a normalized key
//! 3. `TokenOverlap` - shared tokens, with the contract year as a hard guard
//! 4. `Fuzzy` - edit-distance similarity against the raw keys
//!
//! Years matter: "UT VALLE 2021" and "UT VALLE 2022" are different
//! contractors, so a candidate whose year differs from the input's is never
//! returned by stages 3 and 4.

use std::fmt;
use std::sync::Arc;

use super::alias_index::{AliasIndex, CompanyAliasRecord};
use super::normalize::{extract_year, name_tokens, normalize};
use crate::config::MatchingConfig;

/// Stage of the escalation that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Normalized,
    TokenOverlap,
    Fuzzy,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStage::Exact => "exact",
            MatchStage::Normalized => "normalized",
            MatchStage::TokenOverlap => "token_overlap",
            MatchStage::Fuzzy => "fuzzy",
        };
        f.write_str(s)
    }
}

/// A resolved company
#[derive(Debug, Clone)]
pub struct CompanyMatch {
    pub record: Arc<CompanyAliasRecord>,
    /// Index key that matched
    pub alias: String,
    pub stage: MatchStage,
}

/// Normalized view of the input name
struct Probe {
    normalized: String,
    tokens: std::collections::HashSet<String>,
    year: Option<String>,
}

impl Probe {
    fn new(raw_name: &str) -> Self {
        let normalized = normalize(raw_name);
        let tokens = name_tokens(&normalized);
        let year = extract_year(&normalized);
        Self {
            normalized,
            tokens,
            year,
        }
    }

    /// True when both sides carry a year and the years differ
    fn year_conflicts(&self, candidate_year: Option<&str>) -> bool {
        matches!((self.year.as_deref(), candidate_year), (Some(a), Some(b)) if a != b)
    }

    fn same_year(&self, candidate_year: Option<&str>) -> bool {
        matches!((self.year.as_deref(), candidate_year), (Some(a), Some(b)) if a == b)
    }
}

/// Multi-stage company matcher
#[derive(Debug, Clone, Default)]
pub struct CompanyMatcher {
    config: MatchingConfig,
}

impl CompanyMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Find the best company for `raw_name`, or `None` when every stage fails
    pub fn resolve(&self, raw_name: &str, index: &AliasIndex) -> Option<CompanyMatch> {
        if raw_name.trim().is_empty() {
            return None;
        }

        if let Some(record) = index.get(raw_name) {
            return Some(CompanyMatch {
                record: record.clone(),
                alias: raw_name.to_string(),
                stage: MatchStage::Exact,
            });
        }

        let probe = Probe::new(raw_name);

        let found = self
            .normalized_match(&probe, index)
            .or_else(|| self.token_overlap_match(&probe, index))
            .or_else(|| self.fuzzy_match(&probe, index));

        match &found {
            Some(m) => tracing::debug!(
                input = raw_name,
                alias = %m.alias,
                stage = %m.stage,
                canonical = %m.record.canonical_name,
                "Resolved company name"
            ),
            None => tracing::debug!(input = raw_name, "No company match"),
        }

        found
    }

    fn normalized_match(&self, probe: &Probe, index: &AliasIndex) -> Option<CompanyMatch> {
        index
            .entries()
            .find(|(_, entry)| entry.normalized == probe.normalized)
            .map(|(alias, entry)| CompanyMatch {
                record: entry.record.clone(),
                alias: alias.to_string(),
                stage: MatchStage::Normalized,
            })
    }

    fn token_overlap_match(&self, probe: &Probe, index: &AliasIndex) -> Option<CompanyMatch> {
        let input_len = probe.tokens.len();
        let mut best: Option<(usize, &str, &Arc<CompanyAliasRecord>)> = None;

        for (alias, entry) in index.entries() {
            if probe.year_conflicts(entry.year.as_deref()) {
                continue;
            }

            // The year bonus ranks qualified candidates; it never qualifies one
            // on its own (year-bonus note in DESIGN.md).
            let overlap = probe.tokens.intersection(&entry.tokens).count();
            let is_subset = input_len > 0 && overlap >= input_len;
            if overlap < self.config.min_token_overlap && !is_subset {
                continue;
            }

            let score = if probe.same_year(entry.year.as_deref()) {
                overlap + self.config.year_bonus
            } else {
                overlap
            };

            if best.map_or(true, |(top, _, _)| score > top) {
                best = Some((score, alias, &entry.record));
            }
        }

        best.map(|(_, alias, record)| CompanyMatch {
            record: record.clone(),
            alias: alias.to_string(),
            stage: MatchStage::TokenOverlap,
        })
    }

    fn fuzzy_match(&self, probe: &Probe, index: &AliasIndex) -> Option<CompanyMatch> {
        let mut best: Option<(f64, &str)> = None;

        for alias in index.aliases() {
            let similarity = strsim::normalized_levenshtein(&probe.normalized, alias);
            if similarity < self.config.fuzzy_cutoff {
                continue;
            }
            if best.map_or(true, |(top, _)| similarity > top) {
                best = Some((similarity, alias));
            }
        }

        let (similarity, alias) = best?;
        let matched_year = extract_year(&normalize(alias));
        if probe.year_conflicts(matched_year.as_deref()) {
            tracing::debug!(alias, similarity, "Fuzzy candidate rejected on year");
            return None;
        }

        index.get(alias).map(|record| CompanyMatch {
            record: record.clone(),
            alias: alias.to_string(),
            stage: MatchStage::Fuzzy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::CompanyRow;

    fn index(rows: &[(&str, &str)]) -> AliasIndex {
        let rows: Vec<CompanyRow> = rows
            .iter()
            .map(|(aliases, nit)| CompanyRow::new(*aliases, *nit))
            .collect();
        AliasIndex::build(&rows)
    }

    fn resolve(raw: &str, idx: &AliasIndex) -> Option<CompanyMatch> {
        CompanyMatcher::default().resolve(raw, idx)
    }

    #[test]
    fn test_exact_match() {
        let idx = index(&[("CORPORACION HACIA UN VALLE SOLIDARIO, CHVS", "805.029.170-0")]);
        let m = resolve("CHVS", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::Exact);
        assert_eq!(m.record.canonical_name, "CORPORACION HACIA UN VALLE SOLIDARIO");
    }

    #[test]
    fn test_exact_beats_better_fuzzy_candidate() {
        // "VALLE SAS" is an exact key of the second row; the first row's
        // alias comes earlier in the index and is a close fuzzy candidate.
        let idx = index(&[("Valle S.A.S", "1"), ("Otra Empresa, VALLE SAS", "2")]);
        let m = resolve("VALLE SAS", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::Exact);
        assert_eq!(m.record.tax_id, "2");
    }

    #[test]
    fn test_normalized_match() {
        let idx = index(&[("Unión Temporal Vías del Cauca", "900.1")]);
        let m = resolve("ut vias del cauca", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::Normalized);
        assert_eq!(m.alias, "Unión Temporal Vías del Cauca");
    }

    #[test]
    fn test_subset_match_single_token() {
        let idx = index(&[("CORPORACION HACIA UN VALLE SOLIDARIO", "805.029.170-0")]);
        let m = resolve("corporación", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::TokenOverlap);
        assert_eq!(m.record.canonical_name, "CORPORACION HACIA UN VALLE SOLIDARIO");
    }

    #[test]
    fn test_overlap_of_three_tokens() {
        let idx = index(&[("CONSORCIO SALUD PACIFICO NORTE", "1")]);
        let m = resolve("SALUD PACIFICO NORTE LTDA", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::TokenOverlap);
    }

    #[test]
    fn test_insufficient_overlap_falls_through() {
        let idx = index(&[("CONSORCIO SALUD PACIFICO NORTE", "1")]);
        assert!(resolve("PACIFICO SUR ASOCIADOS", &idx).is_none());
    }

    #[test]
    fn test_shared_year_does_not_lift_short_overlap() {
        let idx = index(&[("VALLE 2021 SAS", "1")]);
        assert!(resolve("ACME VALLE 2021", &idx).is_none());
    }

    #[test]
    fn test_year_guard_excludes_other_year() {
        let idx = index(&[
            ("UNION TEMPORAL VALLE SALUD 2021", "2021-nit"),
            ("UNION TEMPORAL VALLE SALUD OCCIDENTE INTEGRAL 2022", "2022-nit"),
        ]);
        let m = resolve("UT VALLE SALUD OCCIDENTE INTEGRAL 2021", &idx).unwrap();
        assert_eq!(m.record.tax_id, "2021-nit");
    }

    #[test]
    fn test_year_guard_never_crosses_years() {
        let idx = index(&[("UNION TEMPORAL VALLE SALUD 2022", "2022-nit")]);
        assert!(resolve("UT VALLE SALUD 2021", &idx).is_none());
    }

    #[test]
    fn test_matching_year_boosts_ranking() {
        let idx = index(&[
            ("CONSORCIO VIAS DEL NORTE", "no-year"),
            ("CONSORCIO VIAS 2020", "year"),
        ]);
        // Four shared tokens with the first, three plus the year bonus with the second
        let m = resolve("CS VIAS DEL NORTE 2020", &idx).unwrap();
        assert_eq!(m.record.tax_id, "year");
    }

    #[test]
    fn test_overlap_ties_keep_first() {
        let idx = index(&[("ALFA BETA GAMMA UNO", "first"), ("ALFA BETA GAMMA DOS", "second")]);
        let m = resolve("ALFA BETA GAMMA", &idx).unwrap();
        assert_eq!(m.record.tax_id, "first");
    }

    #[test]
    fn test_fuzzy_fallback() {
        let idx = index(&[("CONSTRUCTORA ANDINA", "1")]);
        let m = resolve("Construtora Andina", &idx).unwrap();
        assert_eq!(m.stage, MatchStage::Fuzzy);
        assert_eq!(m.alias, "CONSTRUCTORA ANDINA");
    }

    #[test]
    fn test_fuzzy_respects_cutoff() {
        let idx = index(&[("CONSTRUCTORA ANDINA", "1")]);
        assert!(resolve("Ferreteria El Tornillo", &idx).is_none());
    }

    #[test]
    fn test_blank_input() {
        let idx = index(&[("ALFA", "1")]);
        assert!(resolve("", &idx).is_none());
        assert!(resolve("   ", &idx).is_none());
    }

    #[test]
    fn test_empty_index() {
        assert!(resolve("ALFA", &AliasIndex::new()).is_none());
    }
}
