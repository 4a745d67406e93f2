//! Text normalization for company names
//!
//! Data-entry staff type the same contractor many ways ("U.T. Valle 2021",
//! "union temporal valle 2021", "UT VALLE 2021"). Normalization folds those
//! spellings together:
//! - Unicode NFKD decomposition with combining marks dropped (á → A, Ñ → N)
//! - Uppercase conversion
//! - Whitespace trimming and collapsing
//! - Whole-word abbreviation expansion (UT, U.T., U.T → UNION TEMPORAL; CS → CONSORCIO)

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Abbreviation expansions, applied in order.
static EXPANSIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bUT\b", "UNION TEMPORAL"),
        (r"\bU\.T\.\b", "UNION TEMPORAL"),
        (r"\bU\.T\b", "UNION TEMPORAL"),
        (r"\bCS\b", "CONSORCIO"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("invalid abbreviation pattern"),
            replacement,
        )
    })
    .collect()
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:20\d{2}|19\d{2})\b").expect("invalid year pattern"));

/// Normalize a company (or person) name for matching.
///
/// Empty input yields an empty string. The result is stable under
/// re-normalization.
///
/// # Examples
///
/// ```
/// use contract_lookup::company::normalize;
///
/// assert_eq!(normalize("  Bogotá   D.C. "), "BOGOTA D.C.");
/// assert_eq!(normalize("ut Constructores"), "UNION TEMPORAL CONSTRUCTORES");
/// assert_eq!(normalize("cs Vial del Cauca"), "CONSORCIO VIAL DEL CAUCA");
/// ```
pub fn normalize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let stripped: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let mut norm = stripped
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for (re, replacement) in EXPANSIONS.iter() {
        if re.is_match(&norm) {
            norm = re.replace_all(&norm, *replacement).into_owned();
        }
    }

    norm
}

/// Distinct whitespace-separated tokens of an already normalized name
pub fn name_tokens(normalized: &str) -> HashSet<String> {
    normalized.split_whitespace().map(str::to_owned).collect()
}

/// First 19xx/20xx whole-word year in an already normalized name
pub fn extract_year(normalized: &str) -> Option<String> {
    YEAR_RE.find(normalized).map(|m| m.as_str().to_owned())
}
