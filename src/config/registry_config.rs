//! Registry configuration parsing
//!
//! Loads registry settings from YAML and/or environment variables and
//! provides strongly-typed access to cache, column and matching settings.
//! Every section is optional; omitted values fall back to the defaults the
//! certificate service has always used (15 minute cache, 20 search results,
//! 0.7 fuzzy cutoff).

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

/// Contract snapshot lifetime before a read triggers a refresh
pub const DEFAULT_CONTRACT_TTL_SECS: u64 = 15 * 60;

/// Maximum number of people returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Root configuration structure for the registry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Snapshot cache behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Contract snapshot TTL in seconds
    pub ttl_secs: u64,
    /// Alias index TTL in seconds; `None` rebuilds the index on every lookup
    pub company_index_ttl_secs: Option<u64>,
    /// Upper bound on a single source fetch
    pub fetch_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CONTRACT_TTL_SECS,
            company_index_ttl_secs: None,
            fetch_timeout_secs: 30,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn company_index_ttl(&self) -> Option<Duration> {
        self.company_index_ttl_secs.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Sheet column names read by the lookups
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// National identifier column of the contract sheet
    pub id_column: String,
    /// Employee full-name column of the contract sheet
    pub name_column: String,
    /// Comma-separated alias column of the company sheet
    pub company_alias_column: String,
    /// Tax ID column of the company sheet
    pub company_tax_id_column: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id_column: "cedula".to_string(),
            name_column: "nombre_completo".to_string(),
            company_alias_column: "Empresa".to_string(),
            company_tax_id_column: "Nit".to_string(),
        }
    }
}

/// Company matcher thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Shared tokens needed for a token-overlap match
    pub min_token_overlap: usize,
    /// Ranking bonus when input and candidate carry the same year
    pub year_bonus: usize,
    /// Minimum similarity accepted by the fuzzy fallback (0.0-1.0)
    pub fuzzy_cutoff: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_token_overlap: 3,
            year_bonus: 2,
            fuzzy_cutoff: 0.7,
        }
    }
}

/// People search settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup
    ///
    /// Split out from `from_env` so tests can drive it without touching the
    /// process environment. On error `self` is left unchanged.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut next = self.clone();
        if let Some(v) = lookup("CONTRACT_CACHE_TTL_SECS") {
            next.cache.ttl_secs = parse_var("CONTRACT_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("COMPANY_INDEX_TTL_SECS") {
            next.cache.company_index_ttl_secs = Some(parse_var("COMPANY_INDEX_TTL_SECS", &v)?);
        }
        if let Some(v) = lookup("SOURCE_FETCH_TIMEOUT_SECS") {
            next.cache.fetch_timeout_secs = parse_var("SOURCE_FETCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("PEOPLE_SEARCH_LIMIT") {
            next.search.max_results = parse_var("PEOPLE_SEARCH_LIMIT", &v)?;
        }
        if let Some(v) = lookup("CONTRACT_ID_COLUMN") {
            next.columns.id_column = v;
        }
        if let Some(v) = lookup("CONTRACT_NAME_COLUMN") {
            next.columns.name_column = v;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.matching.fuzzy_cutoff) {
            return Err(ConfigError::InvalidValue {
                key: "matching.fuzzy_cutoff".to_string(),
                value: self.matching.fuzzy_cutoff.to_string(),
            });
        }
        if self.cache.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.fetch_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
