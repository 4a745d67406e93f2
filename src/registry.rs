//! Contract registry
//!
//! `ContractRegistry` is the one object a service constructs at startup and
//! shares (behind an `Arc`) with every request handler. It owns the record
//! source, the contract snapshot cache, the optional alias-index cache and
//! the company matcher, and exposes the lookups the certificate workflow
//! needs:
//!
//! - `resolve_company` - free-text contractor name → official name + NIT
//! - `get_records_by_cedula` - every contract row of one person
//! - `search_people` - typeahead over names and identifiers
//! - `refresh_cache` - explicit (or forced) contract snapshot refresh

use std::future::Future;
use std::sync::Arc;

use crate::company::{AliasIndex, CompanyAliasRecord, CompanyMatch, CompanyMatcher};
use crate::config::RegistryConfig;
use crate::error::{Result, SourceError};
use crate::records::{
    lookup, CacheStatus, ContractRecord, PersonSummary, RecordSource, Snapshot, SnapshotCache,
};

/// Diagnostics for both caches
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryStatus {
    pub contracts: CacheStatus,
    /// Rows in the current contract snapshot
    pub record_count: Option<usize>,
    /// `None` when the alias index is rebuilt on every lookup
    pub company_index: Option<CacheStatus>,
}

pub struct ContractRegistry {
    source: Arc<dyn RecordSource>,
    config: RegistryConfig,
    contracts: SnapshotCache<Vec<ContractRecord>>,
    company_index: Option<SnapshotCache<AliasIndex>>,
    matcher: CompanyMatcher,
}

impl ContractRegistry {
    pub fn new(source: Arc<dyn RecordSource>, config: RegistryConfig) -> Self {
        let timeout = config.cache.fetch_timeout();

        let contracts =
            SnapshotCache::new("contracts", config.cache.ttl()).with_fetch_timeout(timeout);
        let company_index = config
            .cache
            .company_index_ttl()
            .map(|ttl| SnapshotCache::new("company_index", ttl).with_fetch_timeout(timeout));
        let matcher = CompanyMatcher::new(config.matching.clone());

        Self {
            source,
            config,
            contracts,
            company_index,
            matcher,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Contract snapshot, refreshed when missing, expired or `force`d
    ///
    /// A failed refresh falls back to the previous snapshot; it is an error
    /// only when no snapshot was ever loaded.
    pub async fn refresh_cache(&self, force: bool) -> Result<Arc<Snapshot<Vec<ContractRecord>>>> {
        let snapshot = self
            .contracts
            .get_or_refresh(force, || async {
                let rows = self.source.fetch_all_contract_rows().await?;
                tracing::info!(records = rows.len(), "Fetched contract rows");
                Ok::<_, SourceError>(rows)
            })
            .await?;
        Ok(snapshot)
    }

    /// Every contract row for a national identifier
    pub async fn get_records_by_cedula(&self, cedula: &str) -> Result<Vec<ContractRecord>> {
        let snapshot = self.refresh_cache(false).await?;
        let records =
            lookup::records_by_cedula(snapshot.data(), &self.config.columns.id_column, cedula);
        tracing::debug!(matches = records.len(), "Looked up contracts by cedula");
        Ok(records)
    }

    /// People whose name or identifier contains `query`
    pub async fn search_people(&self, query: &str) -> Result<Vec<PersonSummary>> {
        let snapshot = self.refresh_cache(false).await?;
        Ok(lookup::search_people(
            snapshot.data(),
            &self.config.columns,
            query,
            self.config.search.max_results,
        ))
    }

    /// Official name and NIT for a free-text company name
    ///
    /// `Ok(None)` means no company matched; the caller decides how to
    /// proceed (typically by asking for manual entry).
    pub async fn resolve_company(&self, raw_name: &str) -> Result<Option<CompanyAliasRecord>> {
        Ok(self
            .match_company(raw_name)
            .await?
            .map(|m| m.record.as_ref().clone()))
    }

    /// Like `resolve_company`, but also reports the matched alias and stage
    pub async fn match_company(&self, raw_name: &str) -> Result<Option<CompanyMatch>> {
        if raw_name.trim().is_empty() {
            return Ok(None);
        }

        match &self.company_index {
            Some(cache) => {
                let snapshot = cache
                    .get_or_refresh(false, || self.load_company_index())
                    .await?;
                Ok(self.matcher.resolve(raw_name, snapshot.data()))
            }
            None => {
                let index = bounded(
                    self.config.cache.fetch_timeout(),
                    self.load_company_index(),
                )
                .await?;
                Ok(self.matcher.resolve(raw_name, &index))
            }
        }
    }

    async fn load_company_index(&self) -> std::result::Result<AliasIndex, SourceError> {
        let rows = self.source.fetch_all_company_rows().await?;
        let index = AliasIndex::build(&rows);
        tracing::debug!(
            rows = rows.len(),
            aliases = index.len(),
            companies = index.company_count(),
            "Loaded company alias index"
        );
        Ok(index)
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            contracts: self.contracts.status(),
            record_count: self.contracts.current().map(|s| s.data().len()),
            company_index: self.company_index.as_ref().map(SnapshotCache::status),
        }
    }
}

async fn bounded<T, F>(limit: std::time::Duration, fut: F) -> std::result::Result<T, SourceError>
where
    F: Future<Output = std::result::Result<T, SourceError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(SourceError::Timeout(limit)))
}
