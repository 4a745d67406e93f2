//! Contract Lookup - company resolution and cached contract records
//!
//! The certificate service issues employment certificates from a contract
//! spreadsheet kept by data-entry staff. This crate is its lookup core:
//! it resolves hand-typed contractor names to an official company identity
//! and keeps a refreshable in-memory snapshot of the contract sheet so that
//! person lookups do not each hit the network.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Consumers: certificate handlers, upload workflow               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ContractRegistry                             │
//! │  resolve_company · get_records_by_cedula · search_people        │
//! └─────────────────────────────────────────────────────────────────┘
//!                │                                │
//!                ▼                                ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────────┐
//! │  CompanyMatcher + AliasIndex │ │  SnapshotCache (TTL, stale     │
//! │  (normalize, year guard)     │ │  fallback, single-flight)      │
//! └──────────────────────────────┘ └────────────────────────────────┘
//!                │                                │
//!                └───────────────┬────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 RecordSource (remote sheets)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use contract_lookup::{ContractRegistry, RegistryConfig};
//!
//! let config = RegistryConfig::from_file("config/registry.yaml")?;
//! let registry = Arc::new(ContractRegistry::new(source, config));
//!
//! let company = registry.resolve_company("ut valle salud 2021").await?;
//! let contracts = registry.get_records_by_cedula("1094555123").await?;
//! ```

pub mod company;
pub mod config;
pub mod error;
pub mod records;
pub mod registry;

// Re-export main types
pub use company::{
    normalize, AliasIndex, CompanyAliasRecord, CompanyMatch, CompanyMatcher, CompanyRow,
    MatchStage,
};
pub use config::RegistryConfig;
pub use error::{ConfigError, RegistryError, SourceError};
pub use records::{
    CacheStatus, ContractRecord, InMemoryRecordSource, PersonSummary, RecordSource, SheetRecord,
    Snapshot, SnapshotCache,
};
pub use registry::{ContractRegistry, RegistryStatus};
