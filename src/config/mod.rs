//! Configuration for the contract registry

mod registry_config;

pub use registry_config::{
    CacheConfig, ColumnConfig, MatchingConfig, RegistryConfig, SearchConfig,
    DEFAULT_CONTRACT_TTL_SECS, DEFAULT_SEARCH_LIMIT,
};
