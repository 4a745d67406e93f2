//! Company-name resolution
//!
//! Free-text contractor names are resolved to an official name and tax ID
//! through an alias index built from the company sheet.

pub mod alias_index;
pub mod matcher;
pub mod normalize;

pub use alias_index::{AliasIndex, CompanyAliasRecord, CompanyRow};
pub use matcher::{CompanyMatch, CompanyMatcher, MatchStage};
pub use normalize::{extract_year, name_tokens, normalize};
