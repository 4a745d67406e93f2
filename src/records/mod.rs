//! Contract records: source abstraction, snapshot cache and person lookups

pub mod cache;
pub mod lookup;
pub mod source;

pub use cache::{CacheStatus, Snapshot, SnapshotCache};
pub use lookup::{records_by_cedula, search_people, PersonSummary};
pub use source::{ContractRecord, InMemoryRecordSource, RecordSource, SheetRecord};
