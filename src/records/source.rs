//! Record source abstraction
//!
//! The contract and company sheets live in a remote spreadsheet. This module
//! defines the `RecordSource` trait the registry fetches through, the opaque
//! `SheetRecord` row type, and an in-process source used for embedding and
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::company::CompanyRow;
use crate::config::ColumnConfig;
use crate::error::SourceError;

/// One spreadsheet row: column header → cell value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRecord(Map<String, Value>);

/// A row of the contract sheet
pub type ContractRecord = SheetRecord;

impl SheetRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object; anything else is a decode error
    pub fn from_value(value: Value) -> Result<Self, SourceError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SourceError::Decode(format!(
                "expected an object row, got {other}"
            ))),
        }
    }

    /// Builder-style column setter
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Cell rendered as text
    ///
    /// Spreadsheet exports type numeric-looking cells as numbers (an ID
    /// column comes back as `1234567`, not `"1234567"`), so numbers are
    /// printed; missing and null cells read as empty.
    pub fn cell(&self, column: &str) -> String {
        match self.0.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for SheetRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Remote tabular source of contract and company rows
///
/// Implementations own their transport, credentials and timeouts. Every
/// failure is reported as a `SourceError`; the registry decides whether a
/// cached snapshot can be served instead.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All rows of the contract sheet, in sheet order
    async fn fetch_all_contract_rows(&self) -> Result<Vec<ContractRecord>, SourceError>;

    /// All rows of the company sheet, in sheet order
    async fn fetch_all_company_rows(&self) -> Result<Vec<CompanyRow>, SourceError>;
}

/// In-process record source holding sheet rows in memory
///
/// Rows can be replaced at runtime, which the registry observes on its next
/// refresh.
pub struct InMemoryRecordSource {
    contracts: RwLock<Vec<SheetRecord>>,
    companies: RwLock<Vec<SheetRecord>>,
    columns: ColumnConfig,
}

impl InMemoryRecordSource {
    pub fn new(columns: ColumnConfig) -> Self {
        Self::with_rows(Vec::new(), Vec::new(), columns)
    }

    pub fn with_rows(
        contracts: Vec<SheetRecord>,
        companies: Vec<SheetRecord>,
        columns: ColumnConfig,
    ) -> Self {
        Self {
            contracts: RwLock::new(contracts),
            companies: RwLock::new(companies),
            columns,
        }
    }

    /// Load both sheets from JSON arrays of row objects
    pub fn from_json(
        contracts_json: &str,
        companies_json: &str,
        columns: ColumnConfig,
    ) -> Result<Self, SourceError> {
        let contracts = parse_rows(contracts_json)?;
        let companies = parse_rows(companies_json)?;
        Ok(Self::with_rows(contracts, companies, columns))
    }

    pub async fn set_contracts(&self, rows: Vec<SheetRecord>) {
        *self.contracts.write().await = rows;
    }

    pub async fn set_companies(&self, rows: Vec<SheetRecord>) {
        *self.companies.write().await = rows;
    }
}

fn parse_rows(json: &str) -> Result<Vec<SheetRecord>, SourceError> {
    serde_json::from_str(json).map_err(|e| SourceError::Decode(e.to_string()))
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch_all_contract_rows(&self) -> Result<Vec<ContractRecord>, SourceError> {
        Ok(self.contracts.read().await.clone())
    }

    async fn fetch_all_company_rows(&self) -> Result<Vec<CompanyRow>, SourceError> {
        Ok(self
            .companies
            .read()
            .await
            .iter()
            .map(|row| CompanyRow::from_sheet_row(row, &self.columns))
            .collect())
    }
}
