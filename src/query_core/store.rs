//! Storage seam for the query engine
//!
//! Table identifiers are closed enums so no client input ever reaches query
//! text. Values (end time, asset id, limit) are always bound parameters.

use super::error::QueryError;
use async_trait::async_trait;
use rusqlite::types::Value;

/// Time-series tables served through the windowed endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesTable {
    TotalSupplyBorrow,
    KylixToken,
    PoolsData,
}

impl SeriesTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            SeriesTable::TotalSupplyBorrow => "dashboard_total_supply_borrow",
            SeriesTable::KylixToken => "dashboard_kylix_token",
            SeriesTable::PoolsData => "pools_data",
        }
    }

    /// Only asset-scoped tables carry an `asset_id` column.
    pub fn supports_asset_filter(&self) -> bool {
        matches!(self, SeriesTable::PoolsData)
    }
}

/// Small lookup tables returned whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTable {
    InterestRateModel,
}

impl ReferenceTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            ReferenceTable::InterestRateModel => "interest_rate_model",
        }
    }

    pub fn order_column(&self) -> &'static str {
        match self {
            ReferenceTable::InterestRateModel => "utilization_rate",
        }
    }
}

/// A bounded, descending-time fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesQuery {
    pub table: SeriesTable,
    pub asset_id: Option<i64>,
    pub end_time: i64,
    pub adjusted_limit: i64,
}

/// Rows in table-column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only access to the backing time-series store.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Up to `adjusted_limit` rows with `time <= end_time` (and the asset
    /// filter, if any), newest first. No matching rows is an empty set.
    async fn fetch_window(&self, query: SeriesQuery) -> Result<RowSet, QueryError>;

    /// Every row of a reference table, ascending by its order column.
    async fn fetch_all(&self, table: ReferenceTable) -> Result<RowSet, QueryError>;
}
