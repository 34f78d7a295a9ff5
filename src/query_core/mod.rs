//! Query Core - Time-Windowed Decimating Query Engine
//!
//! Turns a client-supplied end timestamp, row limit and coarsening scale into a
//! bounded, evenly spaced subset of stored samples.
//!
//! # Architecture
//!
//! ```text
//! raw query params → WindowRequest::parse (validation, no storage access)
//!     ↓
//! SeriesStore::fetch_window (time <= end_time, ORDER BY time DESC, LIMIT limit * stride)
//!     ↓
//! decimate (indices 0, stride, 2 * stride, ...)
//!     ↓
//! render_positional (numeric values → plain decimal strings)
//!     ↓
//! JSON array of arrays
//! ```
//!
//! Reference tables skip validation and decimation:
//!
//! ```text
//! SeriesStore::fetch_all (ORDER BY <column> ASC) → render_named → JSON array of objects
//! ```
//!
//! ## Decimation
//!
//! The stride is a sample count, not a calendar bucket. It assumes one sample
//! per minute at ingestion. Gaps in the stored series shift "every N minutes"
//! to "every N rows".

pub mod decimate;
pub mod engine;
pub mod error;
pub mod format;
pub mod params;
pub mod scale;
pub mod sqlite_reader;
pub mod store;

pub use decimate::decimate;
pub use engine::QueryEngine;
pub use error::QueryError;
pub use format::{format_value, render_named, render_positional};
pub use params::{RawWindowParams, WindowRequest};
pub use scale::Scale;
pub use sqlite_reader::{SqliteSeriesReader, StoreConfig};
pub use store::{ReferenceTable, RowSet, SeriesQuery, SeriesStore, SeriesTable};
