//! Query engine: validate → fetch → decimate → format

use super::decimate::decimate;
use super::error::QueryError;
use super::format::{render_named, render_positional};
use super::params::{RawWindowParams, WindowRequest};
use super::store::{ReferenceTable, RowSet, SeriesQuery, SeriesStore, SeriesTable};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Stateless composition of the query pipeline over a `SeriesStore`.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn SeriesStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self { store }
    }

    /// Windowed, decimated read rendered as positional rows.
    ///
    /// Validation completes before the store is touched.
    pub async fn windowed(
        &self,
        table: SeriesTable,
        raw: &RawWindowParams,
    ) -> Result<Vec<Vec<JsonValue>>, QueryError> {
        let request = WindowRequest::parse(raw, table.supports_asset_filter())?;

        let RowSet { columns, rows } = self
            .store
            .fetch_window(SeriesQuery {
                table,
                asset_id: request.asset_id,
                end_time: request.end_time,
                adjusted_limit: request.adjusted_limit(),
            })
            .await?;

        let fetched = rows.len();
        let rows = decimate(rows, request.stride());
        log::debug!(
            "{}: scale={} kept {}/{} rows",
            table.table_name(),
            request.scale,
            rows.len(),
            fetched
        );

        render_positional(RowSet { columns, rows })
    }

    /// Whole reference table rendered as named rows.
    pub async fn reference(
        &self,
        table: ReferenceTable,
    ) -> Result<Vec<Map<String, JsonValue>>, QueryError> {
        let rows = self.store.fetch_all(table).await?;
        render_named(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rusqlite::types::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store: rows of (asset_id, time, value)
    struct MemoryStore {
        rows: Vec<(i64, i64, f64)>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn new(rows: Vec<(i64, i64, f64)>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SeriesStore for MemoryStore {
        async fn fetch_window(&self, query: SeriesQuery) -> Result<RowSet, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut matching: Vec<&(i64, i64, f64)> = self
                .rows
                .iter()
                .filter(|(asset, time, _)| {
                    *time <= query.end_time && query.asset_id.map_or(true, |a| a == *asset)
                })
                .collect();
            matching.sort_by(|a, b| b.1.cmp(&a.1));
            matching.truncate(query.adjusted_limit as usize);

            Ok(RowSet {
                columns: vec!["asset_id".into(), "time".into(), "value".into()],
                rows: matching
                    .into_iter()
                    .map(|(asset, time, value)| {
                        vec![Value::Integer(*asset), Value::Integer(*time), Value::Real(*value)]
                    })
                    .collect(),
            })
        }

        async fn fetch_all(&self, _table: ReferenceTable) -> Result<RowSet, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RowSet {
                columns: vec!["utilization_rate".into(), "borrow_apy".into()],
                rows: vec![
                    vec![Value::Integer(0), Value::Real(0.052)],
                    vec![Value::Integer(1), Value::Real(0.0519)],
                ],
            })
        }
    }

    fn params(end_time: &str, limit: &str, scale: &str) -> RawWindowParams {
        RawWindowParams {
            end_time: Some(end_time.to_string()),
            limit: Some(limit.to_string()),
            scale: Some(scale.to_string()),
            asset_id: None,
        }
    }

    fn time_column(rows: &[Vec<JsonValue>]) -> Vec<i64> {
        rows.iter()
            .map(|row| row[1].as_str().unwrap().parse().unwrap())
            .collect()
    }

    fn five_samples() -> Vec<(i64, i64, f64)> {
        [100, 200, 300, 400, 500]
            .into_iter()
            .map(|t| (0, t, 1.5))
            .collect()
    }

    #[tokio::test]
    async fn test_one_minute_scale_newest_first() {
        let store = MemoryStore::new(five_samples());
        let engine = QueryEngine::new(store.clone());

        let rows = engine
            .windowed(SeriesTable::KylixToken, &params("500", "2", "1m"))
            .await
            .unwrap();

        assert_eq!(time_column(&rows), vec![500, 400]);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_five_minute_scale_short_window() {
        let store = MemoryStore::new(five_samples());
        let engine = QueryEngine::new(store);

        let rows = engine
            .windowed(SeriesTable::KylixToken, &params("500", "2", "5m"))
            .await
            .unwrap();

        assert_eq!(time_column(&rows), vec![500]);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let store = MemoryStore::new(Vec::new());
        let engine = QueryEngine::new(store);

        let rows = engine
            .windowed(SeriesTable::TotalSupplyBorrow, &params("500", "40", "1h"))
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_result_bounded_and_descending() {
        // One sample per minute over two days
        let samples: Vec<(i64, i64, f64)> = (0..2 * 1440)
            .map(|i| (0, 1_700_000_000 + i * 60, i as f64))
            .collect();
        let end = 1_700_000_000 + 2 * 1440 * 60;
        let store = MemoryStore::new(samples);
        let engine = QueryEngine::new(store);

        for scale in ["1m", "5m", "15m", "1h", "12h", "1d"] {
            for limit in [1usize, 3, 40] {
                let rows = engine
                    .windowed(
                        SeriesTable::KylixToken,
                        &params(&end.to_string(), &limit.to_string(), scale),
                    )
                    .await
                    .unwrap();
                assert!(rows.len() <= limit, "scale={} limit={}", scale, limit);
                let times = time_column(&rows);
                assert!(times.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[tokio::test]
    async fn test_stride_spacing_on_full_window() {
        let samples: Vec<(i64, i64, f64)> = (0..100).map(|i| (0, i * 60, 0.0)).collect();
        let store = MemoryStore::new(samples);
        let engine = QueryEngine::new(store);

        let rows = engine
            .windowed(SeriesTable::KylixToken, &params("5940", "4", "15m"))
            .await
            .unwrap();

        // Newest sample first, then every 15th row
        assert_eq!(time_column(&rows), vec![5940, 5040, 4140, 3240]);
    }

    #[tokio::test]
    async fn test_invalid_params_never_touch_store() {
        let store = MemoryStore::new(five_samples());
        let engine = QueryEngine::new(store.clone());

        let cases = [
            params("500", "0", "1m"),
            params("500", "-5", "1m"),
            params("500", "2", "2m"),
            params("abc", "2", "1m"),
        ];
        for raw in cases {
            let err = engine.windowed(SeriesTable::KylixToken, &raw).await.unwrap_err();
            assert!(err.is_client_error());
        }

        let mut raw = params("500", "2", "1m");
        raw.asset_id = Some("-1".to_string());
        let err = engine.windowed(SeriesTable::PoolsData, &raw).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidAssetId(_)));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_asset_filter_only_on_pools() {
        let store = MemoryStore::new(vec![(3, 100, 1.0), (7, 200, 2.0), (3, 300, 3.0)]);
        let engine = QueryEngine::new(store);

        let mut raw = params("500", "10", "1m");
        raw.asset_id = Some("3".to_string());

        let pools = engine.windowed(SeriesTable::PoolsData, &raw).await.unwrap();
        assert_eq!(time_column(&pools), vec![300, 100]);
        assert!(pools.iter().all(|row| row[0] == JsonValue::from("3")));

        // Non-asset tables ignore the parameter
        let token = engine.windowed(SeriesTable::KylixToken, &raw).await.unwrap();
        assert_eq!(token.len(), 3);
    }

    #[tokio::test]
    async fn test_reference_named_rows() {
        let store = MemoryStore::new(Vec::new());
        let engine = QueryEngine::new(store.clone());

        let rows = engine.reference(ReferenceTable::InterestRateModel).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["utilization_rate"], JsonValue::from("0"));
        assert_eq!(rows[0]["borrow_apy"], JsonValue::from("0.052"));
        assert_eq!(rows[1]["borrow_apy"], JsonValue::from("0.0519"));
        assert_eq!(store.calls(), 1);
    }
}
