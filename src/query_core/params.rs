//! Window request validation
//!
//! Every check here runs before any storage access.

use super::error::QueryError;
use super::scale::Scale;
use serde::Deserialize;

pub const DEFAULT_LIMIT: &str = "40";
pub const DEFAULT_SCALE: &str = "1m";

/// Query string parameters exactly as the client sent them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWindowParams {
    pub end_time: Option<String>,
    pub limit: Option<String>,
    pub scale: Option<String>,
    pub asset_id: Option<String>,
}

impl RawWindowParams {
    /// Build from decoded query pairs. A repeated key keeps its first value;
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "end_time" => &mut raw.end_time,
                "limit" => &mut raw.limit,
                "scale" => &mut raw.scale,
                "asset_id" => &mut raw.asset_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        raw
    }
}

/// A validated window request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    pub end_time: i64,
    pub limit: i64,
    pub scale: Scale,
    pub asset_id: Option<i64>,
}

impl WindowRequest {
    /// Validate raw parameters.
    ///
    /// `asset_id` is only read when `with_asset_filter` is set; other endpoints
    /// ignore it. Checks run in the order asset id, limit, end time, scale.
    pub fn parse(raw: &RawWindowParams, with_asset_filter: bool) -> Result<Self, QueryError> {
        let asset_id = if with_asset_filter {
            raw.asset_id.as_deref().map(parse_asset_id).transpose()?
        } else {
            None
        };

        let limit = parse_limit(raw.limit.as_deref().unwrap_or(DEFAULT_LIMIT))?;
        let end_time = parse_end_time(raw.end_time.as_deref())?;
        let scale = parse_scale(raw.scale.as_deref().unwrap_or(DEFAULT_SCALE))?;

        // adjusted_limit must stay representable as a bound i64 parameter
        if limit.checked_mul(scale.stride() as i64).is_none() {
            return Err(QueryError::InvalidLimit(format!(
                "Limit is too large for scale {}.",
                scale
            )));
        }

        Ok(Self {
            end_time,
            limit,
            scale,
            asset_id,
        })
    }

    pub fn stride(&self) -> usize {
        self.scale.stride()
    }

    /// Rows to fetch before decimation: `limit * stride`.
    pub fn adjusted_limit(&self) -> i64 {
        self.limit.saturating_mul(self.scale.stride() as i64)
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

fn parse_limit(s: &str) -> Result<i64, QueryError> {
    match parse_int(s) {
        Some(limit) if limit > 0 => Ok(limit),
        _ => Err(QueryError::InvalidLimit(
            "Limit must be a positive integer.".to_string(),
        )),
    }
}

fn parse_end_time(s: Option<&str>) -> Result<i64, QueryError> {
    s.and_then(parse_int).ok_or_else(|| {
        QueryError::InvalidTimestamp("Invalid Unix timestamp format.".to_string())
    })
}

fn parse_scale(s: &str) -> Result<Scale, QueryError> {
    Scale::from_str(s).ok_or_else(|| {
        let options: Vec<&str> = Scale::all().iter().map(|s| s.as_str()).collect();
        QueryError::InvalidScale(format!(
            "Invalid scale. Valid options are {}.",
            options.join(", ")
        ))
    })
}

fn parse_asset_id(s: &str) -> Result<i64, QueryError> {
    let asset_id = parse_int(s)
        .ok_or_else(|| QueryError::InvalidAssetId("Invalid asset ID format.".to_string()))?;
    if asset_id < 0 {
        return Err(QueryError::InvalidAssetId(
            "Asset ID must be a non-negative integer.".to_string(),
        ));
    }
    Ok(asset_id)
}
