//! Coarsening scales and their decimation strides

/// Client-selectable coarsening scale.
///
/// Strides are sample counts at the one-sample-per-minute ingestion cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scale {
    #[default]
    Min1,
    Min5,
    Min15,
    Hour1,
    Hour12,
    Day1,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Min1 => "1m",
            Scale::Min5 => "5m",
            Scale::Min15 => "15m",
            Scale::Hour1 => "1h",
            Scale::Hour12 => "12h",
            Scale::Day1 => "1d",
        }
    }

    pub fn stride(&self) -> usize {
        match self {
            Scale::Min1 => 1,
            Scale::Min5 => 5,
            Scale::Min15 => 15,
            Scale::Hour1 => 60,
            Scale::Hour12 => 12 * 60,
            Scale::Day1 => 24 * 60,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Scale::Min1),
            "5m" => Some(Scale::Min5),
            "15m" => Some(Scale::Min15),
            "1h" => Some(Scale::Hour1),
            "12h" => Some(Scale::Hour12),
            "1d" => Some(Scale::Day1),
            _ => None,
        }
    }

    pub fn all() -> [Scale; 6] {
        [
            Scale::Min1,
            Scale::Min5,
            Scale::Min15,
            Scale::Hour1,
            Scale::Hour12,
            Scale::Day1,
        ]
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
