use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::quote::finite_decimal;

/// Number of points in the synthetic fallback series.
pub const SYNTHETIC_POINTS: usize = 3;

/// One daily close as returned by a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// Where a daily series came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Finnhub daily candles
    Primary,
    /// Stooq daily CSV
    Backup,
    /// Flat series seeded from the last known price
    Synthetic,
}

/// Chart-ready daily series: parallel label and price vectors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub prices: Vec<Decimal>,
}

impl DailySeries {
    /// Build a series from provider bars, skipping non-finite closes.
    pub fn from_bars(bars: &[DailyBar]) -> Self {
        let mut series = Self::default();
        for bar in bars {
            if let Some(close) = finite_decimal(Some(bar.close)) {
                series.labels.push(bar.date.format("%Y-%m-%d").to_string());
                series.prices.push(close);
            }
        }
        series
    }

    /// Flat placeholder series so charts never render blank.
    pub fn synthetic(seed: Decimal) -> Self {
        Self {
            labels: (1..=SYNTHETIC_POINTS).map(|i| i.to_string()).collect(),
            prices: vec![seed; SYNTHETIC_POINTS],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }
}

/// What the series resolver hands back to its caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResult {
    #[serde(flatten)]
    pub series: DailySeries,
    pub source: SeriesSource,
}
