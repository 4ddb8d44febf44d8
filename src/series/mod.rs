//! Synthetic daily series.
//!
//! Every generator takes the number of days, the calendar day the series ends
//! on, and a caller-owned random source. A fixed seed gives a byte-identical
//! series; zero days gives an empty one.

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod composition;
pub mod cyclic;
pub mod derived;
pub mod models;
pub mod price;
pub mod returns;

pub use cyclic::{cyclic_series, metric_series, mvrv_series, CyclicParams, MetricKind, MvrvPoint};
pub use price::{oscillating_walk, price_series, spot_walk, GbmParams, OscillatingWalkParams, SpotWalkParams};

pub const DAY_MS: i64 = 86_400_000;

/// One value per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub ts: i64,
    pub value: f64,
}

/// Daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: i64,
    pub price: f64,
}

pub type PriceSeries = Vec<PriceBar>;

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Days from 0001-01-01 (day 1) to 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i64 = 719_163;

/// Epoch millis of 00:00 UTC on `date`.
pub fn day_ts(date: NaiveDate) -> i64 {
    (date.num_days_from_ce() as i64 - UNIX_EPOCH_CE_DAYS) * DAY_MS
}

pub fn date_of(ts: i64) -> NaiveDate {
    let days = ts.div_euclid(DAY_MS) + UNIX_EPOCH_CE_DAYS;
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .unwrap_or(NaiveDate::MIN)
}

/// `days` contiguous calendar days ending on `end` (inclusive).
pub fn day_timestamps(days: usize, end: NaiveDate) -> Vec<i64> {
    if days == 0 {
        return Vec::new();
    }
    let last = day_ts(end);
    let first = last - (days as i64 - 1) * DAY_MS;
    (0..days as i64).map(|i| first + i * DAY_MS).collect()
}

/// Uniform draw on [-0.5, 0.5).
pub(crate) fn centered<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() - 0.5
}

/// SHA-256 of the JSON encoding, hex encoded.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_ts_epoch() {
        assert_eq!(day_ts(date(1970, 1, 1)), 0);
        assert_eq!(day_ts(date(1970, 1, 2)), DAY_MS);
        assert_eq!(day_ts(date(2021, 1, 1)), 1_609_459_200_000);
    }

    #[test]
    fn test_date_of_round_trips_pre_epoch() {
        let d = date(1969, 12, 31);
        assert_eq!(date_of(day_ts(d)), d);
    }

    #[test]
    fn test_day_timestamps_end_on_given_day() {
        let end = date(2024, 3, 1);
        let ts = day_timestamps(3, end);
        assert_eq!(ts.len(), 3);
        assert_eq!(date_of(ts[0]), date(2024, 2, 28));
        assert_eq!(date_of(ts[1]), date(2024, 2, 29));
        assert_eq!(date_of(ts[2]), end);
    }

    #[test]
    fn test_day_timestamps_empty() {
        assert!(day_timestamps(0, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = vec![TimePoint { ts: 0, value: 1.5 }];
        let b = vec![TimePoint { ts: 0, value: 1.5 }];
        let c = vec![TimePoint { ts: 0, value: 1.25 }];
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
        assert_eq!(fingerprint(&a).len(), 64);
    }
}
