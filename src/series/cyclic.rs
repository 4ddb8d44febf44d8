//! The shared cyclic generator behind every on-chain and valuation ratio.
//!
//! A slow sinusoid (starting at its trough) plus a faster harmonic at 0.37x the
//! period, scaled by an amplitude around a base level, with noise that grows on
//! the up-swing. Each named metric is one row of parameters.

use std::f64::consts::PI;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{centered, day_timestamps, fingerprint, TimePoint};
use crate::logging::log_series;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclicParams {
    pub period: f64,
    pub amplitude: f64,
    pub base: f64,
    pub noise: f64,
}

/// Primary cycle value in [-1, 1] at day `i`.
pub fn primary_cycle(i: usize, period: f64) -> f64 {
    (i as f64 / period * 2.0 * PI - PI / 2.0).sin()
}

/// Value at day `i` for a centered uniform draw `u` in [-0.5, 0.5).
pub fn cyclic_value(i: usize, params: &CyclicParams, u: f64) -> f64 {
    let cycle = primary_cycle(i, params.period);
    let irregularity = (i as f64 / (params.period * 0.37) * 2.0 * PI).sin() * 0.2;
    let value = params.base + (cycle + irregularity) * params.amplitude + u * params.noise * (1.0 + cycle);
    value.max(0.0)
}

pub fn cyclic_series<R: Rng + ?Sized>(
    days: usize,
    params: &CyclicParams,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<TimePoint> {
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| TimePoint { ts, value: cyclic_value(i, params, centered(rng)) })
        .collect()
}

/// Named metrics produced by the cyclic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    MvrvZScore,
    Sopr,
    Nupl,
    Ssr,
    RhodlRatio,
    PuellMultiple,
    RsiLike,
    AltcoinSeason,
}

impl MetricKind {
    pub const ALL: [MetricKind; 8] = [
        MetricKind::MvrvZScore,
        MetricKind::Sopr,
        MetricKind::Nupl,
        MetricKind::Ssr,
        MetricKind::RhodlRatio,
        MetricKind::PuellMultiple,
        MetricKind::RsiLike,
        MetricKind::AltcoinSeason,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::MvrvZScore => "mvrv-z-score",
            MetricKind::Sopr => "sopr",
            MetricKind::Nupl => "nupl",
            MetricKind::Ssr => "ssr",
            MetricKind::RhodlRatio => "rhodl-ratio",
            MetricKind::PuellMultiple => "puell-multiple",
            MetricKind::RsiLike => "rsi",
            MetricKind::AltcoinSeason => "altcoin-season",
        }
    }

    pub fn params(&self) -> CyclicParams {
        let (period, amplitude, base, noise) = match self {
            MetricKind::MvrvZScore => (1460.0, 4.5, 3.5, 1.5),
            MetricKind::Sopr => (1460.0, 0.4, 1.1, 0.2),
            MetricKind::Nupl => (1460.0, 0.6, 0.25, 0.15),
            MetricKind::Ssr => (1460.0, 10.0, 12.0, 5.0),
            MetricKind::RhodlRatio => (1460.0, 40_000.0, 45_000.0, 10_000.0),
            MetricKind::PuellMultiple => (1460.0, 2.0, 1.5, 0.8),
            MetricKind::RsiLike => (90.0, 30.0, 50.0, 10.0),
            MetricKind::AltcoinSeason => (240.0, 45.0, 50.0, 20.0),
        };
        CyclicParams { period, amplitude, base, noise }
    }

    pub fn default_days(&self) -> usize {
        match self {
            MetricKind::RsiLike => 365,
            MetricKind::AltcoinSeason => 730,
            _ => 1825,
        }
    }

    /// Metric-specific mapping applied to the raw cyclic value.
    pub fn transform(&self, raw: f64) -> f64 {
        match self {
            MetricKind::MvrvZScore => (raw - 4.0).max(-1.0),
            MetricKind::Nupl => raw.clamp(-0.5, 1.0),
            MetricKind::RsiLike | MetricKind::AltcoinSeason => raw.clamp(0.0, 100.0),
            _ => raw,
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric: {}", s))
    }
}

pub fn metric_series<R: Rng + ?Sized>(kind: MetricKind, end: NaiveDate, rng: &mut R) -> Vec<TimePoint> {
    metric_series_with_days(kind, kind.default_days(), end, rng)
}

pub fn metric_series_with_days<R: Rng + ?Sized>(
    kind: MetricKind,
    days: usize,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<TimePoint> {
    let series: Vec<TimePoint> = cyclic_series(days, &kind.params(), end, rng)
        .into_iter()
        .map(|p| TimePoint { ts: p.ts, value: kind.transform(p.value) })
        .collect();
    log_series(kind.as_str(), series.len(), &fingerprint(&series));
    series
}

/// MVRV ratio with its Z-score; the chart plots both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvrvPoint {
    pub ts: i64,
    pub value: f64,
    pub z_score: f64,
}

pub fn mvrv_series<R: Rng + ?Sized>(end: NaiveDate, rng: &mut R) -> Vec<MvrvPoint> {
    let kind = MetricKind::MvrvZScore;
    let series: Vec<MvrvPoint> = cyclic_series(kind.default_days(), &kind.params(), end, rng)
        .into_iter()
        .map(|p| MvrvPoint { ts: p.ts, value: p.value, z_score: kind.transform(p.value) })
        .collect();
    log_series(kind.as_str(), series.len(), &fingerprint(&series));
    series
}

/// Sentiment zones of the NUPL chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NuplZone {
    Capitulation,
    Hope,
    Optimism,
    Belief,
    Euphoria,
}

impl NuplZone {
    pub fn for_value(v: f64) -> Self {
        if v >= 0.75 {
            NuplZone::Euphoria
        } else if v >= 0.5 {
            NuplZone::Belief
        } else if v >= 0.25 {
            NuplZone::Optimism
        } else if v >= 0.0 {
            NuplZone::Hope
        } else {
            NuplZone::Capitulation
        }
    }
}
