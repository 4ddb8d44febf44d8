//! Technical indicators over synthetic price paths.
//!
//! The rolling primitives are stateful and updated one price at a time; the
//! batch functions run them over a whole path and keep the output aligned 1:1
//! with the input. A value that needs a look-back window is `None` until the
//! window is full.

use std::collections::VecDeque;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logging::log_indicator;
use crate::series::cyclic::metric_series_with_days;
use crate::series::{centered, day_timestamps, MetricKind, PricePoint, TimePoint};

// =============================================================================
// Rolling Statistics
// =============================================================================

/// Exponential smoother seeded with its first input.
#[derive(Debug, Clone)]
pub struct Ema {
    pub value: f64,
    pub alpha: f64,
    initialized: bool,
}

impl Ema {
    pub fn with_alpha(alpha: f64) -> Self {
        Self { value: 0.0, alpha, initialized: false }
    }

    pub fn update(&mut self, x: f64) -> f64 {
        if !self.initialized {
            self.value = x;
            self.initialized = true;
        } else {
            self.value = self.value * (1.0 - self.alpha) + x * self.alpha;
        }
        self.value
    }
}

/// Simple moving average with fixed window
#[derive(Debug, Clone)]
pub struct Sma {
    window: VecDeque<f64>,
    period: usize,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period,
            sum: 0.0,
        }
    }

    pub fn update(&mut self, price: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        self.sum += price;
        self.window.push_back(price);
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap_or(0.0);
        }
        self.get()
    }

    pub fn get(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.period > 0 && self.window.len() >= self.period
    }
}

/// Rolling population standard deviation over a fixed window.
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: VecDeque<f64>,
    period: usize,
    mean: f64,
    m2: f64,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period,
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }

        // Recomputed from the window; incremental updates drift on long paths.
        let n = self.window.len() as f64;
        self.mean = self.window.iter().sum::<f64>() / n;
        self.m2 = self.window.iter().map(|x| (x - self.mean).powi(2)).sum::<f64>();
        self.get()
    }

    pub fn get(&self) -> Option<f64> {
        if self.period == 0 || self.window.len() < self.period {
            return None;
        }
        Some((self.m2 / self.period as f64).sqrt())
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

// =============================================================================
// Batch indicators
// =============================================================================

/// Trailing `n`-period mean; `None` for the first `n - 1` values.
pub fn sma(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut avg = Sma::new(n);
    let out: Vec<Option<f64>> = values.iter().map(|v| avg.update(*v)).collect();
    log_indicator("sma", n, out.len(), out.iter().filter(|v| v.is_none()).count());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub ts: i64,
    pub value: Option<f64>,
}

/// `sma` keyed by the timestamps of `points`.
pub fn sma_series(points: &[PricePoint], n: usize) -> Vec<IndicatorPoint> {
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    points
        .iter()
        .zip(sma(&prices, n))
        .map(|(p, value)| IndicatorPoint { ts: p.ts, value })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

impl Band {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Position of `price` within the band: 0 at the lower edge, 1 at the upper.
    pub fn percent_b(&self, price: f64) -> f64 {
        let w = self.width();
        if w > 0.0 {
            (price - self.lower) / w
        } else {
            0.5
        }
    }
}

/// Trailing mean +/- `k` population standard deviations.
pub fn bollinger(values: &[f64], n: usize, k: f64) -> Vec<Option<Band>> {
    let mut avg = Sma::new(n);
    let mut dev = RollingStd::new(n);
    let out: Vec<Option<Band>> = values
        .iter()
        .map(|v| {
            let (middle, sd) = (avg.update(*v), dev.update(*v));
            let (middle, sd) = (middle?, sd?);
            Some(Band { lower: middle - k * sd, middle, upper: middle + k * sd })
        })
        .collect();
    log_indicator("bollinger", n, out.len(), out.iter().filter(|v| v.is_none()).count());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub ts: i64,
    pub price: f64,
    pub band: Option<Band>,
}

pub fn bollinger_series(points: &[PricePoint], n: usize, k: f64) -> Vec<BandPoint> {
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    points
        .iter()
        .zip(bollinger(&prices, n, k))
        .map(|(p, band)| BandPoint { ts: p.ts, price: p.price, band })
        .collect()
}

/// Stylized RSI: the shared cyclic generator bounded to [0, 100]. It does not
/// derive from gains and losses of a price path.
pub fn rsi_like<R: Rng + ?Sized>(days: usize, end: NaiveDate, rng: &mut R) -> Vec<TimePoint> {
    metric_series_with_days(MetricKind::RsiLike, days, end, rng)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub ts: i64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Weight of the newest MACD value in the signal line.
pub const MACD_SIGNAL_ALPHA: f64 = 0.8;

/// Stylized MACD: a momentum random walk with a one-pole signal line.
pub fn macd_like<R: Rng + ?Sized>(days: usize, end: NaiveDate, rng: &mut R) -> Vec<MacdPoint> {
    let mut macd = 0.0;
    let mut smoother = Ema::with_alpha(MACD_SIGNAL_ALPHA);
    let out: Vec<MacdPoint> = day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            if i > 0 {
                let momentum = (i as f64 / 50.0 * std::f64::consts::PI).sin() * 50.0;
                macd += momentum + centered(rng) * 20.0;
            }
            let signal = smoother.update(macd);
            MacdPoint { ts, macd, signal, histogram: macd - signal }
        })
        .collect();
    log_indicator("macd", 0, out.len(), 0);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossPoint {
    pub ts: i64,
    pub price: f64,
    pub fast: Option<f64>,
    pub slow: Option<f64>,
}

impl CrossPoint {
    /// `fast - slow` once both averages are defined.
    pub fn spread(&self) -> Option<f64> {
        Some(self.fast? - self.slow?)
    }
}

pub const GOLDEN_CROSS_FAST: usize = 50;
pub const GOLDEN_CROSS_SLOW: usize = 200;

pub fn moving_average_cross(points: &[PricePoint], fast: usize, slow: usize) -> Vec<CrossPoint> {
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let fast_ma = sma(&prices, fast);
    let slow_ma = sma(&prices, slow);
    points
        .iter()
        .zip(fast_ma.into_iter().zip(slow_ma))
        .map(|(p, (fast, slow))| CrossPoint { ts: p.ts, price: p.price, fast, slow })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossKind {
    /// Fast average moves above the slow one.
    Golden,
    /// Fast average moves below the slow one.
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossEvent {
    pub index: usize,
    pub ts: i64,
    pub kind: CrossKind,
}

/// Points where the sign of `fast - slow` flips between consecutive defined
/// points. A zero spread carries the previous sign forward.
pub fn cross_events(points: &[CrossPoint]) -> Vec<CrossEvent> {
    let mut events = Vec::new();
    let mut prev_above: Option<bool> = None;
    for (index, p) in points.iter().enumerate() {
        let Some(spread) = p.spread() else { continue };
        if spread == 0.0 {
            continue;
        }
        let above = spread > 0.0;
        if let Some(was_above) = prev_above {
            if above != was_above {
                let kind = if above { CrossKind::Golden } else { CrossKind::Death };
                events.push(CrossEvent { index, ts: p.ts, kind });
            }
        }
        prev_above = Some(above);
    }
    events
}

// =============================================================================
// Tests
// =============================================================================
