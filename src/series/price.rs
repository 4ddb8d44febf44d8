//! Price paths: a geometric random walk with synthetic OHLCV, the short
//! headline spot walk, and the additive oscillating walk that feeds the
//! technical-analysis charts.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{centered, day_timestamps, PriceBar, PricePoint, PriceSeries};

/// Geometric Brownian motion parameters (daily).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    pub start_price: f64,
    pub drift: f64,
    pub volatility: f64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self { start_price: 5000.0, drift: 0.0007, volatility: 0.025 }
    }
}

/// Sum of four uniforms minus two: mean 0, variance 1/3.
pub fn irwin_hall<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (0..4).map(|_| rng.gen::<f64>()).sum::<f64>() - 2.0
}

/// One multiplicative step of the walk for a given normal-ish draw.
pub fn gbm_step(price: f64, params: &GbmParams, z: f64) -> f64 {
    let vol = params.volatility;
    (price * (params.drift - 0.5 * vol * vol + vol * z).exp()).max(0.0)
}

pub fn price_series<R: Rng + ?Sized>(
    days: usize,
    params: &GbmParams,
    end: NaiveDate,
    rng: &mut R,
) -> PriceSeries {
    let mut price = params.start_price;
    day_timestamps(days, end)
        .into_iter()
        .map(|ts| {
            let z = irwin_hall(rng);
            price = gbm_step(price, params, z);
            let open = price * (1.0 + centered(rng) * 0.03);
            let high = price.max(open) * (1.0 + rng.gen::<f64>() * 0.02);
            let low = price.min(open) * (1.0 - rng.gen::<f64>() * 0.02);
            let volume = rng.gen::<f64>() * 1e9 + (price / 60_000.0) * 0.5 * 1e9;
            PriceBar { ts, open, high, low, close: price, volume }
        })
        .collect()
}

/// Short-horizon spot walk for the dashboard headline chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotWalkParams {
    pub start_price: f64,
    pub volatility: f64,
    pub trend_amplitude: f64,
    pub trend_period: f64,
}

impl Default for SpotWalkParams {
    fn default() -> Self {
        Self { start_price: 68_500.0, volatility: 0.03, trend_amplitude: 0.005, trend_period: 20.0 }
    }
}

pub fn spot_walk<R: Rng + ?Sized>(
    days: usize,
    params: &SpotWalkParams,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<PricePoint> {
    let mut price = params.start_price;
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            let trend = (i as f64 / params.trend_period).sin() * params.trend_amplitude;
            price = (price * (1.0 + centered(rng) * params.volatility + trend)).max(0.0);
            PricePoint { ts, price }
        })
        .collect()
}

/// Additive walk `price += sin(i/period)*swing + U(-0.5,0.5)*noise`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatingWalkParams {
    pub start_price: f64,
    pub period: f64,
    pub swing: f64,
    pub noise: f64,
}

impl OscillatingWalkParams {
    /// Input path of the Bollinger band chart.
    pub const BOLLINGER: Self = Self { start_price: 50_000.0, period: 50.0, swing: 1000.0, noise: 3000.0 };
    /// Input path of the golden/death cross chart.
    pub const CROSS: Self = Self { start_price: 50_000.0, period: 80.0, swing: 1500.0, noise: 3000.0 };
}

pub fn oscillating_walk<R: Rng + ?Sized>(
    days: usize,
    params: &OscillatingWalkParams,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<PricePoint> {
    let mut price = params.start_price;
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            price += (i as f64 / params.period).sin() * params.swing + centered(rng) * params.noise;
            price = price.max(0.0);
            PricePoint { ts, price }
        })
        .collect()
}
