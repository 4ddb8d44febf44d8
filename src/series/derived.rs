//! Series computed from a generated price path.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NvtsPoint {
    pub ts: i64,
    pub price: f64,
    pub nvts: f64,
}

/// Network value to transaction signal: price over volume, scaled.
pub fn nvts<R: Rng + ?Sized>(bars: &[PriceBar], rng: &mut R) -> Vec<NvtsPoint> {
    bars.iter()
        .map(|b| {
            let ratio = if b.volume > 0.0 { b.close / b.volume * 5e10 } else { 0.0 };
            NvtsPoint { ts: b.ts, price: b.close, nvts: ratio + rng.gen::<f64>() * 20.0 }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCapPoint {
    pub ts: i64,
    pub total: f64,
    pub altcoin: f64,
}

pub fn market_cap(bars: &[PriceBar]) -> Vec<MarketCapPoint> {
    bars.iter()
        .map(|b| MarketCapPoint { ts: b.ts, total: b.close * 4.5e6, altcoin: b.close * 2.5e6 })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestPoint {
    pub ts: i64,
    pub price: f64,
    pub open_interest: f64,
}

pub fn open_interest<R: Rng + ?Sized>(bars: &[PriceBar], rng: &mut R) -> Vec<OpenInterestPoint> {
    bars.iter()
        .map(|b| OpenInterestPoint {
            ts: b.ts,
            price: b.close,
            open_interest: b.volume * (1.5 + rng.gen::<f64>()),
        })
        .collect()
}
