//! Long-horizon valuation models: stock-to-flow and the logarithmic rainbow.

use std::f64::consts::PI;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{centered, day_timestamps};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct S2fPoint {
    pub ts: i64,
    pub price: f64,
    pub model: f64,
}

/// Model level for day `i` (1-based); steps up at each simulated halving.
pub fn s2f_level(i: usize) -> f64 {
    if i > 365 * 11 {
        1_000_000.0
    } else if i > 365 * 7 {
        100_000.0
    } else if i > 365 * 3 {
        8_000.0
    } else {
        1_000.0
    }
}

pub fn stock_to_flow<R: Rng + ?Sized>(days: usize, end: NaiveDate, rng: &mut R) -> Vec<S2fPoint> {
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(idx, ts)| {
            let i = idx + 1;
            let model = s2f_level(i);
            let cycle = (i as f64 / 1460.0 * 2.0 * PI - PI / 2.0).sin();
            let price = (model * (1.0 + cycle * 0.8) * (1.0 + centered(rng) * 0.3)).max(1.0);
            S2fPoint { ts, price, model }
        })
        .collect()
}

pub const RAINBOW_BANDS: [&str; 9] = [
    "Basically a Fire Sale",
    "BUY!",
    "Accumulate",
    "Still Cheap",
    "HODL!",
    "Is This A Bubble?",
    "FOMO Intensifies",
    "Sell. Seriously, SELL!",
    "Maximum Bubble Territory",
];

const RAINBOW_GROWTH: f64 = 2.1;
const RAINBOW_OFFSET: f64 = 5.5;
const RAINBOW_CYCLE_DAYS: f64 = 1460.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainbowPoint {
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Upper bound of each band, ascending.
    pub band_tops: [f64; 9],
}

fn rainbow_base(i: usize) -> f64 {
    RAINBOW_GROWTH * (i as f64).ln() + RAINBOW_OFFSET
}

fn rainbow_cycle(i: usize) -> f64 {
    (i as f64 / RAINBOW_CYCLE_DAYS * 2.0 * PI - PI / 1.8).sin()
}

pub fn rainbow<R: Rng + ?Sized>(days: usize, end: NaiveDate, rng: &mut R) -> Vec<RainbowPoint> {
    let n = RAINBOW_BANDS.len();
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(idx, ts)| {
            let i = idx + 1;
            let base = rainbow_base(i);
            let mut band_tops = [0.0; 9];
            for (j, top) in band_tops.iter_mut().enumerate() {
                let offset = (j as f64 - n as f64 / 2.0 + 0.5) * 0.5;
                *top = (base + offset).exp();
            }

            let volatility = 1.6 + (i as f64 / (RAINBOW_CYCLE_DAYS * 2.0)).sin() * 0.5;
            let noise = centered(rng) * 0.3 * (1.0 + i as f64 / days as f64);
            let close = (base + rainbow_cycle(i) * volatility + noise).exp();
            let open = if i > 1 {
                (rainbow_base(i - 1) + rainbow_cycle(i - 1) * volatility).exp()
            } else {
                close
            };
            let high = open.max(close) * (1.0 + rng.gen::<f64>() * 0.05);
            let low = open.min(close) * (1.0 - rng.gen::<f64>() * 0.05);

            RainbowPoint { ts, open, high, low, close, band_tops }
        })
        .collect()
}

/// Index into `RAINBOW_BANDS` of the lowest band whose top is at or above `price`.
pub fn rainbow_band(price: f64, point: &RainbowPoint) -> usize {
    point
        .band_tops
        .iter()
        .position(|top| price <= *top)
        .unwrap_or(RAINBOW_BANDS.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_s2f_levels_step_at_halvings() {
        assert_eq!(s2f_level(1), 1_000.0);
        assert_eq!(s2f_level(365 * 3 + 1), 8_000.0);
        assert_eq!(s2f_level(365 * 7 + 1), 100_000.0);
        assert_eq!(s2f_level(365 * 11 + 1), 1_000_000.0);
    }

    #[test]
    fn test_s2f_price_floor() {
        let mut rng = StdRng::seed_from_u64(8);
        let s = stock_to_flow(4380, end(), &mut rng);
        assert_eq!(s.len(), 4380);
        assert!(s.iter().all(|p| p.price >= 1.0));
    }

    #[test]
    fn test_rainbow_bands_ascending() {
        let mut rng = StdRng::seed_from_u64(8);
        let r = rainbow(2920, end(), &mut rng);
        assert_eq!(r.len(), 2920);
        for p in &r {
            assert!(p.band_tops.windows(2).all(|w| w[0] < w[1]));
            assert!(p.high >= p.close.max(p.open));
            assert!(p.low <= p.close.min(p.open));
        }
    }

    #[test]
    fn test_rainbow_band_lookup() {
        let mut rng = StdRng::seed_from_u64(8);
        let p = rainbow(10, end(), &mut rng)[9];
        assert_eq!(rainbow_band(0.0, &p), 0);
        assert_eq!(rainbow_band(p.band_tops[3], &p), 3);
        assert_eq!(rainbow_band(p.band_tops[8] * 2.0, &p), 8);
    }
}
