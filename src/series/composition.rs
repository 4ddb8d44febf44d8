//! Share-of-total series: market dominance and HODL age bands.

use std::f64::consts::PI;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::day_timestamps;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominancePoint {
    pub ts: i64,
    pub btc: f64,
    pub eth: f64,
    pub others: f64,
}

pub fn dominance_series(days: usize, end: NaiveDate) -> Vec<DominancePoint> {
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            let i = i as f64;
            let btc = 0.55 + (i / 1460.0 * 2.0 * PI).sin() * 0.15;
            let eth = 0.18 + (i / 1000.0 * 2.0 * PI + PI).sin() * 0.04;
            DominancePoint { ts, btc, eth, others: 1.0 - btc - eth }
        })
        .collect()
}

/// Age bands, oldest first.
pub const HODL_BANDS: [&str; 7] = ["> 5y", "3y-5y", "1y-3y", "6m-1y", "3m-6m", "1m-3m", "< 1m"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HodlWavePoint {
    pub ts: i64,
    /// Share per band, indexed like `HODL_BANDS`.
    pub bands: [f64; 7],
}

impl HodlWavePoint {
    pub fn total(&self) -> f64 {
        self.bands.iter().sum()
    }
}

pub fn hodl_waves<R: Rng + ?Sized>(days: usize, end: NaiveDate, rng: &mut R) -> Vec<HodlWavePoint> {
    day_timestamps(days, end)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            // 0 at the cycle trough, 1 at the crest
            let cycle = (1.0 + (i as f64 / 1460.0 * 2.0 * PI + PI * 1.5).sin()) / 2.0;
            let young = 1.0 - cycle;
            let bands = [
                0.1 + cycle * 0.1,
                0.2 + cycle * 0.1,
                0.3 + cycle * 0.1,
                0.15 - cycle * 0.1,
                0.1 * young,
                0.05 * young,
                (0.1 + rng.gen::<f64>() * 0.1) * young,
            ];
            HodlWavePoint { ts, bands }
        })
        .collect()
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
    fn test_dominance_sums_to_one() {
        for p in dominance_series(1825, end()) {
            assert!((p.btc + p.eth + p.others - 1.0).abs() < 1e-12);
            assert!(p.others > 0.0);
        }
    }

    #[test]
    fn test_hodl_bands_non_negative() {
        let mut rng = StdRng::seed_from_u64(2);
        let waves = hodl_waves(1825, end(), &mut rng);
        assert_eq!(waves.len(), 1825);
        for p in &waves {
            assert!(p.bands.iter().all(|b| *b >= 0.0));
            // Long bands add to 0.75 + 0.2*cycle; short bands stay below 0.35.
            assert!(p.total() > 0.7 && p.total() < 1.2);
        }
    }
}
