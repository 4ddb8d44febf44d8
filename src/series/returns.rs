//! Return tables: monthly returns, cycle ROI curves, day-of-week DCA returns,
//! the 24h heatmap and the static overview and risk figures.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReturns {
    pub year: i32,
    /// Percent return per month, January first.
    pub months: [f64; 12],
}

pub fn monthly_returns<R: Rng + ?Sized>(years: RangeInclusive<i32>, rng: &mut R) -> Vec<YearReturns> {
    years
        .map(|year| {
            let mut months = [0.0; 12];
            for m in months.iter_mut() {
                *m = (rng.gen::<f64>() - 0.4) * 50.0;
            }
            YearReturns { year, months }
        })
        .collect()
}

pub const BOTTOM_CYCLES: [&str; 3] = ["2015-2018", "2018-2021", "2022-Now"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiPoint {
    pub days: u32,
    /// ROI multiple per cycle, indexed like `BOTTOM_CYCLES`.
    pub cycles: [f64; 3],
}

/// Days 1..1095 after each cycle bottom.
pub fn roi_since_bottom() -> Vec<RoiPoint> {
    (1..1095u32)
        .map(|days| {
            let d = days as f64;
            RoiPoint { days, cycles: [d.powf(1.8) * 0.1, d.powf(1.7) * 0.2, d.powf(1.6) * 0.4] }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayRoi {
    pub day: &'static str,
    pub roi: f64,
}

pub fn best_day_to_dca() -> Vec<WeekdayRoi> {
    [
        ("Mon", 15.2),
        ("Tue", 16.1),
        ("Wed", 15.8),
        ("Thu", 17.5),
        ("Fri", 14.9),
        ("Sat", 18.2),
        ("Sun", 20.1),
    ]
    .into_iter()
    .map(|(day, roi)| WeekdayRoi { day, roi })
    .collect()
}

/// Day with the highest ROI; ties keep the earliest day.
pub fn best_weekday(rows: &[WeekdayRoi]) -> Option<WeekdayRoi> {
    rows.iter().copied().fold(None, |best, row| match best {
        Some(b) if b.roi >= row.roi => Some(b),
        _ => Some(row),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapTile {
    pub ticker: &'static str,
    pub price: f64,
    pub change_pct: f64,
}

pub fn heatmap() -> Vec<HeatmapTile> {
    [
        ("BTC", 68123.0, 2.5),
        ("ETH", 3500.0, 1.2),
        ("SOL", 160.0, -1.8),
        ("XRP", 0.52, 0.5),
        ("DOGE", 0.15, 5.1),
        ("ADA", 0.45, -0.1),
        ("SHIB", 0.000025, 3.3),
        ("AVAX", 35.0, -2.4),
        ("DOT", 7.1, 1.1),
        ("LINK", 17.5, -0.8),
        ("TRX", 0.11, 0.1),
        ("BCH", 450.0, 4.2),
    ]
    .into_iter()
    .map(|(ticker, price, change_pct)| HeatmapTile { ticker, price, change_pct })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketCard {
    pub name: &'static str,
    pub ticker: &'static str,
    pub price: f64,
    pub change_pct: f64,
    pub market_cap: f64,
}

impl MarketCard {
    pub fn heat(&self) -> HeatLevel {
        HeatLevel::for_change(self.change_pct)
    }
}

/// Headline cards at the top of the dashboard.
pub fn market_overview() -> Vec<MarketCard> {
    vec![
        MarketCard { name: "Bitcoin", ticker: "BTC", price: 68_450.75, change_pct: 2.35, market_cap: 1.35e12 },
        MarketCard { name: "Ethereum", ticker: "ETH", price: 3_560.21, change_pct: -1.12, market_cap: 427.8e9 },
        MarketCard { name: "Total Market Cap", ticker: "TOTAL", price: 2.52e12, change_pct: 1.78, market_cap: 2.52e12 },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskRow {
    pub asset: &'static str,
    pub sharpe: f64,
    /// Percent, negative.
    pub max_drawdown_pct: f64,
    /// Annualised, percent.
    pub volatility_pct: f64,
    /// Against BTC.
    pub correlation: f64,
}

pub fn risk_table() -> Vec<RiskRow> {
    [
        ("BTC", 1.25, -55.0, 45.0, 1.0),
        ("ETH", 1.10, -65.0, 60.0, 0.85),
        ("TOTAL", 1.15, -60.0, 50.0, 0.95),
        ("SOL", 0.95, -80.0, 90.0, 0.78),
        ("XRP", 0.45, -90.0, 110.0, 0.65),
    ]
    .into_iter()
    .map(|(asset, sharpe, max_drawdown_pct, volatility_pct, correlation)| RiskRow {
        asset,
        sharpe,
        max_drawdown_pct,
        volatility_pct,
        correlation,
    })
    .collect()
}

/// Colour bucket for a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatLevel {
    StrongGain,
    Gain,
    SlightGain,
    Flat,
    SlightLoss,
    Loss,
    StrongLoss,
}

impl HeatLevel {
    /// Buckets for 24h price changes.
    pub fn for_change(pct: f64) -> Self {
        if pct >= 3.0 {
            HeatLevel::StrongGain
        } else if pct > 0.0 {
            HeatLevel::Gain
        } else if pct > -1.0 {
            HeatLevel::Flat
        } else if pct > -3.0 {
            HeatLevel::Loss
        } else {
            HeatLevel::StrongLoss
        }
    }

    /// Buckets for monthly returns.
    pub fn for_monthly_return(pct: f64) -> Self {
        if pct > 20.0 {
            HeatLevel::StrongGain
        } else if pct > 10.0 {
            HeatLevel::Gain
        } else if pct > 0.0 {
            HeatLevel::SlightGain
        } else if pct > -10.0 {
            HeatLevel::SlightLoss
        } else if pct > -20.0 {
            HeatLevel::Loss
        } else {
            HeatLevel::StrongLoss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_monthly_returns_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let table = monthly_returns(2020..=2024, &mut rng);
        assert_eq!(table.len(), 5);
        assert_eq!(table[0].year, 2020);
        for y in &table {
            assert!(y.months.iter().all(|r| (-20.0..30.0).contains(r)));
        }
    }

    #[test]
    fn test_roi_curves() {
        let roi = roi_since_bottom();
        assert_eq!(roi.len(), 1094);
        assert_eq!(roi[0].cycles, [0.1, 0.2, 0.4]);
    }

    #[test]
    fn test_best_weekday_is_sunday() {
        assert_eq!(best_weekday(&best_day_to_dca()).map(|d| d.day), Some("Sun"));
        assert_eq!(best_weekday(&[]), None);
    }

    #[test]
    fn test_static_dashboard_tables() {
        let cards = market_overview();
        assert_eq!(cards.iter().map(|c| c.ticker).collect::<Vec<_>>(), vec!["BTC", "ETH", "TOTAL"]);
        assert_eq!(cards[1].heat(), HeatLevel::Loss);

        let risk = risk_table();
        assert_eq!(risk.len(), 5);
        assert_eq!(risk[0].correlation, 1.0);
        assert!(risk.iter().all(|r| r.max_drawdown_pct < 0.0 && r.volatility_pct > 0.0));
    }

    #[test]
    fn test_heat_levels() {
        assert_eq!(HeatLevel::for_change(3.0), HeatLevel::StrongGain);
        assert_eq!(HeatLevel::for_change(0.1), HeatLevel::Gain);
        assert_eq!(HeatLevel::for_change(-0.1), HeatLevel::Flat);
        assert_eq!(HeatLevel::for_change(-2.4), HeatLevel::Loss);
        assert_eq!(HeatLevel::for_change(-3.0), HeatLevel::StrongLoss);
        assert_eq!(HeatLevel::for_monthly_return(25.0), HeatLevel::StrongGain);
        assert_eq!(HeatLevel::for_monthly_return(-15.0), HeatLevel::Loss);
        assert_eq!(heatmap().len(), 12);
    }
}
