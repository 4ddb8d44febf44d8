//! The dashboard's chart directory and the generator behind each entry.

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::error::CatalogError;
use crate::indicators::{
    bollinger_series, cross_events, macd_like, moving_average_cross, BandPoint, CrossEvent, CrossPoint,
    MacdPoint, GOLDEN_CROSS_FAST, GOLDEN_CROSS_SLOW,
};
use crate::logging::ProfileScope;
use crate::series::composition::{dominance_series, hodl_waves, DominancePoint, HodlWavePoint};
use crate::series::derived::{market_cap, nvts, open_interest, MarketCapPoint, NvtsPoint, OpenInterestPoint};
use crate::series::models::{stock_to_flow, S2fPoint};
use crate::series::returns::{
    best_day_to_dca, heatmap, monthly_returns, roi_since_bottom, HeatmapTile, RoiPoint, WeekdayRoi, YearReturns,
};
use crate::series::{
    metric_series, mvrv_series, oscillating_walk, price_series, GbmParams, MetricKind, MvrvPoint,
    OscillatingWalkParams, TimePoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartCategory {
    pub name: &'static str,
    pub charts: &'static [ChartInfo],
}

const fn chart(id: &'static str, name: &'static str, description: &'static str) -> ChartInfo {
    ChartInfo { id, name, description }
}

static CATEGORIES: [ChartCategory; 6] = [
    ChartCategory {
        name: "Valuation",
        charts: &[
            chart("mvrv-z-score", "MVRV Z-Score", "Assesses when Bitcoin is over/undervalued relative to its \"fair value\"."),
            chart("sopr", "Spent Output Profit Ratio (SOPR)", "Indicates if holders are selling at a profit or loss. Values > 1 indicate profit."),
            chart("nupl", "Net Unrealized Profit/Loss (NUPL)", "Shows the total amount of profit/loss in all coins, split into sentiment zones."),
            chart("nvts", "Network Value to Transaction Signal (NVTS)", "A valuation multiple based on transaction volume vs. market cap."),
        ],
    },
    ChartCategory {
        name: "Price & Market Cap Metrics",
        charts: &[
            chart("total-mcap", "Total Crypto Market Cap", "The total value of all cryptocurrencies, including and excluding Bitcoin."),
            chart("dominance", "Crypto Dominance", "The market cap of a coin as a percentage of the total market."),
            chart("ssr", "Stablecoin Supply Ratio (SSR)", "The ratio of Bitcoin market cap to the total stablecoin supply."),
            chart("heatmap", "Crypto Heatmap", "Visualizes the performance of different cryptocurrencies over the last 24h."),
        ],
    },
    ChartCategory {
        name: "On-Chain Supply",
        charts: &[
            chart("hodl-waves", "HODL Waves", "Visualizes the age distribution of coins, showing holding patterns."),
            chart("rhodl-ratio", "RHODL Ratio", "Ratio of short-term vs long-term holder wealth to identify market tops."),
            chart("s2f", "Stock to Flow (S2F)", "A model that values an asset based on its scarcity and halving cycles."),
            chart("puell-multiple", "Puell Multiple", "Examines miner revenue to identify market tops and bottoms."),
        ],
    },
    ChartCategory {
        name: "Technical Analysis",
        charts: &[
            chart("bollinger-bands", "Bollinger Bands", "Measures market volatility and potential price levels around a moving average."),
            chart("golden-death-cross", "Golden/Death Crosses", "Occurs when a short-term moving average crosses over a long-term one."),
            chart("rsi", "Relative Strength Index (RSI)", "A momentum indicator that measures the speed and change of price movements."),
            chart("macd", "Moving Average Convergence Divergence (MACD)", "A trend-following momentum indicator showing relationship between two MAs."),
        ],
    },
    ChartCategory {
        name: "Return On Investment",
        charts: &[
            chart("monthly-returns", "BTC Monthly Returns", "Historical monthly ROI for an asset, visualized as a heatmap."),
            chart("altcoin-season", "Altcoin Season Index", "Indicates if it is a better time to invest in altcoins vs. Bitcoin."),
            chart("roi-after-bottom", "ROI Since Cycle Bottom", "Tracks performance since the last major market bottom across cycles."),
            chart("best-dca-day", "Best Day To DCA", "Analyzes the best day of the week to make regular investments for BTC."),
        ],
    },
    ChartCategory {
        name: "Derivatives",
        charts: &[chart(
            "open-interest-futures",
            "Open Interest of BTC Futures",
            "The total number of outstanding derivative contracts, indicating market sentiment.",
        )],
    },
];

pub fn chart_catalog() -> &'static [ChartCategory] {
    &CATEGORIES
}

pub fn all_charts() -> impl Iterator<Item = &'static ChartInfo> {
    CATEGORIES.iter().flat_map(|c| c.charts.iter())
}

pub fn find_chart(id: &str) -> Option<&'static ChartInfo> {
    all_charts().find(|c| c.id == id)
}

pub const PRICE_HISTORY_DAYS: usize = 1825;
pub const OPEN_INTEREST_DAYS: usize = 365;
pub const BOLLINGER_DAYS: usize = 365;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;
pub const CROSS_DAYS: usize = 500;
pub const MACD_DAYS: usize = 365;
pub const S2F_DAYS: usize = 4380;
pub const MONTHLY_RETURN_YEARS: std::ops::RangeInclusive<i32> = 2020..=2024;

/// Generated data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    Metric { metric: MetricKind, points: Vec<TimePoint> },
    MvrvZScore(Vec<MvrvPoint>),
    Nvts(Vec<NvtsPoint>),
    MarketCap(Vec<MarketCapPoint>),
    Dominance(Vec<DominancePoint>),
    Heatmap(Vec<HeatmapTile>),
    HodlWaves(Vec<HodlWavePoint>),
    StockToFlow(Vec<S2fPoint>),
    Bollinger(Vec<BandPoint>),
    MovingAverageCross { points: Vec<CrossPoint>, events: Vec<CrossEvent> },
    Macd(Vec<MacdPoint>),
    MonthlyReturns(Vec<YearReturns>),
    RoiAfterBottom(Vec<RoiPoint>),
    BestDcaDay(Vec<WeekdayRoi>),
    OpenInterest(Vec<OpenInterestPoint>),
}

impl ChartData {
    /// Number of rows the chart plots.
    pub fn len(&self) -> usize {
        match self {
            ChartData::Metric { points, .. } => points.len(),
            ChartData::MvrvZScore(v) => v.len(),
            ChartData::Nvts(v) => v.len(),
            ChartData::MarketCap(v) => v.len(),
            ChartData::Dominance(v) => v.len(),
            ChartData::Heatmap(v) => v.len(),
            ChartData::HodlWaves(v) => v.len(),
            ChartData::StockToFlow(v) => v.len(),
            ChartData::Bollinger(v) => v.len(),
            ChartData::MovingAverageCross { points, .. } => points.len(),
            ChartData::Macd(v) => v.len(),
            ChartData::MonthlyReturns(v) => v.len(),
            ChartData::RoiAfterBottom(v) => v.len(),
            ChartData::BestDcaDay(v) => v.len(),
            ChartData::OpenInterest(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generates the data behind chart `id`, ending on `today`.
pub fn generate_chart<R: Rng + ?Sized>(id: &str, today: NaiveDate, rng: &mut R) -> Result<ChartData, CatalogError> {
    let info = find_chart(id).ok_or_else(|| CatalogError::UnknownChart(id.to_string()))?;
    let _scope = ProfileScope::with_context("catalog.generate_chart", &[("chart_id", serde_json::json!(info.id))]);

    if info.id == "mvrv-z-score" {
        return Ok(ChartData::MvrvZScore(mvrv_series(today, rng)));
    }
    if let Ok(metric) = info.id.parse::<MetricKind>() {
        return Ok(ChartData::Metric { metric, points: metric_series(metric, today, rng) });
    }

    let data = match info.id {
        "nvts" => ChartData::Nvts(nvts(&price_series(PRICE_HISTORY_DAYS, &GbmParams::default(), today, rng), rng)),
        "total-mcap" => {
            ChartData::MarketCap(market_cap(&price_series(PRICE_HISTORY_DAYS, &GbmParams::default(), today, rng)))
        }
        "dominance" => ChartData::Dominance(dominance_series(PRICE_HISTORY_DAYS, today)),
        "heatmap" => ChartData::Heatmap(heatmap()),
        "hodl-waves" => ChartData::HodlWaves(hodl_waves(PRICE_HISTORY_DAYS, today, rng)),
        "s2f" => ChartData::StockToFlow(stock_to_flow(S2F_DAYS, today, rng)),
        "bollinger-bands" => {
            let path = oscillating_walk(BOLLINGER_DAYS, &OscillatingWalkParams::BOLLINGER, today, rng);
            ChartData::Bollinger(bollinger_series(&path, BOLLINGER_WINDOW, BOLLINGER_K))
        }
        "golden-death-cross" => {
            let path = oscillating_walk(CROSS_DAYS, &OscillatingWalkParams::CROSS, today, rng);
            let points = moving_average_cross(&path, GOLDEN_CROSS_FAST, GOLDEN_CROSS_SLOW);
            let events = cross_events(&points);
            ChartData::MovingAverageCross { points, events }
        }
        "macd" => ChartData::Macd(macd_like(MACD_DAYS, today, rng)),
        "monthly-returns" => ChartData::MonthlyReturns(monthly_returns(MONTHLY_RETURN_YEARS, rng)),
        "roi-after-bottom" => ChartData::RoiAfterBottom(roi_since_bottom()),
        "best-dca-day" => ChartData::BestDcaDay(best_day_to_dca()),
        "open-interest-futures" => {
            let bars = price_series(OPEN_INTEREST_DAYS, &GbmParams::default(), today, rng);
            ChartData::OpenInterest(open_interest(&bars, rng))
        }
        other => return Err(CatalogError::UnknownChart(other.to_string())),
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(chart_catalog().len(), 6);
        assert_eq!(all_charts().count(), 21);
        let mut ids: Vec<_> = all_charts().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 21);
    }

    #[test]
    fn test_find_chart() {
        assert_eq!(find_chart("s2f").map(|c| c.name), Some("Stock to Flow (S2F)"));
        assert!(find_chart("rainbow-pizza").is_none());
    }

    #[test]
    fn test_every_chart_generates() {
        let mut rng = StdRng::seed_from_u64(99);
        for info in all_charts() {
            let data = generate_chart(info.id, today(), &mut rng).unwrap();
            assert!(!data.is_empty(), "{} produced no rows", info.id);
        }
    }

    #[test]
    fn test_unknown_chart() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_chart("nope", today(), &mut rng),
            Err(CatalogError::UnknownChart("nope".to_string()))
        );
    }

    #[test]
    fn test_chart_lengths() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(generate_chart("rsi", today(), &mut rng).unwrap().len(), 365);
        assert_eq!(generate_chart("altcoin-season", today(), &mut rng).unwrap().len(), 730);
        assert_eq!(generate_chart("golden-death-cross", today(), &mut rng).unwrap().len(), CROSS_DAYS);
        assert_eq!(generate_chart("monthly-returns", today(), &mut rng).unwrap().len(), 5);
        assert_eq!(generate_chart("open-interest-futures", today(), &mut rng).unwrap().len(), OPEN_INTEREST_DAYS);
    }

    #[test]
    fn test_mvrv_chart_carries_raw_and_z() {
        let data = generate_chart("mvrv-z-score", today(), &mut StdRng::seed_from_u64(8)).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["kind"], "mvrv_z_score");
        let first = &json["data"][0];
        assert!(first["value"].is_number());
        assert!(first["zScore"].is_number());
    }

    #[test]
    fn test_tagged_json() {
        let mut rng = StdRng::seed_from_u64(5);
        let json = serde_json::to_value(generate_chart("sopr", today(), &mut rng).unwrap()).unwrap();
        assert_eq!(json["kind"], "metric");
        assert_eq!(json["data"]["metric"], "sopr");
    }
}
