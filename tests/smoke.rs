//! Smoke tests: end-to-end checks of the properties the dashboard relies on.
//!
//! Every generator runs through the public API with a seeded random source so
//! a failure reproduces exactly.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cryptoquant::catalog::{all_charts, generate_chart};
use cryptoquant::dca::{simulate, simulate_form, DcaRequest, FnPriceModel, Frequency, SinePriceModel};
use cryptoquant::error::DcaError;
use cryptoquant::indicators::{bollinger, sma};
use cryptoquant::series::{
    closes, day_ts, fingerprint, metric_series, oscillating_walk, price_series, GbmParams, MetricKind,
    OscillatingWalkParams, DAY_MS,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn end() -> NaiveDate {
    date(2024, 6, 30)
}

// ---------------------------------------------------------------------------
// Series shape
// ---------------------------------------------------------------------------

#[test]
fn price_series_has_n_contiguous_days() {
    let mut rng = StdRng::seed_from_u64(1);
    let bars = price_series(1000, &GbmParams::default(), end(), &mut rng);
    assert_eq!(bars.len(), 1000);
    assert_eq!(bars.last().unwrap().ts, day_ts(end()));
    for w in bars.windows(2) {
        assert_eq!(w[1].ts - w[0].ts, DAY_MS);
    }
}

#[test]
fn metric_series_have_contiguous_days() {
    let mut rng = StdRng::seed_from_u64(2);
    for kind in MetricKind::ALL {
        let s = metric_series(kind, end(), &mut rng);
        assert_eq!(s.len(), kind.default_days(), "{}", kind.as_str());
        assert!(s.windows(2).all(|w| w[1].ts - w[0].ts == DAY_MS));
    }
}

#[test]
fn zero_days_is_empty() {
    let mut rng = StdRng::seed_from_u64(3);
    assert!(price_series(0, &GbmParams::default(), end(), &mut rng).is_empty());
    assert!(oscillating_walk(0, &OscillatingWalkParams::CROSS, end(), &mut rng).is_empty());
}

#[test]
fn prices_never_negative() {
    let mut rng = StdRng::seed_from_u64(4);
    let wild = GbmParams { start_price: 10.0, drift: -0.05, volatility: 0.6 };
    let bars = price_series(2000, &wild, end(), &mut rng);
    assert!(bars.iter().all(|b| b.close >= 0.0 && b.low >= 0.0));

    let noisy = OscillatingWalkParams { start_price: 100.0, period: 10.0, swing: 500.0, noise: 5000.0 };
    let walk = oscillating_walk(2000, &noisy, end(), &mut rng);
    assert!(walk.iter().all(|p| p.price >= 0.0));
}

#[test]
fn same_seed_same_charts() {
    for info in all_charts() {
        let a = generate_chart(info.id, end(), &mut StdRng::seed_from_u64(77)).unwrap();
        let b = generate_chart(info.id, end(), &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b), "{}", info.id);
    }
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

#[test]
fn sma_warmup_over_generated_closes() {
    let mut rng = StdRng::seed_from_u64(5);
    let values = closes(&price_series(120, &GbmParams::default(), end(), &mut rng));
    let n = 20;
    let out = sma(&values, n);
    assert_eq!(out.len(), values.len());
    assert!(out[..n - 1].iter().all(Option::is_none));
    for i in n - 1..values.len() {
        let mean = values[i + 1 - n..=i].iter().sum::<f64>() / n as f64;
        assert!((out[i].unwrap() - mean).abs() < 1e-6 * mean.max(1.0));
    }
}

#[test]
fn bollinger_fixed_input() {
    let values: Vec<f64> = vec![
        10.0, 11.0, 12.0, 11.5, 13.0, 12.5, 14.0, 13.5, 15.0, 14.5, 16.0, 15.5, 17.0, 16.5, 18.0,
        17.5, 19.0, 18.5, 20.0, 19.5, 21.0, 20.5, 22.0, 21.5, 23.0, 22.5, 24.0, 23.5, 25.0, 24.5,
    ];
    let bands = bollinger(&values, 20, 2.0);
    let last = bands[29].unwrap();
    let window = &values[10..30];
    let mean = window.iter().sum::<f64>() / 20.0;
    let sd = (window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 20.0).sqrt();
    assert!((last.middle - mean).abs() < 1e-9);
    assert!((last.upper - (mean + 2.0 * sd)).abs() < 1e-9);
    assert!((last.lower - (mean - 2.0 * sd)).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// DCA
// ---------------------------------------------------------------------------

fn price_on(d: NaiveDate) -> f64 {
    1000.0 + d.day() as f64 * 10.0
}

#[test]
fn weekly_dca_reference() {
    let req = DcaRequest::new(100.0, Frequency::Weekly, date(2021, 1, 1), date(2021, 1, 22)).unwrap();
    let mut model = FnPriceModel(price_on);
    let out = simulate(&req, &mut model).unwrap().unwrap();

    assert_eq!(out.result.number_of_investments, 4);
    assert_eq!(out.result.total_invested, 400.0);
    let tokens: f64 = [1, 8, 15, 22].iter().map(|d| 100.0 / price_on(date(2021, 1, *d))).sum();
    assert!((out.total_tokens - tokens).abs() < 1e-12);
    assert!((out.result.final_value - tokens * price_on(date(2021, 1, 22))).abs() < 1e-9);
    assert!(out.history.windows(2).all(|w| w[1].total_invested > w[0].total_invested));
}

#[test]
fn dca_same_seed_same_outcome() {
    for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
        let req = DcaRequest::new(250.0, frequency, date(2021, 1, 31), end()).unwrap();
        let run = |seed| simulate(&req, &mut SinePriceModel::new(StdRng::seed_from_u64(seed))).unwrap().unwrap();
        let a = run(2021);
        let b = run(2021);
        assert_eq!(a, b, "{:?}", frequency);

        assert_eq!(a.history.len() as u32, a.result.number_of_investments);
        assert!(a.history.windows(2).all(|w| w[1].total_invested > w[0].total_invested));
        assert_eq!(a.history.last().unwrap().total_invested, a.result.total_invested);
    }
}

#[test]
fn dca_rejects_inverted_range_and_bad_amount() {
    let mut model = FnPriceModel(price_on);
    assert!(matches!(
        simulate_form("100", "weekly", "2021-02-01", "2021-01-01", &mut model),
        Err(DcaError::InvalidInput(_))
    ));
    assert!(matches!(
        simulate_form("0", "weekly", "2021-01-01", "2021-02-01", &mut model),
        Err(DcaError::InvalidInput(_))
    ));
    let bad = DcaRequest { amount: -1.0, frequency: Frequency::Daily, start: date(2021, 1, 1), end: date(2021, 1, 2) };
    assert!(matches!(simulate(&bad, &mut model), Err(DcaError::InvalidInput(_))));
}
