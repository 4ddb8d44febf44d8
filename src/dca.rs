//! Dollar-cost-averaging replay over a synthetic price function.
//!
//! A fixed amount is bought on every step from the start date to the end date
//! (both inclusive). The summary is recomputed from scratch on every run.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DcaError;
use crate::logging::{log_dca_rejected, log_dca_run};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Purchase date after `prev`. Monthly steps advance from the previous
    /// purchase, so a rolled-over day carries into later months.
    pub fn next_date(&self, prev: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => prev.checked_add_days(Days::new(1)),
            Frequency::Weekly => prev.checked_add_days(Days::new(7)),
            Frequency::Monthly => shift_months(prev, 1),
        }
    }
}

/// Moves `date` by `delta` calendar months keeping the day of month. A day
/// past the end of the target month rolls forward into the next one
/// (Jan 31 + 1 month = Mar 3 in a common year).
pub fn shift_months(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let month_index = date.year() * 12 + date.month0() as i32 + delta;
    let first = NaiveDate::from_ymd_opt(month_index.div_euclid(12), month_index.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_days(Days::new(date.day0() as u64))
}

impl FromStr for Frequency {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(DcaError::invalid(format!("unknown frequency: {}", other))),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, DcaError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DcaError::invalid(format!("not a valid date: {:?}", s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcaRequest {
    pub amount: f64,
    pub frequency: Frequency,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DcaRequest {
    pub fn new(amount: f64, frequency: Frequency, start: NaiveDate, end: NaiveDate) -> Result<Self, DcaError> {
        let req = Self { amount, frequency, start, end };
        req.validate()?;
        Ok(req)
    }

    /// Builds a request from raw form fields.
    pub fn parse(amount: &str, frequency: &str, start: &str, end: &str) -> Result<Self, DcaError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| DcaError::invalid(format!("not a valid amount: {:?}", amount)))?;
        Self::new(amount, frequency.parse()?, start, end)
    }

    /// The last `months` months up to and including `today`.
    pub fn trailing_months(amount: f64, frequency: Frequency, months: u32, today: NaiveDate) -> Result<Self, DcaError> {
        let start = i32::try_from(months)
            .ok()
            .and_then(|m| shift_months(today, -m))
            .ok_or_else(|| DcaError::invalid("timeframe reaches before the calendar"))?;
        Self::new(amount, frequency, start, today)
    }

    pub fn validate(&self) -> Result<(), DcaError> {
        if self.start > self.end {
            return Err(DcaError::invalid("start date is after end date"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(DcaError::invalid("investment amount must be greater than zero"));
        }
        Ok(())
    }

    /// Purchase dates from start to end, inclusive.
    pub fn investment_dates(&self) -> Vec<NaiveDate> {
        std::iter::successors(Some(self.start), |d| self.frequency.next_date(*d))
            .take_while(|d| *d <= self.end)
            .collect()
    }
}

/// Price source for a simulation.
pub trait PriceModel {
    /// Price paid on a purchase date.
    fn quote(&mut self, date: NaiveDate) -> f64;
    /// Price used to value the final holdings.
    fn mark(&self, date: NaiveDate) -> f64;
}

/// Sinusoid around a base price with uniform noise on purchases.
#[derive(Debug, Clone)]
pub struct SinePriceModel<R> {
    pub base_price: f64,
    pub volatility: f64,
    pub noise: f64,
    pub epoch: NaiveDate,
    rng: R,
}

impl<R: Rng> SinePriceModel<R> {
    pub fn new(rng: R) -> Self {
        Self {
            base_price: 47_000.0,
            volatility: 0.8,
            noise: 0.2,
            epoch: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN),
            rng,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    fn cycle(&self, date: NaiveDate) -> f64 {
        let elapsed = (date - self.epoch).num_days() as f64;
        (elapsed / 100.0).sin() * self.volatility
    }
}

impl<R: Rng> PriceModel for SinePriceModel<R> {
    fn quote(&mut self, date: NaiveDate) -> f64 {
        let jitter = (self.rng.gen::<f64>() - 0.5) * self.noise;
        self.base_price * (1.0 + self.cycle(date) + jitter)
    }

    fn mark(&self, date: NaiveDate) -> f64 {
        self.base_price * (1.0 + self.cycle(date))
    }
}

/// Deterministic model from a plain function of the date.
pub struct FnPriceModel<F>(pub F);

impl<F: Fn(NaiveDate) -> f64> PriceModel for FnPriceModel<F> {
    fn quote(&mut self, date: NaiveDate) -> f64 {
        (self.0)(date)
    }

    fn mark(&self, date: NaiveDate) -> f64 {
        (self.0)(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaSimulationResult {
    pub total_invested: f64,
    pub final_value: f64,
    /// Percent.
    pub roi: f64,
    pub number_of_investments: u32,
    pub average_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaHistoryPoint {
    pub date: NaiveDate,
    pub total_invested: f64,
    pub portfolio_value: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaOutcome {
    pub result: DcaSimulationResult,
    pub history: Vec<DcaHistoryPoint>,
    pub total_tokens: f64,
}

/// Replays the request against `model`. `Ok(None)` when no purchase date
/// falls in the range.
pub fn simulate<M: PriceModel + ?Sized>(req: &DcaRequest, model: &mut M) -> Result<Option<DcaOutcome>, DcaError> {
    if let Err(err) = req.validate() {
        log_dca_rejected(&err.to_string());
        return Err(err);
    }

    let mut total_invested = 0.0;
    let mut total_tokens = 0.0;
    let mut history = Vec::new();
    for date in req.investment_dates() {
        let price = model.quote(date);
        total_invested += req.amount;
        if price > 0.0 {
            total_tokens += req.amount / price;
        }
        history.push(DcaHistoryPoint {
            date,
            total_invested,
            portfolio_value: total_tokens * price,
            price,
        });
    }

    if history.is_empty() {
        return Ok(None);
    }

    let final_value = total_tokens * model.mark(req.end);
    let roi = if total_invested > 0.0 { (final_value - total_invested) / total_invested * 100.0 } else { 0.0 };
    let average_price = if total_tokens > 0.0 { total_invested / total_tokens } else { 0.0 };
    let result = DcaSimulationResult {
        total_invested,
        final_value,
        roi,
        number_of_investments: history.len() as u32,
        average_price,
    };

    log_dca_run(
        req.frequency.as_str(),
        &req.start.format(DATE_FORMAT).to_string(),
        &req.end.format(DATE_FORMAT).to_string(),
        result.number_of_investments,
        total_invested,
        final_value,
        roi,
    );

    Ok(Some(DcaOutcome { result, history, total_tokens }))
}

/// Parses the raw form fields and runs the simulation.
pub fn simulate_form<M: PriceModel + ?Sized>(
    amount: &str,
    frequency: &str,
    start: &str,
    end: &str,
    model: &mut M,
) -> Result<Option<DcaOutcome>, DcaError> {
    let req = DcaRequest::parse(amount, frequency, start, end).map_err(|err| {
        log_dca_rejected(&err.to_string());
        err
    })?;
    simulate(&req, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(" daily ".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert!(matches!("hourly".parse::<Frequency>(), Err(DcaError::InvalidInput(_))));
    }

    #[test]
    fn test_monthly_steps_roll_over_short_months() {
        let feb = DcaRequest::new(10.0, Frequency::Monthly, date(2021, 1, 31), date(2021, 2, 28)).unwrap();
        assert_eq!(feb.investment_dates(), vec![date(2021, 1, 31)]);

        let half_year = DcaRequest::new(10.0, Frequency::Monthly, date(2021, 1, 31), date(2021, 6, 30)).unwrap();
        assert_eq!(
            half_year.investment_dates(),
            vec![date(2021, 1, 31), date(2021, 3, 3), date(2021, 4, 3), date(2021, 5, 3), date(2021, 6, 3)]
        );
    }

    #[test]
    fn test_shift_months() {
        assert_eq!(shift_months(date(2021, 1, 15), 1), Some(date(2021, 2, 15)));
        assert_eq!(shift_months(date(2024, 1, 31), 1), Some(date(2024, 3, 2)));
        assert_eq!(shift_months(date(2021, 12, 10), 1), Some(date(2022, 1, 10)));
        assert_eq!(shift_months(date(2021, 1, 10), -1), Some(date(2020, 12, 10)));
        assert_eq!(shift_months(date(2021, 3, 31), -1), Some(date(2021, 3, 3)));
    }

    #[test]
    fn test_daily_steps_include_both_ends() {
        let req = DcaRequest::new(10.0, Frequency::Daily, date(2021, 1, 1), date(2021, 1, 10)).unwrap();
        assert_eq!(req.investment_dates().len(), 10);
    }

    #[test]
    fn test_single_day_range() {
        let d = date(2022, 5, 5);
        let mut model = FnPriceModel(|_: NaiveDate| 50.0);
        let req = DcaRequest::new(100.0, Frequency::Monthly, d, d).unwrap();
        let out = simulate(&req, &mut model).unwrap().unwrap();
        assert_eq!(out.result.number_of_investments, 1);
        assert_eq!(out.result.average_price, 50.0);
        assert_eq!(out.result.roi, 0.0);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(DcaRequest::parse("100", "weekly", "2021-02-30", "2021-03-01").is_err());
        assert!(DcaRequest::parse("abc", "weekly", "2021-01-01", "2021-03-01").is_err());
        assert!(DcaRequest::parse("NaN", "weekly", "2021-01-01", "2021-03-01").is_err());
        assert!(DcaRequest::parse("-5", "weekly", "2021-01-01", "2021-03-01").is_err());
        assert!(DcaRequest::parse("100", "weekly", "2021-03-01", "2021-01-01").is_err());
        assert!(DcaRequest::parse("100", "weekly", "2021-01-01", "2021-03-01").is_ok());
    }

    #[test]
    fn test_trailing_months() {
        let today = date(2024, 8, 31);
        let req = DcaRequest::trailing_months(100.0, Frequency::Weekly, 6, today).unwrap();
        // Feb 31 does not exist; it rolls to Mar 2 in a leap year.
        assert_eq!(req.start, date(2024, 3, 2));
        let plain = DcaRequest::trailing_months(100.0, Frequency::Weekly, 12, date(2024, 5, 10)).unwrap();
        assert_eq!(plain.start, date(2023, 5, 10));
        assert_eq!(req.end, today);
    }

    #[test]
    fn test_sine_model_mark_is_noiseless() {
        let model = SinePriceModel::new(StdRng::seed_from_u64(1));
        assert_eq!(model.mark(date(2021, 1, 1)), 47_000.0);
        let later = date(2021, 1, 1) + Days::new(100);
        let expected = 47_000.0 * (1.0 + 1f64.sin() * 0.8);
        assert!((model.mark(later) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sine_model_quote_within_noise() {
        let mut model = SinePriceModel::new(StdRng::seed_from_u64(1));
        let d = date(2021, 6, 1);
        let mark = model.mark(d);
        for _ in 0..100 {
            let q = model.quote(d);
            assert!((q - mark).abs() <= 47_000.0 * 0.1 + 1e-9);
        }
    }

    #[test]
    fn test_portfolio_value_uses_step_price() {
        let mut model = FnPriceModel(|d: NaiveDate| if d.day0() == 0 { 10.0 } else { 20.0 });
        let req = DcaRequest::new(100.0, Frequency::Daily, date(2021, 1, 1), date(2021, 1, 2)).unwrap();
        let out = simulate(&req, &mut model).unwrap().unwrap();
        assert_eq!(out.history[0].portfolio_value, 100.0);
        // 10 + 5 tokens at 20
        assert_eq!(out.history[1].portfolio_value, 300.0);
        assert_eq!(out.result.final_value, 300.0);
        assert_eq!(out.result.roi, 50.0);
    }
}
