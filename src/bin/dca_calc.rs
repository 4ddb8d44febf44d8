use rand::rngs::StdRng;
use rand::SeedableRng;

use cryptoquant::dca::{simulate_form, SinePriceModel, DATE_FORMAT};
use cryptoquant::series::today;

/// dca_calc <amount> <daily|weekly|monthly> <start> [end]
fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let amount = args.first().cloned().unwrap_or_else(|| "100".to_string());
    let frequency = args.get(1).cloned().unwrap_or_else(|| "weekly".to_string());
    let start = args.get(2).cloned().unwrap_or_else(|| "2021-01-01".to_string());
    let end = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| today().format(DATE_FORMAT).to_string());

    let seed = std::env::var("SERIES_SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(0);
    let mut model = SinePriceModel::new(StdRng::seed_from_u64(seed));

    match simulate_form(&amount, &frequency, &start, &end, &mut model) {
        Ok(Some(outcome)) => {
            let r = outcome.result;
            println!(
                "investments={} invested={:.2} value={:.2} roi={:.2}% avg_price={:.2}",
                r.number_of_investments, r.total_invested, r.final_value, r.roi, r.average_price
            );
            if std::env::var("DCA_HISTORY").as_deref() == Ok("1") {
                for p in &outcome.history {
                    println!("{},{:.2},{:.2},{:.2}", p.date, p.total_invested, p.portfolio_value, p.price);
                }
            }
        }
        Ok(None) => eprintln!("no purchase dates in range"),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    }
}
