use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use cryptoquant::catalog::{chart_catalog, generate_chart};
use cryptoquant::config::Config;
use cryptoquant::dca::{self, DcaRequest, SinePriceModel, DATE_FORMAT};
use cryptoquant::indicators::sma_series;
use cryptoquant::insights::{preset_prompt, GeminiClient, InsightsSession};
use cryptoquant::logging::{log, log_dca_rejected, obj, v_num, v_str, Domain, Level, ProfileScope};
use cryptoquant::series::models::{rainbow, rainbow_band, RAINBOW_BANDS};
use cryptoquant::series::returns::{market_overview, risk_table, HeatLevel};
use cryptoquant::series::{self, fingerprint, spot_walk, SpotWalkParams};
use cryptoquant::settings::{Settings, SqlitePreferenceStore};

const HEADLINE_DAYS: usize = 90;
const HEADLINE_SMA: usize = 20;
const RAINBOW_DAYS: usize = 2920;

/// Renders one headless dashboard snapshot: overview cards, headline price,
/// rainbow band, risk table, every catalog chart and the DCA calculator with
/// configured defaults. A question (or a preset: `default`, `1`..`3`) on the
/// command line is sent to the insights panel.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let today = series::today();
    let seed = cfg.series_seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("seed", json!(seed)),
            ("today", v_str(&today.format(DATE_FORMAT).to_string())),
            ("model", v_str(&cfg.insights_model)),
        ]),
    );

    let store = SqlitePreferenceStore::open(&cfg.prefs_path)
        .with_context(|| format!("opening preference store at {}", cfg.prefs_path))?;
    let settings = Settings::load(&store)?;
    log(
        Level::Info,
        Domain::Settings,
        "loaded",
        obj(&[
            ("theme", v_str(settings.theme.as_str())),
            ("chart_3d_style", v_str(settings.chart_3d_style.as_str())),
        ]),
    );

    for card in market_overview() {
        log(
            Level::Info,
            Domain::Series,
            "overview_card",
            obj(&[
                ("ticker", v_str(card.ticker)),
                ("price", v_num(card.price)),
                ("change_pct", v_num(card.change_pct)),
                ("market_cap", v_num(card.market_cap)),
                ("heat", json!(card.heat())),
            ]),
        );
    }

    let headline = spot_walk(HEADLINE_DAYS, &SpotWalkParams::default(), today, &mut rng);
    let headline_sma = sma_series(&headline, HEADLINE_SMA).last().and_then(|p| p.value);
    if let [.., prev, last] = headline.as_slice() {
        let change = if prev.price > 0.0 { (last.price - prev.price) / prev.price * 100.0 } else { 0.0 };
        log(
            Level::Info,
            Domain::Series,
            "headline",
            obj(&[
                ("price", v_num(last.price)),
                ("change_pct", v_num(change)),
                ("heat", json!(HeatLevel::for_change(change))),
                ("sma", json!(headline_sma)),
            ]),
        );
    }

    let bands = rainbow(RAINBOW_DAYS, today, &mut rng);
    if let Some(last) = bands.last() {
        let band = rainbow_band(last.close, last);
        log(
            Level::Info,
            Domain::Series,
            "rainbow",
            obj(&[("close", v_num(last.close)), ("band", json!(band)), ("label", v_str(RAINBOW_BANDS[band]))]),
        );
    }

    for row in risk_table() {
        log(
            Level::Info,
            Domain::Series,
            "risk_row",
            obj(&[
                ("asset", v_str(row.asset)),
                ("sharpe", v_num(row.sharpe)),
                ("max_drawdown_pct", v_num(row.max_drawdown_pct)),
                ("volatility_pct", v_num(row.volatility_pct)),
                ("correlation", v_num(row.correlation)),
            ]),
        );
    }

    {
        let _scope = ProfileScope::new("snapshot.charts");
        for category in chart_catalog() {
            for info in category.charts {
                let data = generate_chart(info.id, today, &mut rng)?;
                log(
                    Level::Info,
                    Domain::Series,
                    "chart",
                    obj(&[
                        ("chart_id", v_str(info.id)),
                        ("category", v_str(category.name)),
                        ("rows", json!(data.len())),
                        ("fingerprint", v_str(&fingerprint(&data))),
                    ]),
                );
            }
        }
    }

    // Bad DCA defaults are reported like a rejected form; the snapshot goes on.
    let mut model = SinePriceModel::new(StdRng::seed_from_u64(rng.gen()));
    let outcome = dca::parse_date(&cfg.dca_start)
        .and_then(|start| DcaRequest::new(cfg.dca_amount, cfg.dca_frequency, start, today))
        .and_then(|request| dca::simulate(&request, &mut model));
    match outcome {
        Ok(Some(_)) => {}
        Ok(None) => log(
            Level::Warn,
            Domain::Dca,
            "no_investments",
            obj(&[("msg", v_str("no purchase dates fall within the range"))]),
        ),
        Err(err) => {
            log_dca_rejected(&err.to_string());
            eprintln!("DCA: {}", err);
        }
    }

    let typed = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = preset_prompt(&typed).map(str::to_string).unwrap_or(typed);
    if !prompt.trim().is_empty() {
        let session = InsightsSession::new(GeminiClient::new(&cfg)?);
        match session.ask(&prompt).await {
            Some(Ok(insight)) => {
                println!("{}", insight.text);
                for c in &insight.citations {
                    println!("  - {} <{}>", c.title, c.uri);
                }
            }
            Some(Err(err)) => eprintln!("{}", err.user_message()),
            None => {}
        }
    }

    Ok(())
}
