use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use cryptoquant::catalog::{all_charts, generate_chart};
use cryptoquant::series::today;

fn encode_chart<T: Serialize>(id: &str, data: &T) -> Result<String, String> {
    serde_json::to_string_pretty(data).map_err(|err| format!("failed to encode {}: {}", id, err))
}

/// Prints the generated data of one chart as JSON, or lists chart ids.
fn main() -> ExitCode {
    let Some(id) = std::env::args().nth(1) else {
        for info in all_charts() {
            println!("{:<24} {}", info.id, info.name);
        }
        return ExitCode::SUCCESS;
    };

    let seed = std::env::var("SERIES_SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);
    let data = match generate_chart(&id, today(), &mut rng) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };
    match encode_chart(&id, &data) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("map key must be a string"))
        }
    }

    #[test]
    fn test_encode_failure_names_chart() {
        let err = encode_chart("heatmap", &Unencodable).unwrap_err();
        assert!(err.starts_with("failed to encode heatmap: "), "{}", err);
    }

    #[test]
    fn test_encode_chart_ok() {
        let json = encode_chart("x", &vec![1, 2]).unwrap();
        assert!(json.contains('1'));
    }
}
