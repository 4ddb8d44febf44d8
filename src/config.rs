use crate::dca::Frequency;

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub insights_model: String,
    pub insights_base: String,
    pub insights_max_retries: u32,
    pub insights_timeout_secs: u64,
    pub prefs_path: String,
    /// Fixed seed for every generator; `None` draws from entropy.
    pub series_seed: Option<u64>,
    pub dca_amount: f64,
    pub dca_frequency: Frequency,
    pub dca_start: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")).ok(),
            insights_model: std::env::var("INSIGHTS_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            insights_base: std::env::var("INSIGHTS_BASE").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            insights_max_retries: std::env::var("INSIGHTS_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(0),
            insights_timeout_secs: std::env::var("INSIGHTS_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30),
            prefs_path: std::env::var("PREFS_PATH").unwrap_or_else(|_| "./prefs.sqlite".to_string()),
            series_seed: std::env::var("SERIES_SEED").ok().and_then(|v| v.parse().ok()),
            dca_amount: std::env::var("DCA_AMOUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(100.0),
            dca_frequency: std::env::var("DCA_FREQUENCY").ok().and_then(|v| v.parse().ok()).unwrap_or(Frequency::Weekly),
            dca_start: std::env::var("DCA_START").unwrap_or_else(|_| "2021-01-01".to_string()),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("insights_model", &self.insights_model)
            .field("insights_base", &self.insights_base)
            .field("insights_max_retries", &self.insights_max_retries)
            .field("insights_timeout_secs", &self.insights_timeout_secs)
            .field("prefs_path", &self.prefs_path)
            .field("series_seed", &self.series_seed)
            .field("dca_amount", &self.dca_amount)
            .field("dca_frequency", &self.dca_frequency)
            .field("dca_start", &self.dca_start)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let mut cfg = Config::from_env();
        cfg.api_key = Some("secret-key".to_string());
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
