use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

const DEFAULT_BROWSERLESS_URL: &str = "http://localhost:3000";
const DEFAULT_MAX_SESSIONS: usize = 2;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Scraper configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    // Browserless
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Sessions
    pub max_sessions: usize,
    pub user_agent: String,
    pub http_timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browserless_url: DEFAULT_BROWSERLESS_URL.to_string(),
            browserless_token: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables. Nothing is required;
    /// malformed numbers fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            browserless_url: non_empty("BROWSERLESS_URL")
                .unwrap_or_else(|| DEFAULT_BROWSERLESS_URL.to_string()),
            browserless_token: non_empty("BROWSERLESS_TOKEN"),
            max_sessions: parse_or(
                "SCRAPER_MAX_SESSIONS",
                non_empty("SCRAPER_MAX_SESSIONS"),
                DEFAULT_MAX_SESSIONS,
            )
            .max(1),
            user_agent: non_empty("SCRAPER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            http_timeout: Duration::from_secs(parse_or(
                "SCRAPER_HTTP_TIMEOUT_SECS",
                non_empty("SCRAPER_HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        }
    }

    /// Log the effective configuration with the token masked.
    pub fn log_redacted(&self) {
        info!(
            browserless_url = %self.browserless_url,
            browserless_token = redact(self.browserless_token.as_deref()),
            max_sessions = self.max_sessions,
            user_agent = %self.user_agent,
            http_timeout_secs = self.http_timeout.as_secs(),
            "Scraper config"
        );
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid number, using default");
            default
        }),
    }
}

fn redact(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "****",
        None => "<unset>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ScraperConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScraperConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.browserless_url, "http://localhost:3000");
        assert!(cfg.browserless_token.is_none());
        assert_eq!(cfg.max_sessions, 2);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn values_are_read() {
        let cfg = config(&[
            ("BROWSERLESS_URL", "http://browserless:3000"),
            ("BROWSERLESS_TOKEN", "secret"),
            ("SCRAPER_MAX_SESSIONS", "8"),
            ("SCRAPER_HTTP_TIMEOUT_SECS", " 12 "),
        ]);
        assert_eq!(cfg.browserless_url, "http://browserless:3000");
        assert_eq!(cfg.browserless_token.as_deref(), Some("secret"));
        assert_eq!(cfg.max_sessions, 8);
        assert_eq!(cfg.http_timeout, Duration::from_secs(12));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = config(&[
            ("SCRAPER_MAX_SESSIONS", "lots"),
            ("SCRAPER_HTTP_TIMEOUT_SECS", "-3"),
        ]);
        assert_eq!(cfg.max_sessions, 2);
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_sessions_is_clamped() {
        assert_eq!(config(&[("SCRAPER_MAX_SESSIONS", "0")]).max_sessions, 1);
    }

    #[test]
    fn blank_token_counts_as_unset() {
        assert!(config(&[("BROWSERLESS_TOKEN", "  ")]).browserless_token.is_none());
        assert_eq!(redact(None), "<unset>");
        assert_eq!(redact(Some("secret")), "****");
    }
}
