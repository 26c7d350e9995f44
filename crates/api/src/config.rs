use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use terranova_core::error::CoreError;

/// Default Gemini model used for chat replies.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory uploaded chat images are written to.
    pub upload_dir: PathBuf,
    /// Maximum request body size for uploads (default: 8 MiB).
    pub max_upload_bytes: usize,
    /// Gemini API key; chat falls back to offline replies when unset.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// Dashboard timers and sizes.
    pub dashboard: DashboardConfig,
}

/// Intervals and sizes for the simulated dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Simulator tick interval.
    pub metrics_interval: Duration,
    /// Threshold evaluation interval.
    pub alert_interval: Duration,
    /// Lifetime of a transient alert notification.
    pub alert_lifetime: Duration,
    /// Lifetime of an entry in the persistent activity list.
    pub activity_lifetime: Duration,
    /// Maximum number of entries in the activity list.
    pub activity_capacity: usize,
    /// How often expired alerts are swept from the feeds.
    pub sweep_interval: Duration,
    /// Number of synthetic history rows generated at startup.
    pub history_backfill: usize,
    /// How often a history row is sampled from the current readings.
    pub history_sample_interval: Duration,
    /// How often the live chart series rolls forward.
    pub chart_refresh_interval: Duration,
    /// Use the single-band air quality policy.
    pub legacy_air_quality: bool,
    /// Post the demo farm activity notices after startup.
    pub seed_activity: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            metrics_interval: Duration::from_secs(5),
            alert_interval: Duration::from_secs(10),
            alert_lifetime: Duration::from_secs(10),
            activity_lifetime: Duration::from_secs(24 * 3600),
            activity_capacity: 5,
            sweep_interval: Duration::from_secs(1),
            history_backfill: 50,
            history_sample_interval: Duration::from_secs(3600),
            chart_refresh_interval: Duration::from_secs(30),
            legacy_air_quality: false,
            seed_activity: true,
        }
    }
}

impl DashboardConfig {
    /// Every periodic task needs a non-zero period.
    pub fn validate(&self) -> Result<(), CoreError> {
        let intervals = [
            ("metrics_interval", self.metrics_interval),
            ("alert_interval", self.alert_interval),
            ("sweep_interval", self.sweep_interval),
            ("history_sample_interval", self.history_sample_interval),
            ("chart_refresh_interval", self.chart_refresh_interval),
        ];
        match intervals.iter().find(|(_, period)| period.is_zero()) {
            Some((name, _)) => Err(CoreError::Validation(format!(
                "{name} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `127.0.0.1`                |
    /// | `PORT`                  | `5000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `UPLOAD_DIR`            | `static/uploads`           |
    /// | `MAX_UPLOAD_BYTES`      | `8388608`                  |
    /// | `GEMINI_API_KEY`        | unset                      |
    /// | `GEMINI_MODEL`          | `gemini-2.0-flash-001`     |
    /// | `METRICS_INTERVAL_SECS` | `5`                        |
    /// | `ALERT_INTERVAL_SECS`   | `10`                       |
    /// | `ALERT_LIFETIME_SECS`   | `10`                       |
    /// | `ACTIVITY_CAPACITY`     | `5`                        |
    /// | `HISTORY_BACKFILL`      | `50`                       |
    /// | `HISTORY_SAMPLE_SECS`   | `3600`                     |
    /// | `CHART_REFRESH_SECS`    | `30`                       |
    /// | `LEGACY_AIR_QUALITY`    | `false`                    |
    /// | `SEED_ACTIVITY`         | `true`                     |
    ///
    /// Panics on malformed values, so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port: u16 = env_parse("PORT", 5000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let defaults = DashboardConfig::default();
        let dashboard = DashboardConfig {
            metrics_interval: env_secs("METRICS_INTERVAL_SECS", defaults.metrics_interval),
            alert_interval: env_secs("ALERT_INTERVAL_SECS", defaults.alert_interval),
            alert_lifetime: env_secs("ALERT_LIFETIME_SECS", defaults.alert_lifetime),
            activity_capacity: env_parse("ACTIVITY_CAPACITY", defaults.activity_capacity),
            history_backfill: env_parse("HISTORY_BACKFILL", defaults.history_backfill),
            history_sample_interval: env_secs(
                "HISTORY_SAMPLE_SECS",
                defaults.history_sample_interval,
            ),
            chart_refresh_interval: env_secs("CHART_REFRESH_SECS", defaults.chart_refresh_interval),
            legacy_air_quality: env_parse("LEGACY_AIR_QUALITY", defaults.legacy_air_quality),
            seed_activity: env_parse("SEED_ACTIVITY", defaults.seed_activity),
            ..defaults
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".into())
                .into(),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 8 * 1024 * 1024),
            gemini_api_key,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            dashboard,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid value: {e}")),
        Err(_) => default,
    }
}

/// Parse a non-zero whole number of seconds from the environment.
fn env_secs(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(raw) => parse_secs(&raw).unwrap_or_else(|e| panic!("{key} {e}")),
        Err(_) => default,
    }
}

fn parse_secs(raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("must be a whole number of seconds: {e}"))?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn zero_seconds_is_rejected() {
        assert_eq!(parse_secs(" 5 "), Ok(Duration::from_secs(5)));
        assert_eq!(parse_secs("0"), Err("must be greater than zero".to_string()));
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        assert!(DashboardConfig::default().validate().is_ok());

        let config = DashboardConfig {
            sweep_interval: Duration::ZERO,
            ..DashboardConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(CoreError::Validation(msg)) if msg.contains("sweep_interval")
        );
    }
}
