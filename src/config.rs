//! Layered settings.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`hostwatch.toml` unless `--config` says otherwise)
//! 3. `HOSTWATCH_*` environment variables, nested keys joined with `__`
//!    (`HOSTWATCH_THRESHOLDS__CRITICAL_UPTIME_PCT=40`)
//! 4. command-line flags
//!
//! A `file` from the TOML or the environment selects replay mode, but an
//! endpoint given on the command line switches back to polling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::dashboard::DashboardOptions;
use crate::data::time::parse_duration;
use crate::data::Thresholds;

pub const DEFAULT_CONFIG_FILE: &str = "hostwatch.toml";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8081/metrics";

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub file: Option<PathBuf>,
    pub refresh: Option<String>,
    pub window_capacity: Option<usize>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    endpoint: String,
    file: Option<PathBuf>,
    refresh: String,
    fetch_timeout: String,
    window_capacity: usize,
    #[serde(default)]
    thresholds: Thresholds,
    log_file: PathBuf,
    log_filter: String,
}

/// Validated settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    /// Replay this snapshot file instead of polling `endpoint`.
    pub file: Option<PathBuf>,
    pub refresh: Duration,
    pub fetch_timeout: Duration,
    pub window_capacity: usize,
    pub thresholds: Thresholds,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Settings {
    /// Load from `config_path` (or [`DEFAULT_CONFIG_FILE`]), the environment
    /// and `overrides`.
    ///
    /// A missing file is fine unless it was named explicitly.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };
        Self::build(file, Environment::with_prefix("HOSTWATCH"), overrides)
    }

    fn build<F>(file: F, env: Environment, overrides: &Overrides) -> Result<Self>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let defaults = Thresholds::default();

        let config = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("refresh", "5s")?
            .set_default("fetch_timeout", "4s")?
            .set_default("window_capacity", crate::data::window::DEFAULT_CAPACITY as i64)?
            .set_default("thresholds.degraded_uptime_pct", defaults.degraded_uptime_pct)?
            .set_default("thresholds.critical_uptime_pct", defaults.critical_uptime_pct)?
            .set_default(
                "thresholds.degraded_packet_loss_pct",
                defaults.degraded_packet_loss_pct,
            )?
            .set_default("log_file", "hostwatch.log")?
            .set_default("log_filter", "info")?
            .add_source(file)
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option(
                "file",
                overrides.file.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("refresh", overrides.refresh.clone())?
            .set_override_option("window_capacity", overrides.window_capacity.map(|n| n as i64))?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?
            .build()
            .context("Failed to load configuration")?;

        let mut raw: RawSettings = config.try_deserialize().context("Invalid configuration")?;
        // An endpoint on the command line beats a replay file from lower layers
        if overrides.endpoint.is_some() {
            raw.file = None;
        }
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self> {
        let refresh = parse_duration(&raw.refresh).context("Invalid refresh period")?;
        if refresh.is_zero() {
            bail!("Refresh period must be greater than zero");
        }
        let fetch_timeout =
            parse_duration(&raw.fetch_timeout).context("Invalid fetch timeout")?;
        if fetch_timeout.is_zero() {
            bail!("Fetch timeout must be greater than zero");
        }
        if raw.window_capacity == 0 {
            bail!("Window capacity must be at least 1");
        }

        let t = &raw.thresholds;
        for (name, value) in [
            ("degraded_uptime_pct", t.degraded_uptime_pct),
            ("critical_uptime_pct", t.critical_uptime_pct),
            ("degraded_packet_loss_pct", t.degraded_packet_loss_pct),
        ] {
            if !value.is_finite() {
                bail!("Threshold {} must be a finite number", name);
            }
        }

        Ok(Self {
            endpoint: raw.endpoint,
            file: raw.file,
            refresh,
            fetch_timeout,
            window_capacity: raw.window_capacity,
            thresholds: raw.thresholds,
            log_file: raw.log_file,
            log_filter: raw.log_filter,
        })
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            refresh: self.refresh,
            window_capacity: self.window_capacity,
            thresholds: self.thresholds.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Environment {
        Environment::with_prefix("HOSTWATCH").source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Environment::with_prefix("HOSTWATCH").source(Some(map))
    }

    fn toml(contents: &str) -> File<config::FileSourceString, FileFormat> {
        File::from_str(contents, FileFormat::Toml)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::build(toml(""), no_env(), &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.refresh, Duration::from_secs(5));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(4));
        assert_eq!(settings.window_capacity, 20);
        assert_eq!(settings.thresholds, Thresholds::default());
        assert_eq!(settings.log_file, PathBuf::from("hostwatch.log"));
        assert_eq!(settings.log_filter, "info");
        assert!(settings.file.is_none());
    }

    #[test]
    fn test_file_values() {
        let file = toml(
            r#"
            endpoint = "http://monitor:9000/metrics"
            refresh = "2s"
            window_capacity = 50

            [thresholds]
            critical_uptime_pct = 40.0
            "#,
        );
        let settings = Settings::build(file, no_env(), &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, "http://monitor:9000/metrics");
        assert_eq!(settings.refresh, Duration::from_secs(2));
        assert_eq!(settings.window_capacity, 50);
        assert_eq!(settings.thresholds.critical_uptime_pct, 40.0);
        // Unset keys in the table keep their defaults
        assert_eq!(settings.thresholds.degraded_uptime_pct, 90.0);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = toml("refresh = \"2s\"");
        let vars = env(&[
            ("HOSTWATCH_REFRESH", "10s"),
            ("HOSTWATCH_THRESHOLDS__DEGRADED_PACKET_LOSS_PCT", "5"),
        ]);
        let settings = Settings::build(file, vars, &Overrides::default()).unwrap();
        assert_eq!(settings.refresh, Duration::from_secs(10));
        assert_eq!(settings.thresholds.degraded_packet_loss_pct, 5.0);
    }

    #[test]
    fn test_cli_overrides_env() {
        let vars = env(&[("HOSTWATCH_WINDOW_CAPACITY", "30")]);
        let overrides = Overrides {
            window_capacity: Some(5),
            endpoint: Some("http://other/metrics".to_string()),
            ..Default::default()
        };
        let settings = Settings::build(toml(""), vars, &overrides).unwrap();
        assert_eq!(settings.window_capacity, 5);
        assert_eq!(settings.endpoint, "http://other/metrics");
    }

    #[test]
    fn test_cli_endpoint_clears_configured_file() {
        let file = toml("file = \"replay.json\"");
        let overrides = Overrides {
            endpoint: Some("http://live/metrics".to_string()),
            ..Default::default()
        };
        let settings = Settings::build(file, no_env(), &overrides).unwrap();
        assert_eq!(settings.endpoint, "http://live/metrics");
        assert!(settings.file.is_none());

        let vars = env(&[("HOSTWATCH_FILE", "replay.json")]);
        let settings = Settings::build(toml(""), vars, &overrides).unwrap();
        assert!(settings.file.is_none());
    }

    #[test]
    fn test_configured_file_kept_without_cli_endpoint() {
        let file = toml("file = \"replay.json\"");
        let settings = Settings::build(file, no_env(), &Overrides::default()).unwrap();
        assert_eq!(settings.file, Some(PathBuf::from("replay.json")));

        // A file given on the command line still wins over the endpoint default
        let overrides = Overrides {
            file: Some(PathBuf::from("cli.json")),
            ..Default::default()
        };
        let settings = Settings::build(toml(""), no_env(), &overrides).unwrap();
        assert_eq!(settings.file, Some(PathBuf::from("cli.json")));
    }

    #[test]
    fn test_zero_window_rejected() {
        let overrides = Overrides {
            window_capacity: Some(0),
            ..Default::default()
        };
        assert!(Settings::build(toml(""), no_env(), &overrides).is_err());
    }

    #[test]
    fn test_bad_duration_rejected() {
        let overrides = Overrides {
            refresh: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(Settings::build(toml(""), no_env(), &overrides).is_err());

        let zero = Overrides {
            refresh: Some("0s".to_string()),
            ..Default::default()
        };
        assert!(Settings::build(toml(""), no_env(), &zero).is_err());
    }

    #[test]
    fn test_missing_default_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let missing = File::new(
            dir.path().join("absent.toml").to_str().unwrap(),
            FileFormat::Toml,
        )
        .required(false);
        assert!(Settings::build(missing, no_env(), &Overrides::default()).is_ok());
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load(Some(&path), &Overrides::default()).is_err());
    }

    #[test]
    fn test_dashboard_options() {
        let settings = Settings::build(toml(""), no_env(), &Overrides::default()).unwrap();
        let options = settings.dashboard_options();
        assert_eq!(options.refresh, Duration::from_secs(5));
        assert_eq!(options.window_capacity, 20);
    }
}
