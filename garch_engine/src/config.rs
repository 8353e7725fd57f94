/// config.rs — Centralised configuration loaded from .env
///
/// All parameters consumed by the analysis pipeline are defined here.
/// Loading happens once at startup; every stage borrows &AppConfig.
use anyhow::Result;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

use crate::calendar::ForecastCalendar;
use crate::error::AnalysisError;
use crate::models::garch::MeanModel;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_FORECAST_HORIZON: usize = 30;
pub const DEFAULT_VAR_CONFIDENCE: f64 = 0.95;
/// Lags in the auxiliary ARCH-LM regression
pub const DEFAULT_ARCH_LM_LAGS: usize = 10;
/// Lags shown in the ACF panel of the EDA chart
pub const DEFAULT_ACF_LAGS: usize = 40;
/// Chronological train share for the out-of-sample evaluation
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
/// Upper bound on download retries
pub const MAX_FETCH_RETRIES: u32 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── Instrument & window ──────────────────────────────────────────
    pub ticker:     String,
    pub start_date: NaiveDate,
    /// Last day of the download window, inclusive
    pub end_date:   NaiveDate,

    // ── Model ────────────────────────────────────────────────────────
    pub mean_model:       MeanModel,
    pub forecast_horizon: usize,
    pub forecast_calendar: ForecastCalendar,
    pub train_fraction:   f64,

    // ── Diagnostics ──────────────────────────────────────────────────
    pub arch_lm_lags: usize,
    pub acf_lags:     usize,

    // ── Risk ─────────────────────────────────────────────────────────
    /// One-day VaR confidence (0.95 → 5% left tail)
    pub var_confidence: f64,

    // ── Output ───────────────────────────────────────────────────────
    pub data_dir:  PathBuf,
    pub plots_dir: PathBuf,

    // ── Market data provider ─────────────────────────────────────────
    pub yahoo_base_url:     String,
    pub fetch_max_retries:  u32,
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ticker:     DEFAULT_TICKER.into(),
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            end_date:   NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),

            mean_model:        MeanModel::Zero,
            forecast_horizon:  DEFAULT_FORECAST_HORIZON,
            forecast_calendar: ForecastCalendar::Weekdays,
            train_fraction:    DEFAULT_TRAIN_FRACTION,

            arch_lm_lags: DEFAULT_ARCH_LM_LAGS,
            acf_lags:     DEFAULT_ACF_LAGS,

            var_confidence: DEFAULT_VAR_CONFIDENCE,

            data_dir:  PathBuf::from("data"),
            plots_dir: PathBuf::from("volatility_plots"),

            yahoo_base_url:     "https://query1.finance.yahoo.com".into(),
            fetch_max_retries:  3,
            fetch_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables (after dotenv).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // ignore missing .env

        let d = Self::default();
        let cfg = Self {
            ticker: env::var("TICKER")
                .map(|t| t.trim().to_uppercase())
                .unwrap_or(d.ticker),
            start_date: parse_env("START_DATE", d.start_date)?,
            end_date:   parse_env("END_DATE",   d.end_date)?,

            mean_model:        parse_env("MEAN_MODEL",        d.mean_model)?,
            forecast_horizon:  parse_env("FORECAST_HORIZON",  d.forecast_horizon)?,
            forecast_calendar: parse_env("FORECAST_CALENDAR", d.forecast_calendar)?,
            train_fraction:    parse_env("TRAIN_FRACTION",    d.train_fraction)?,

            arch_lm_lags: parse_env("ARCH_LM_LAGS", d.arch_lm_lags)?,
            acf_lags:     parse_env("ACF_LAGS",     d.acf_lags)?,

            var_confidence: parse_env("VAR_CONFIDENCE", d.var_confidence)?,

            data_dir:  env::var("DATA_DIR").map(PathBuf::from).unwrap_or(d.data_dir),
            plots_dir: env::var("PLOTS_DIR").map(PathBuf::from).unwrap_or(d.plots_dir),

            yahoo_base_url:     env::var("YAHOO_BASE_URL").unwrap_or(d.yahoo_base_url),
            fetch_max_retries:  parse_env("FETCH_MAX_RETRIES",  d.fetch_max_retries)?,
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", d.fetch_timeout_secs)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject combinations the pipeline cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(AnalysisError::Config("ticker must not be empty".into()));
        }
        if self.start_date >= self.end_date {
            return Err(AnalysisError::Config(format!(
                "start date {} must precede end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.forecast_horizon == 0 {
            return Err(AnalysisError::Config("forecast horizon must be at least 1".into()));
        }
        if !(self.var_confidence > 0.0 && self.var_confidence < 1.0) {
            return Err(AnalysisError::Config(format!(
                "VaR confidence must lie in (0, 1), got {}",
                self.var_confidence
            )));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(AnalysisError::Config(format!(
                "train fraction must lie in (0, 1), got {}",
                self.train_fraction
            )));
        }
        if self.arch_lm_lags == 0 {
            return Err(AnalysisError::Config("ARCH-LM lag count must be at least 1".into()));
        }
        if self.fetch_max_retries > MAX_FETCH_RETRIES {
            return Err(AnalysisError::Config(format!(
                "fetch retries must be at most {MAX_FETCH_RETRIES}, got {}",
                self.fetch_max_retries
            )));
        }
        Ok(())
    }

    /// Left-tail probability used for VaR (1 − confidence).
    pub fn var_tail(&self) -> f64 {
        1.0 - self.var_confidence
    }

    /// `data/<TICKER>_historical_data_with_returns.csv`
    pub fn csv_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}_historical_data_with_returns.csv", self.ticker))
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Config key {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ticker, "AAPL");
        assert_eq!(cfg.forecast_horizon, 30);
        assert_eq!(cfg.mean_model, MeanModel::Zero);
        assert!((cfg.var_tail() - 0.05).abs() < 1e-12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn csv_path_uses_ticker() {
        let cfg = AppConfig { ticker: "MSFT".into(), ..AppConfig::default() };
        assert_eq!(
            cfg.csv_path(),
            PathBuf::from("data").join("MSFT_historical_data_with_returns.csv")
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = AppConfig::default();

        let cfg = AppConfig { forecast_horizon: 0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(AnalysisError::Config(_))));

        let cfg = AppConfig { var_confidence: 1.0, ..base.clone() };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig { train_fraction: 0.0, ..base.clone() };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig { end_date: base.start_date, ..base.clone() };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig { fetch_max_retries: 65, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(AnalysisError::Config(_))));

        let cfg = AppConfig { fetch_max_retries: MAX_FETCH_RETRIES, ..base.clone() };
        assert!(cfg.validate().is_ok());

        let cfg = AppConfig { ticker: "  ".into(), ..base };
        assert!(cfg.validate().is_err());
    }
}
