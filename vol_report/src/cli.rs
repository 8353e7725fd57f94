/// cli.rs — Command-line overrides
///
/// Every flag is optional; anything given here wins over the environment
/// and `.env` values already loaded into `AppConfig`.
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use garch_engine::calendar::ForecastCalendar;
use garch_engine::models::MeanModel;
use garch_engine::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "vol_report")]
#[command(about = "GARCH(1,1) volatility analysis of a daily equity price series")]
#[command(version)]
pub struct Cli {
    /// Ticker symbol (e.g., AAPL)
    #[arg(short, long)]
    pub ticker: Option<String>,

    /// First day of the download window (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the download window, inclusive (YYYY-MM-DD)
    #[arg(short, long)]
    pub end_date: Option<NaiveDate>,

    /// Forecast horizon in trading days
    #[arg(long)]
    pub horizon: Option<usize>,

    /// VaR confidence level, e.g. 0.95
    #[arg(short, long)]
    pub confidence: Option<f64>,

    /// Conditional mean: zero | constant
    #[arg(short, long)]
    pub mean_model: Option<MeanModel>,

    /// Forecast date labels: weekdays | calendar
    #[arg(long)]
    pub calendar: Option<ForecastCalendar>,

    /// Directory for the CSV dataset
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory for the PNG charts
    #[arg(long)]
    pub plots_dir: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(t) = &self.ticker {
            cfg.ticker = t.trim().to_uppercase();
        }
        if let Some(d) = self.start_date {
            cfg.start_date = d;
        }
        if let Some(d) = self.end_date {
            cfg.end_date = d;
        }
        if let Some(h) = self.horizon {
            cfg.forecast_horizon = h;
        }
        if let Some(c) = self.confidence {
            cfg.var_confidence = c;
        }
        if let Some(m) = self.mean_model {
            cfg.mean_model = m;
        }
        if let Some(c) = self.calendar {
            cfg.forecast_calendar = c;
        }
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if let Some(dir) = &self.plots_dir {
            cfg.plots_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "vol_report",
            "--ticker", "msft",
            "--start-date", "2015-01-01",
            "--horizon", "10",
            "--mean-model", "constant",
            "--calendar", "calendar",
            "--plots-dir", "/tmp/charts",
        ])
        .unwrap();

        let mut cfg = AppConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.ticker, "MSFT");
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(cfg.forecast_horizon, 10);
        assert_eq!(cfg.mean_model, MeanModel::Constant);
        assert_eq!(cfg.forecast_calendar, ForecastCalendar::Calendar);
        assert_eq!(cfg.plots_dir, PathBuf::from("/tmp/charts"));
        // untouched
        assert_eq!(cfg.var_confidence, AppConfig::default().var_confidence);
        assert_eq!(cfg.end_date, AppConfig::default().end_date);
    }

    #[test]
    fn no_flags_leaves_defaults() {
        let cli = Cli::try_parse_from(["vol_report"]).unwrap();
        let mut cfg = AppConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.ticker, "AAPL");
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["vol_report", "--mean-model", "ar1"]).is_err());
        assert!(Cli::try_parse_from(["vol_report", "--start-date", "01/01/2015"]).is_err());
    }
}
