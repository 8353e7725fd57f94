/// main.rs — Volatility analysis entry point
///
/// Runs the full GARCH(1,1) volatility study for one ticker:
///   1. Load config from .env, apply command-line overrides
///   2. Download daily adjusted closes from Yahoo Finance
///   3. Run the numerical pipeline (returns, ARCH-LM, fit, forecast, VaR)
///   4. Save the CSV dataset and the four charts
///   5. Print the console report
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use garch_engine::{run_analysis, AppConfig};
use vol_report::{output, plots, Artefacts, Cli, ConsoleReport, YahooDataClient};

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════╗");
    info!("║      VOL REPORT  —  GARCH(1,1) ANALYSIS      ║");
    info!("║  ARCH-LM · MLE fit · forecast · VaR          ║");
    info!("╚══════════════════════════════════════════════╝");

    // ── Config ───────────────────────────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env()?;
    cli.apply(&mut cfg);
    cfg.validate()?;
    info!(
        "Config: ticker={} window={}..{} horizon={} mean={} calendar={:?}",
        cfg.ticker, cfg.start_date, cfg.end_date,
        cfg.forecast_horizon, cfg.mean_model, cfg.forecast_calendar
    );

    // ── Fetch Data ───────────────────────────────────────────────────────
    let client = YahooDataClient::new(&cfg)?;
    info!("Downloading {} daily prices from {}...", cfg.ticker, cfg.yahoo_base_url);
    let prices = client
        .fetch_adjusted_close(&cfg.ticker, cfg.start_date, cfg.end_date)
        .await?;

    // ── Analysis ─────────────────────────────────────────────────────────
    let report = run_analysis(&prices, &cfg)?;

    // ── Output ───────────────────────────────────────────────────────────
    let mut artefacts = Artefacts::default();

    let csv_path = cfg.csv_path();
    match output::write_combined_csv(&report.combined, &csv_path) {
        Ok(()) => artefacts.csv = Some(csv_path),
        Err(e) => warn!(error = %e, "CSV not written, continuing"),
    }

    for (path, outcome) in plots::render_all(&report, &cfg.plots_dir) {
        match outcome {
            Ok(()) => artefacts.charts.push(path),
            Err(e) => warn!(error = %e, "Chart not written, continuing"),
        }
    }

    println!("{}", ConsoleReport { report: &report, artefacts: &artefacts });
    Ok(())
}
