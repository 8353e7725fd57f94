/// pipeline.rs — Numerical analysis pipeline
///
/// Pure stages only: no network, no filesystem. Given a price series and the
/// run configuration it produces every number the report and charts need.
///
/// ┌──────────────────────────────────────────────────────────┐
/// │  PriceSeries                                             │
/// │     │ log_returns()                                      │
/// │     ▼                                                    │
/// │  ReturnSeries ──► Describe / ACF(r²)                     │
/// │     │                                                    │
/// │     ├─► ARCH-LM test        (informational, never gates) │
/// │     ├─► GarchFit (full)  ──► forecast(H) ──► VaR         │
/// │     └─► split 80/20 ──► GarchFit (train) ──► evaluation  │
/// └──────────────────────────────────────────────────────────┘
use tracing::info;

use crate::config::AppConfig;
use crate::data::{CombinedRow, PriceSeries, ReturnSeries};
use crate::error::{AnalysisError, Result};
use crate::evaluation::{evaluate_out_of_sample, ForecastEvaluation};
use crate::forecast::{forecast, VolatilityForecast};
use crate::models::arch_test::{arch_lm_test, ArchLmResult};
use crate::models::garch::GarchFit;
use crate::risk::{compute_var, VarReport};
use crate::stats::{acf, Describe};

/// Everything one run computes.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub ticker:     String,
    pub returns:    ReturnSeries,
    pub combined:   Vec<CombinedRow>,
    pub describe:   Describe,
    /// ACF of squared returns, lags 0..=acf_lags
    pub sq_acf:     Vec<f64>,
    pub arch_lm:    ArchLmResult,
    pub fit:        GarchFit,
    pub forecast:   VolatilityForecast,
    pub evaluation: ForecastEvaluation,
    pub var:        VarReport,
}

/// Return transformation plus the combined table, without modelling.
pub fn prepare_returns(prices: &PriceSeries) -> Result<(ReturnSeries, Vec<CombinedRow>)> {
    let returns = prices.log_returns()?;
    let combined = prices.combined(&returns);
    Ok((returns, combined))
}

/// Run every numerical stage in order.
pub fn run_analysis(prices: &PriceSeries, cfg: &AppConfig) -> Result<AnalysisReport> {
    cfg.validate()?;

    let (returns, combined) = prepare_returns(prices)?;
    info!(
        observations = returns.len(),
        first = ?returns.dates.first(),
        last = ?returns.last_date(),
        "Return series ready"
    );

    let describe = Describe::of(&returns.values).ok_or(AnalysisError::InsufficientData {
        stage: "descriptive statistics",
        required: 1,
        actual: 0,
    })?;
    let sq_acf = acf(&returns.squared(), cfg.acf_lags);

    let arch_lm = arch_lm_test(&returns.values, cfg.arch_lm_lags)?;
    info!(
        lm = arch_lm.lm_stat,
        p_value = arch_lm.lm_pvalue,
        significant = arch_lm.significant(),
        "ARCH-LM test"
    );

    info!(mean_model = %cfg.mean_model, "Fitting GARCH(1,1) on full sample");
    let fit = GarchFit::fit(&returns, cfg.mean_model)?;
    info!(
        omega = fit.params.omega,
        alpha = fit.params.alpha,
        beta = fit.params.beta,
        log_likelihood = fit.log_likelihood,
        "GARCH(1,1) fitted"
    );

    let forecast = forecast(&fit, cfg.forecast_horizon, cfg.forecast_calendar);
    let evaluation = evaluate_out_of_sample(&returns, cfg.train_fraction, cfg.mean_model)?;
    info!(rmse = evaluation.rmse, mae = evaluation.mae, "Out-of-sample evaluation");

    let var = compute_var(&returns.values, &fit, cfg.var_confidence)?;

    Ok(AnalysisReport {
        ticker: cfg.ticker.clone(),
        returns,
        combined,
        describe,
        sq_acf,
        arch_lm,
        fit,
        forecast,
        evaluation,
        var,
    })
}
