/// risk.rs — One-day Value-at-Risk
///
///   Historical VaR_α = q_α(r)                     (empirical α-quantile)
///   GARCH VaR_α      = μ + σ_T · Φ⁻¹(α)           (μ = 0 for the zero-mean model)
///
/// Both are expressed in percent return; a 95% VaR uses α = 0.05 and is
/// negative (a loss threshold).
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::models::garch::GarchFit;
use crate::stats::{norm_ppf, quantile};

#[derive(Debug, Clone, Serialize)]
pub struct VarReport {
    pub latest_date:    Option<NaiveDate>,
    pub confidence:     f64,
    pub historical_var: f64,
    pub garch_var:      f64,
    pub latest_vol:     f64,
    pub z_score:        f64,
}

/// Empirical `tail` quantile of the return distribution.
pub fn historical_var(returns: &[f64], tail: f64) -> Result<f64> {
    quantile(returns, tail).ok_or(AnalysisError::InsufficientData {
        stage: "historical VaR",
        required: 1,
        actual: returns.len(),
    })
}

/// Parametric VaR from a conditional mean and volatility under normality.
pub fn parametric_var(mu: f64, sigma: f64, tail: f64) -> f64 {
    mu + sigma * norm_ppf(tail)
}

pub fn compute_var(returns: &[f64], fit: &GarchFit, confidence: f64) -> Result<VarReport> {
    let tail = 1.0 - confidence;
    let latest_vol = fit.latest_volatility();
    Ok(VarReport {
        latest_date: fit.last_date(),
        confidence,
        historical_var: historical_var(returns, tail)?,
        garch_var: parametric_var(fit.params.mu, latest_vol, tail),
        latest_vol,
        z_score: norm_ppf(tail),
    })
}

impl std::fmt::Display for VarReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = self.confidence * 100.0;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "RISK MANAGEMENT INSIGHTS")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(
            f,
            "Latest Date: {}",
            self.latest_date.map(|d| d.to_string()).unwrap_or_else(|| "?".into())
        )?;
        writeln!(f, "1-Day {pct:.0}% Historical VaR       : {:.2}%", self.historical_var)?;
        writeln!(f, "1-Day {pct:.0}% GARCH-based VaR      : {:.2}%", self.garch_var)?;
        writeln!(f, "Current Conditional Volatility : {:.2}%", self.latest_vol)?;
        writeln!(f, "z-score (Φ⁻¹)                  : {:.4}", self.z_score)?;
        writeln!(f, "→ GARCH VaR adjusts dynamically to recent market conditions.")?;
        write!(f, "{}", "=".repeat(50))
    }
}
