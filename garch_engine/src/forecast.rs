//! Forward volatility projection from a fitted model.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{forward_dates, ForecastCalendar};
use crate::models::garch::GarchFit;

#[derive(Debug, Clone, Serialize)]
pub struct VolatilityForecast {
    pub dates:      Vec<NaiveDate>,
    pub variance:   Vec<f64>,
    /// √variance, same length as `variance`
    pub volatility: Vec<f64>,
}

impl VolatilityForecast {
    pub fn len(&self) -> usize {
        self.volatility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volatility.is_empty()
    }
}

/// Project `horizon` steps beyond the last training observation.
pub fn forecast(fit: &GarchFit, horizon: usize, calendar: ForecastCalendar) -> VolatilityForecast {
    let variance = fit.forecast_variance(horizon);
    let volatility = variance.iter().map(|v| v.max(0.0).sqrt()).collect();
    let dates = fit
        .last_date()
        .map(|last| forward_dates(last, horizon, calendar))
        .unwrap_or_default();
    VolatilityForecast { dates, variance, volatility }
}

impl std::fmt::Display for VolatilityForecast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<6} {:<12} {:>12}", "STEP", "DATE", "VOL (%)")?;
        writeln!(f, "{}", "─".repeat(32))?;
        for (i, (d, v)) in self.dates.iter().zip(&self.volatility).enumerate() {
            writeln!(f, "{:<6} {:<12} {:>12.4}", i + 1, d, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReturnSeries;
    use crate::models::garch::MeanModel;
    use chrono::Days;

    fn wavy_returns(n: usize) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let dates = (0..n).map(|i| start + Days::new(i as u64)).collect();
        let values = (0..n)
            .map(|i| {
                let burst = if (i / 40) % 2 == 0 { 0.6 } else { 2.2 };
                burst * ((i as f64) * 1.7).sin()
            })
            .collect();
        ReturnSeries::new(dates, values).unwrap()
    }

    #[test]
    fn horizon_is_respected_and_non_negative() {
        let fit = GarchFit::fit(&wavy_returns(600), MeanModel::Zero).unwrap();
        for h in [1, 30, 250] {
            let fc = forecast(&fit, h, ForecastCalendar::Weekdays);
            assert_eq!(fc.len(), h);
            assert_eq!(fc.dates.len(), h);
            assert!(fc.volatility.iter().all(|&v| v >= 0.0));
            assert!(fc.dates[0] > fit.last_date().unwrap());
        }
    }

    #[test]
    fn first_step_uses_last_residual_and_variance() {
        let returns = wavy_returns(400);
        let fit = GarchFit::fit(&returns, MeanModel::Zero).unwrap();
        let p = fit.params;
        let last_r = *returns.values.last().unwrap();
        let last_s = fit.latest_volatility();
        let expected = p.omega + p.alpha * last_r * last_r + p.beta * last_s * last_s;
        let fc = forecast(&fit, 2, ForecastCalendar::Calendar);
        assert!((fc.variance[0] - expected).abs() < 1e-9);
        assert!((fc.variance[1] - (p.omega + p.persistence() * expected)).abs() < 1e-9);
    }
}
