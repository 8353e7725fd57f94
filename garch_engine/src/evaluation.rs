/// evaluation.rs — Out-of-sample volatility forecast evaluation
///
/// Splits the return series chronologically, refits GARCH(1,1) on the
/// leading share only, then forecasts one path of len(test) steps from the
/// end of the training window and compares it with realised |r_t|.
///
///   RMSE = √( mean( (σ̂_{T+h} − |r_{T+h}|)² ) )
///   MAE  = mean( |σ̂_{T+h} − |r_{T+h}|| )
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::data::ReturnSeries;
use crate::error::{AnalysisError, Result};
use crate::models::garch::{GarchFit, MeanModel, MIN_FIT_OBS};
use crate::stats::{mae, mean, rmse};

#[derive(Debug, Clone, Serialize)]
pub struct ForecastEvaluation {
    pub train_len: usize,
    pub test_len:  usize,
    pub train_end: Option<NaiveDate>,
    /// Dates of the held-out window
    pub dates:     Vec<NaiveDate>,
    pub realized_abs:  Vec<f64>,
    pub forecast_vol:  Vec<f64>,
    pub rmse:          f64,
    pub mae:           f64,
    pub mean_forecast: f64,
    pub mean_realized: f64,
    #[serde(skip)]
    pub train_fit: GarchFit,
}

impl std::fmt::Display for ForecastEvaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Out-of-Sample Volatility Forecast Evaluation")?;
        writeln!(
            f,
            "  Train / Test      : {} / {} obs (train ends {})",
            self.train_len,
            self.test_len,
            self.train_end.map(|d| d.to_string()).unwrap_or_else(|| "?".into())
        )?;
        writeln!(f, "  RMSE vs |r|       : {:.4}", self.rmse)?;
        writeln!(f, "  MAE  vs |r|       : {:.4}", self.mae)?;
        writeln!(f, "  Mean forecast vol : {:.4}%", self.mean_forecast)?;
        write!(f, "  Mean realised |r| : {:.4}%", self.mean_realized)
    }
}

/// Refit on the first `train_fraction` of `returns` and score the forecast
/// against the remainder.
pub fn evaluate_out_of_sample(
    returns:        &ReturnSeries,
    train_fraction: f64,
    mean_model:     MeanModel,
) -> Result<ForecastEvaluation> {
    let (train, test) = returns.split_at_fraction(train_fraction);
    if train.len() < MIN_FIT_OBS {
        return Err(AnalysisError::InsufficientData {
            stage: "out-of-sample evaluation (train window)",
            required: MIN_FIT_OBS,
            actual: train.len(),
        });
    }
    if test.is_empty() {
        return Err(AnalysisError::InsufficientData {
            stage: "out-of-sample evaluation (test window)",
            required: 1,
            actual: 0,
        });
    }

    info!(train = train.len(), test = test.len(), "Refitting GARCH(1,1) on training window");
    let train_fit = GarchFit::fit(&train, mean_model)?;
    let forecast_vol: Vec<f64> = train_fit
        .forecast_variance(test.len())
        .into_iter()
        .map(|v| v.max(0.0).sqrt())
        .collect();
    let realized_abs = test.abs();

    Ok(ForecastEvaluation {
        train_len: train.len(),
        test_len: test.len(),
        train_end: train.last_date(),
        rmse: rmse(&forecast_vol, &realized_abs).unwrap_or(f64::NAN),
        mae: mae(&forecast_vol, &realized_abs).unwrap_or(f64::NAN),
        mean_forecast: mean(&forecast_vol).unwrap_or(f64::NAN),
        mean_realized: mean(&realized_abs).unwrap_or(f64::NAN),
        dates: test.dates,
        realized_abs,
        forecast_vol,
        train_fit,
    })
}
