//! Error taxonomy for the volatility analysis pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `AnalysisError`.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while acquiring, modelling or persisting data.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Market data provider unreachable or returned an unusable payload.
    #[error("Market data acquisition failed for {ticker}: {reason}")]
    Acquisition {
        /// Requested symbol.
        ticker: String,
        /// Provider or transport message.
        reason: String,
    },

    /// Provider does not know the symbol. Never retried.
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Not enough observations for the requested computation.
    #[error("Insufficient data for {stage}: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Pipeline stage that rejected the input.
        stage: &'static str,
        /// Minimum observation count.
        required: usize,
        /// Observations supplied.
        actual: usize,
    },

    /// Price series violates ordering or positivity.
    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    /// Likelihood maximisation failed to converge.
    #[error("GARCH optimisation did not converge: {0}")]
    Convergence(String),

    /// Writing an artefact to disk failed.
    #[error("Failed to persist {path}: {reason}")]
    Persistence {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O or encoder message.
        reason: String,
    },

    /// Configuration value rejected during validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AnalysisError::Acquisition { .. })
    }

    /// Shorthand for a persistence failure on `path`.
    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalysisError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_acquisition_is_transient() {
        let net = AnalysisError::Acquisition {
            ticker: "AAPL".into(),
            reason: "connection reset".into(),
        };
        assert!(net.is_transient());
        assert!(!AnalysisError::UnknownTicker("ZZZZ".into()).is_transient());
        assert!(!AnalysisError::Convergence("max iters".into()).is_transient());
    }

    #[test]
    fn insufficient_data_message_names_stage() {
        let e = AnalysisError::InsufficientData { stage: "garch fit", required: 10, actual: 3 };
        let msg = e.to_string();
        assert!(msg.contains("garch fit"));
        assert!(msg.contains("10"));
        assert!(msg.contains('3'));
    }
}
