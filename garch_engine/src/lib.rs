pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod forecast;
pub mod linalg;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod stats;

pub use config::AppConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{run_analysis, AnalysisReport};
