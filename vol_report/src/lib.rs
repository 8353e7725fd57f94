/// lib.rs — Volatility report runner
///
/// Side-effecting layer around `garch_engine`: market data download, CSV
/// and PNG output, the console report and the command line.

pub mod cli;
pub mod fetch_data;
pub mod output;
pub mod plots;
pub mod report;

pub use cli::Cli;
pub use fetch_data::YahooDataClient;
pub use report::{Artefacts, ConsoleReport};
