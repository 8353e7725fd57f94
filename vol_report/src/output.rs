//! CSV persistence of the combined price/return table.

use polars::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

use garch_engine::data::CombinedRow;
use garch_engine::{AnalysisError, Result};

/// `Date`, `Adj_Close`, `Log_Returns_Pct` frame, one row per return.
pub fn combined_frame(rows: &[CombinedRow]) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.adj_close).collect();
    let returns: Vec<f64> = rows.iter().map(|r| r.log_return_pct).collect();

    df!(
        "Date" => dates,
        "Adj_Close" => closes,
        "Log_Returns_Pct" => returns
    )
}

/// Write (overwriting) the table at `path`, creating parent directories.
pub fn write_combined_csv(rows: &[CombinedRow], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| AnalysisError::persistence(path, e))?;
    }
    let mut df = combined_frame(rows).map_err(|e| AnalysisError::persistence(path, e))?;
    let mut file = fs::File::create(path).map_err(|e| AnalysisError::persistence(path, e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| AnalysisError::persistence(path, e))?;

    info!(rows = df.height(), path = %path.display(), "Dataset saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use garch_engine::data::{PricePoint, PriceSeries};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("vol_report_output_{}", std::process::id()))
            .join(name)
    }

    fn rows() -> Vec<CombinedRow> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let points = [172.1, 170.4, 171.9, 169.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint { date: start + chrono::Days::new(i as u64), adj_close: p })
            .collect();
        let prices = PriceSeries::new(points).unwrap();
        let returns = prices.log_returns().unwrap();
        prices.combined(&returns)
    }

    #[test]
    fn frame_has_one_row_per_return() {
        let df = combined_frame(&rows()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(
            df.get_column_names_str(),
            vec!["Date", "Adj_Close", "Log_Returns_Pct"]
        );
    }

    #[test]
    fn rewriting_is_byte_identical() {
        let path = scratch("nested/AAPL_historical_data_with_returns.csv");
        let rows = rows();
        write_combined_csv(&rows, &path).unwrap();
        let first = fs::read(&path).unwrap();
        write_combined_csv(&rows, &path).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Adj_Close,Log_Returns_Pct"));
        assert!(lines.next().unwrap().starts_with("2024-03-02,170.4,"));
        assert_eq!(text.lines().count(), 4);
    }
}
