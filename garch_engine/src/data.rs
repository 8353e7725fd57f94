/// data.rs — Price and return series
///
///   r_t = 100 · ln(P_t / P_{t-1})      (percentage log return)
///
/// The first price has no predecessor, so a series of n prices yields n−1
/// returns. Missing trading days stay missing: nothing is filled or
/// interpolated.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One trading day's adjusted close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date:      NaiveDate,
    pub adj_close: f64,
}

/// Daily adjusted closes, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate ordering and positivity.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for w in points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(AnalysisError::InvalidSeries(format!(
                    "dates not strictly increasing at {} → {}",
                    w[0].date, w[1].date
                )));
            }
        }
        if let Some(p) = points.iter().find(|p| !(p.adj_close.is_finite() && p.adj_close > 0.0)) {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-positive or non-finite price {} on {}",
                p.adj_close, p.date
            )));
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Percentage log returns, one shorter than the price series.
    pub fn log_returns(&self) -> Result<ReturnSeries> {
        if self.points.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                stage: "return transformation",
                required: 2,
                actual: self.points.len(),
            });
        }
        let (dates, values) = self
            .points
            .windows(2)
            .map(|w| (w[1].date, 100.0 * (w[1].adj_close / w[0].adj_close).ln()))
            .unzip();
        Ok(ReturnSeries { dates, values })
    }

    /// Price/return rows joined on date; the first price (no return) is dropped.
    pub fn combined(&self, returns: &ReturnSeries) -> Vec<CombinedRow> {
        let mut rows = Vec::with_capacity(returns.len());
        let mut prices = self.points.iter().peekable();
        for (&date, &ret) in returns.dates.iter().zip(&returns.values) {
            while prices.next_if(|p| p.date < date).is_some() {}
            if let Some(p) = prices.next_if(|p| p.date == date) {
                rows.push(CombinedRow { date, adj_close: p.adj_close, log_return_pct: ret });
            }
        }
        rows
    }
}

/// Dated percentage log returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    pub dates:  Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(AnalysisError::InvalidSeries(format!(
                "{} dates for {} returns",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn abs(&self) -> Vec<f64> {
        self.values.iter().map(|r| r.abs()).collect()
    }

    pub fn squared(&self) -> Vec<f64> {
        self.values.iter().map(|r| r * r).collect()
    }

    /// Chronological split: the first `floor(n · fraction)` observations train.
    pub fn split_at_fraction(&self, fraction: f64) -> (ReturnSeries, ReturnSeries) {
        let cut = ((self.len() as f64) * fraction).floor() as usize;
        let cut = cut.min(self.len());
        (
            ReturnSeries { dates: self.dates[..cut].to_vec(), values: self.values[..cut].to_vec() },
            ReturnSeries { dates: self.dates[cut..].to_vec(), values: self.values[cut..].to_vec() },
        )
    }
}

/// One row of the persisted price/return table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub date:           NaiveDate,
    pub adj_close:      f64,
    pub log_return_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint { date: day(i as u32 + 1), adj_close: p })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn returns_are_one_shorter_and_exact() {
        let prices = [100.0, 101.0, 99.5, 102.25, 102.25];
        let r = series(&prices).log_returns().unwrap();
        assert_eq!(r.len(), prices.len() - 1);
        for i in 0..r.len() {
            assert_eq!(r.values[i], 100.0 * (prices[i + 1] / prices[i]).ln());
            assert_eq!(r.dates[i], day(i as u32 + 2));
        }
        assert_eq!(r.values[3], 0.0);
    }

    #[test]
    fn combined_table_drops_first_price_row() {
        let s = series(&[10.0, 11.0, 12.0]);
        let r = s.log_returns().unwrap();
        let rows = s.combined(&r);
        assert_eq!(rows.len(), r.len());
        assert_eq!(rows[0].date, day(2));
        assert_eq!(rows[0].adj_close, 11.0);
        assert_eq!(rows[1].log_return_pct, r.values[1]);
    }

    #[test]
    fn gaps_are_not_filled() {
        let points = vec![
            PricePoint { date: day(2), adj_close: 50.0 },
            PricePoint { date: day(5), adj_close: 55.0 },
        ];
        let r = PriceSeries::new(points).unwrap().log_returns().unwrap();
        assert_eq!(r.dates, vec![day(5)]);
    }

    #[test]
    fn rejects_unordered_and_non_positive() {
        let unordered = vec![
            PricePoint { date: day(3), adj_close: 1.0 },
            PricePoint { date: day(3), adj_close: 1.0 },
        ];
        assert!(matches!(PriceSeries::new(unordered), Err(AnalysisError::InvalidSeries(_))));

        let zero = vec![PricePoint { date: day(1), adj_close: 0.0 }];
        assert!(PriceSeries::new(zero).is_err());
    }

    #[test]
    fn single_price_is_insufficient() {
        let s = series(&[42.0]);
        assert!(matches!(
            s.log_returns(),
            Err(AnalysisError::InsufficientData { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn split_is_chronological() {
        let r = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0])
            .log_returns()
            .unwrap();
        let (train, test) = r.split_at_fraction(0.8);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert!(train.last_date().unwrap() < test.dates[0]);
    }
}
