/// fetch_data.rs — Daily adjusted closes from the Yahoo Finance chart API
///
///   GET {base}/v8/finance/chart/{ticker}
///       ?period1={start}&period2={end + 1 day}&interval=1d&events=div|split
///       &includeAdjustedClose=true
///
/// Transient failures (transport errors, HTTP 429, 5xx) are retried with
/// exponential backoff; an unknown symbol is not.
use chrono::{DateTime, Days, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use garch_engine::data::{PricePoint, PriceSeries};
use garch_engine::{AnalysisError, AppConfig, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) vol_report/0.1";
const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_MAX_MS: u64 = 60_000;
/// Characters of an unparseable body quoted in the error.
const BODY_PREVIEW_CHARS: usize = 120;

// ── Response types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error:  Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code:        String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp:  Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote:    Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// ── Client ────────────────────────────────────────────────────────────────

pub struct YahooDataClient {
    client:      Client,
    base_url:    String,
    max_retries: u32,
}

impl YahooDataClient {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalysisError::Acquisition {
                ticker: cfg.ticker.clone(),
                reason: format!("HTTP client build failed: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: cfg.yahoo_base_url.trim_end_matches('/').to_owned(),
            max_retries: cfg.fetch_max_retries,
        })
    }

    /// Adjusted close for every trading day in [start, end].
    pub async fn fetch_adjusted_close(
        &self,
        ticker: &str,
        start:  NaiveDate,
        end:    NaiveDate,
    ) -> Result<PriceSeries> {
        let mut attempt = 0;
        loop {
            match self.request(ticker, start, end).await {
                Ok(series) => {
                    info!(
                        ticker,
                        bars = series.len(),
                        first = ?series.first_date(),
                        last = ?series.last_date(),
                        "Downloaded daily prices"
                    );
                    return Ok(series);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let wait = backoff_delay(attempt);
                    warn!(ticker, attempt, ?wait, error = %e, "Fetch failed, retrying");
                    sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end + Days::new(1));
        debug!(%url, period1, period2, "Requesting chart");

        let acquisition = |reason: String| AnalysisError::Acquisition {
            ticker: ticker.to_owned(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| acquisition(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(acquisition(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| acquisition(e.to_string()))?;
        if status == StatusCode::NOT_FOUND {
            return Err(AnalysisError::UnknownTicker(ticker.to_owned()));
        }
        if !status.is_success() {
            // Yahoo reports bad symbols inside a 4xx JSON body.
            if let Ok(ChartResponse { chart: Chart { error: Some(err), .. } }) =
                serde_json::from_str::<ChartResponse>(&body)
            {
                debug!(code = %err.code, description = %err.description, "Chart error");
                return Err(AnalysisError::UnknownTicker(ticker.to_owned()));
            }
            return Err(acquisition(format!("HTTP {status}")));
        }

        parse_chart(ticker, &body)
    }
}

/// 1s, 2s, 4s, ... capped at one minute. `attempt` starts at 1.
fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1);
    let ms = if shift >= 16 { BACKOFF_MAX_MS } else { BACKOFF_BASE_MS << shift };
    Duration::from_millis(ms.min(BACKOFF_MAX_MS))
}

fn unix_midnight(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decode a chart payload into a price series. Days with a missing close are
/// dropped, never filled.
pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceSeries> {
    let parsed: ChartResponse = serde_json::from_str(body).map_err(|e| {
        AnalysisError::Acquisition {
            ticker: ticker.to_owned(),
            reason: format!(
                "failed to parse chart payload: {e} (body starts {:?})",
                body.chars().take(BODY_PREVIEW_CHARS).collect::<String>()
            ),
        }
    })?;

    if let Some(err) = parsed.chart.error {
        debug!(code = %err.code, description = %err.description, "Chart error");
        return Err(AnalysisError::UnknownTicker(ticker.to_owned()));
    }
    let result = parsed
        .chart
        .result
        .and_then(|mut r| (!r.is_empty()).then(|| r.swap_remove(0)))
        .ok_or_else(|| AnalysisError::UnknownTicker(ticker.to_owned()))?;

    let closes = match result.indicators.adjclose.into_iter().next() {
        Some(block) => block.adjclose,
        None => {
            warn!(ticker, "No adjusted closes in payload; falling back to raw close");
            result
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default()
        }
    };

    let offset = result.meta.gmtoffset;
    let mut points: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            let adj_close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            Some(PricePoint { date, adj_close })
        })
        .collect();

    // Intraday duplicates of the latest session: keep the last quote per day.
    points.sort_by_key(|p| p.date);
    points.reverse();
    points.dedup_by_key(|p| p.date);
    points.reverse();

    let dropped = result.timestamp.len() - points.len();
    if dropped > 0 {
        debug!(ticker, dropped, "Skipped rows with missing closes or duplicate dates");
    }
    PriceSeries::new(points)
}
