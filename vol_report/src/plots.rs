/// plots.rs — PNG charts for the volatility report
///
///   01_eda_volatility_clustering.png  histogram+KDE, r_t, |r_t|, ACF(r²)
///   02_fitted_volatility.png          |r_t| vs fitted σ_t
///   03_volatility_forecast.png        last 200 σ_t + H-step forecast
///   04_forecast_evaluation.png        realised |r| vs out-of-sample forecast
///
/// Dates are plotted as day numbers (days from CE) and labelled back as
/// YYYY-MM-DD.
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

use garch_engine::stats::gaussian_kde;
use garch_engine::{AnalysisError, AnalysisReport, Result};

pub const EDA_PLOT: &str = "01_eda_volatility_clustering.png";
pub const FITTED_PLOT: &str = "02_fitted_volatility.png";
pub const FORECAST_PLOT: &str = "03_volatility_forecast.png";
pub const EVALUATION_PLOT: &str = "04_forecast_evaluation.png";

const HISTORY_TAIL: usize = 200;
const HIST_BINS: usize = 100;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_RED: RGBColor = RGBColor(139, 0, 0);
const GRAY: RGBColor = RGBColor(128, 128, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const GREEN_DARK: RGBColor = RGBColor(0, 128, 0);

type DrawResult = std::result::Result<(), Box<dyn Error>>;

fn day_number(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

fn day_label(x: &f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// (min, max) with a little headroom; degenerate ranges are widened.
fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-12 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

fn persist(path: &Path, result: DrawResult) -> Result<()> {
    result.map_err(|e| AnalysisError::persistence(path, e))?;
    info!(path = %path.display(), "Saved chart");
    Ok(())
}

/// Draw all four charts into `dir`. Each chart reports its own outcome.
pub fn render_all(report: &AnalysisReport, dir: &Path) -> Vec<(PathBuf, Result<()>)> {
    let charts: [(&str, fn(&AnalysisReport, &Path) -> DrawResult); 4] = [
        (EDA_PLOT, draw_eda),
        (FITTED_PLOT, draw_fitted),
        (FORECAST_PLOT, draw_forecast),
        (EVALUATION_PLOT, draw_evaluation),
    ];
    if let Err(e) = std::fs::create_dir_all(dir) {
        return charts
            .iter()
            .map(|(name, _)| (dir.join(name), Err(AnalysisError::persistence(dir, &e))))
            .collect();
    }
    charts
        .iter()
        .map(|(name, draw)| {
            let path = dir.join(name);
            let outcome = persist(&path, draw(report, &path));
            (path, outcome)
        })
        .collect()
}

// ── 01: EDA grid ──────────────────────────────────────────────────────────

fn draw_eda(report: &AnalysisReport, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let r = &report.returns;
    draw_histogram(&panels[0], &r.values)?;

    let x: Vec<f64> = r.dates.iter().map(|&d| day_number(d)).collect();
    draw_dated_line(
        &panels[1],
        "Daily Log Returns (Volatility Clustering Visible)",
        "Log Returns (%)",
        &x,
        &r.values,
        BLUE,
    )?;
    draw_dated_line(
        &panels[2],
        "Absolute Returns (Clear Volatility Clustering)",
        "|Log Returns| (%)",
        &x,
        &r.abs(),
        PURPLE,
    )?;
    draw_acf(&panels[3], &report.sq_acf, r.len())?;

    root.present()?;
    Ok(())
}

fn draw_histogram(area: &DrawingArea<BitMapBackend, Shift>, values: &[f64]) -> DrawResult {
    let (lo, hi) = span(values.iter().copied());
    let width = (hi - lo) / HIST_BINS as f64;
    let mut counts = vec![0usize; HIST_BINS];
    for &v in values {
        let i = (((v - lo) / width) as usize).min(HIST_BINS - 1);
        counts[i] += 1;
    }
    let n = values.len().max(1) as f64;
    let density: Vec<f64> = counts.iter().map(|&c| c as f64 / (n * width)).collect();
    let kde = gaussian_kde(values, 400);
    let (_, y_max) = span(density.iter().copied().chain(kde.iter().map(|p| p.1)).chain([0.0]));

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of Log Returns", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;
    chart.configure_mesh().x_desc("Log Returns (%)").y_desc("Density").draw()?;

    chart.draw_series(density.iter().enumerate().map(|(i, &d)| {
        let x0 = lo + i as f64 * width;
        Rectangle::new([(x0, 0.0), (x0 + width, d)], SKY_BLUE.mix(0.8).filled())
    }))?;
    chart.draw_series(LineSeries::new(kde, BLUE.stroke_width(2)))?;
    Ok(())
}

fn draw_dated_line(
    area:   &DrawingArea<BitMapBackend, Shift>,
    title:  &str,
    y_desc: &str,
    x:      &[f64],
    y:      &[f64],
    color:  RGBColor,
) -> DrawResult {
    let (x0, x1) = span(x.iter().copied());
    let (y0, y1) = span(y.iter().copied());
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;
    chart
        .configure_mesh()
        .x_labels(5)
        .x_label_formatter(&day_label)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(LineSeries::new(x.iter().copied().zip(y.iter().copied()), &color))?;
    Ok(())
}

fn draw_acf(area: &DrawingArea<BitMapBackend, Shift>, acf: &[f64], n: usize) -> DrawResult {
    let band = 1.96 / (n.max(1) as f64).sqrt();
    let (y0, _) = span(acf.iter().copied().chain([-band, 0.0]));
    let lags = acf.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("ACF of Squared Returns", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..lags - 0.5, y0..1.05)?;
    chart.configure_mesh().x_desc("Lag").draw()?;

    chart.draw_series(acf.iter().enumerate().map(|(k, &rho)| {
        let k = k as f64;
        Rectangle::new([(k - 0.15, 0.0), (k + 0.15, rho)], DARK_RED.filled())
    }))?;
    for level in [band, -band] {
        chart.draw_series(LineSeries::new(
            [(-0.5, level), (lags - 0.5, level)],
            SKY_BLUE.stroke_width(1),
        ))?;
    }
    chart.draw_series(LineSeries::new([(-0.5, 0.0), (lags - 0.5, 0.0)], &BLACK))?;
    Ok(())
}

// ── 02–04: overlays ───────────────────────────────────────────────────────

struct Overlay<'a> {
    label: &'a str,
    x:     Vec<f64>,
    y:     Vec<f64>,
    style: ShapeStyle,
}

fn draw_overlay(path: &Path, title: &str, y_desc: &str, series: &[Overlay]) -> DrawResult {
    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = span(series.iter().flat_map(|s| s.x.iter().copied()));
    let (_, y1) = span(series.iter().flat_map(|s| s.y.iter().copied()).chain([0.0]));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, 0.0..y1)?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&day_label)
        .y_desc(y_desc)
        .draw()?;

    for s in series {
        let style = s.style;
        chart
            .draw_series(LineSeries::new(
                s.x.iter().copied().zip(s.y.iter().copied()),
                style,
            ))?
            .label(s.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_fitted(report: &AnalysisReport, path: &Path) -> DrawResult {
    let x: Vec<f64> = report.returns.dates.iter().map(|&d| day_number(d)).collect();
    draw_overlay(
        path,
        &format!("{} - GARCH(1,1) Fitted Conditional Volatility", report.ticker),
        "Volatility (%)",
        &[
            Overlay {
                label: "Absolute Returns",
                x: x.clone(),
                y: report.returns.abs(),
                style: GRAY.mix(0.6).stroke_width(1),
            },
            Overlay {
                label: "GARCH(1,1) Conditional Volatility",
                x,
                y: report.fit.conditional_volatility.clone(),
                style: RED.stroke_width(2),
            },
        ],
    )
}

fn draw_forecast(report: &AnalysisReport, path: &Path) -> DrawResult {
    let fit = &report.fit;
    let tail = fit.conditional_volatility.len().saturating_sub(HISTORY_TAIL);
    draw_overlay(
        path,
        &format!("{} - {}-Day Volatility Forecast", report.ticker, report.forecast.len()),
        "Forecasted Volatility (%)",
        &[
            Overlay {
                label: "Historical Conditional Volatility",
                x: fit.dates[tail..].iter().map(|&d| day_number(d)).collect(),
                y: fit.conditional_volatility[tail..].to_vec(),
                style: BLUE.stroke_width(1),
            },
            Overlay {
                label: "GARCH Forecast",
                x: report.forecast.dates.iter().map(|&d| day_number(d)).collect(),
                y: report.forecast.volatility.clone(),
                style: ORANGE.stroke_width(2),
            },
        ],
    )
}

fn draw_evaluation(report: &AnalysisReport, path: &Path) -> DrawResult {
    let ev = &report.evaluation;
    let x: Vec<f64> = ev.dates.iter().map(|&d| day_number(d)).collect();
    draw_overlay(
        path,
        "Out-of-Sample Volatility Forecast Evaluation",
        "Volatility (%)",
        &[
            Overlay {
                label: "Realized |Returns|",
                x: x.clone(),
                y: ev.realized_abs.clone(),
                style: GRAY.mix(0.7).stroke_width(1),
            },
            Overlay {
                label: "Rolling GARCH Forecast",
                x,
                y: ev.forecast_vol.clone(),
                style: GREEN_DARK.stroke_width(2),
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_pads_and_widens() {
        assert_eq!(span([2.0, 2.0].into_iter()), (1.0, 3.0));
        assert_eq!(span(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = span([0.0, 10.0, f64::NAN].into_iter());
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn day_numbers_round_trip_to_labels() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(day_label(&day_number(d)), "2025-12-31");
    }
}
