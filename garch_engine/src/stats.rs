/// stats.rs — Descriptive statistics and sample diagnostics
///
/// ─────────────────────────────────────────────────────────────────────────
///   mean      x̄ = Σ x_i / n
///   std       s = √( Σ (x_i − x̄)² / (n − 1) )
///   skewness  g₁ = m₃ / m₂^{3/2}
///   kurtosis  g₂ = m₄ / m₂² − 3          (excess)
///   quantile  linear interpolation between order statistics at (n−1)·q
///   ACF       ρ_k = Σ_{t>k} (x_t − x̄)(x_{t−k} − x̄) / Σ (x_t − x̄)²
///   KDE       f̂(x) = 1/(n·h) Σ φ((x − x_i)/h),  h = s · n^{−1/5}  (Scott)
/// ─────────────────────────────────────────────────────────────────────────
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance (n − 1 denominator); 0 for fewer than two points.
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = data.iter().sum::<f64>() / data.len() as f64;
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Quantile `q ∈ [0, 1]` with linear interpolation (NumPy's default).
pub fn quantile(data: &[f64], q: f64) -> Option<f64> {
    if data.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(quantile_sorted(&sorted, q))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Summary block equivalent to a data-frame `describe()`.
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    pub count:    usize,
    pub mean:     f64,
    pub std:      f64,
    pub min:      f64,
    pub q25:      f64,
    pub median:   f64,
    pub q75:      f64,
    pub max:      f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Describe {
    pub fn of(data: &[f64]) -> Option<Self> {
        let m = mean(data)?;
        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = data.len() as f64;
        let m2 = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
        let m3 = data.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
        let m4 = data.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
        let (skewness, kurtosis) = if m2 > 0.0 {
            (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
        } else {
            (0.0, 0.0)
        };

        Some(Self {
            count: data.len(),
            mean: m,
            std: std_dev(data),
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.50),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            skewness,
            kurtosis,
        })
    }
}

impl std::fmt::Display for Describe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  count    : {}", self.count)?;
        writeln!(f, "  mean     : {:.6}", self.mean)?;
        writeln!(f, "  std      : {:.6}", self.std)?;
        writeln!(f, "  min      : {:.6}", self.min)?;
        writeln!(f, "  25%      : {:.6}", self.q25)?;
        writeln!(f, "  50%      : {:.6}", self.median)?;
        writeln!(f, "  75%      : {:.6}", self.q75)?;
        writeln!(f, "  max      : {:.6}", self.max)?;
        writeln!(f, "  skewness : {:.4}", self.skewness)?;
        write!(f, "  kurtosis : {:.4} (excess)", self.kurtosis)
    }
}

/// Sample autocorrelations for lags 0..=max_lag.
///
/// A constant series has no defined ACF beyond lag 0; those lags are 0.
pub fn acf(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    let Some(m) = mean(data) else {
        return Vec::new();
    };
    let denom: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    let max_lag = max_lag.min(n.saturating_sub(1));

    (0..=max_lag)
        .map(|k| {
            if k == 0 {
                return 1.0;
            }
            if denom <= 0.0 {
                return 0.0;
            }
            let num: f64 = (k..n).map(|t| (data[t] - m) * (data[t - k] - m)).sum();
            num / denom
        })
        .collect()
}

/// Gaussian kernel density estimate on `points` evenly spaced grid values
/// spanning the sample range. Returns (x, density) pairs.
pub fn gaussian_kde(data: &[f64], points: usize) -> Vec<(f64, f64)> {
    let n = data.len();
    let s = std_dev(data);
    if n < 2 || s <= 0.0 || points < 2 {
        return Vec::new();
    }
    let h = s * (n as f64).powf(-0.2);
    let lo = data.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * h;
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * h;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n as f64 * h * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density = data
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / h).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}

/// Standard normal CDF Φ(x).
pub fn norm_cdf(x: f64) -> f64 {
    Normal::new(0.0, 1.0).map(|n| n.cdf(x)).unwrap_or(f64::NAN)
}

/// Standard normal inverse CDF Φ⁻¹(p).
pub fn norm_ppf(p: f64) -> f64 {
    Normal::new(0.0, 1.0).map(|n| n.inverse_cdf(p)).unwrap_or(f64::NAN)
}

/// Root mean squared error over paired observations.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return None;
    }
    let sse: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum();
    Some((sse / n as f64).sqrt())
}

/// Mean absolute error over paired observations.
pub fn mae(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return None;
    }
    let sae: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).abs()).sum();
    Some(sae / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let data = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(quantile(&data, 0.5), Some(3.0));
        assert_eq!(quantile(&data, 0.0), Some(1.0));
        assert_eq!(quantile(&data, 1.0), Some(5.0));
        // pos = 4 · 0.05 = 0.2 → 1 + 0.2·(2 − 1)
        assert!((quantile(&data, 0.05).unwrap() - 1.2).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&data, 1.5), None);
    }

    #[test]
    fn describe_matches_hand_computation() {
        let d = Describe::of(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(d.count, 4);
        assert!((d.mean - 2.5).abs() < 1e-12);
        assert!((d.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((d.q25 - 1.75).abs() < 1e-12);
        assert!((d.median - 2.5).abs() < 1e-12);
        assert!((d.q75 - 3.25).abs() < 1e-12);
        assert!(d.skewness.abs() < 1e-12);
        assert!(Describe::of(&[]).is_none());
    }

    #[test]
    fn acf_of_alternating_series_is_negative_at_lag_one() {
        let data: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let rho = acf(&data, 2);
        assert_eq!(rho.len(), 3);
        assert_eq!(rho[0], 1.0);
        assert!(rho[1] < -0.95);
        assert!(rho[2] > 0.95);
    }

    #[test]
    fn acf_of_constant_series_is_zero_beyond_lag_zero() {
        let rho = acf(&[2.0; 10], 3);
        assert_eq!(rho, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn kde_integrates_to_roughly_one() {
        let data: Vec<f64> = (0..200).map(|i| ((i as f64) * 0.37).sin()).collect();
        let grid = gaussian_kde(&data, 400);
        let step = grid[1].0 - grid[0].0;
        let area: f64 = grid.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 0.02, "area = {area}");
        assert!(gaussian_kde(&[1.0; 5], 10).is_empty());
    }

    #[test]
    fn normal_quantiles() {
        assert!((norm_ppf(0.05) + 1.6448536269514722).abs() < 1e-6);
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((norm_cdf(norm_ppf(0.975)) - 0.975).abs() < 1e-9);
    }

    #[test]
    fn error_metrics() {
        let p = [1.0, 2.0, 3.0];
        let a = [1.0, 4.0, 0.0];
        assert!((rmse(&p, &a).unwrap() - (13.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((mae(&p, &a).unwrap() - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(rmse(&[], &[]), None);
    }
}
