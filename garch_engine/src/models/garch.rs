// models/garch.rs — GARCH(1,1) Maximum Likelihood Estimation
//
// ─────────────────────────────────────────────────────────────────────────
// MATHEMATICAL SPECIFICATION
// ─────────────────────────────────────────────────────────────────────────
//
// GARCH(1,1): Bollerslev (1986)
//
//   Return innovation:  ε_t = r_t − μ        (μ ≡ 0 for the zero-mean model)
//   Conditional variance update:
//
//       σ²_t = ω  +  α · ε²_{t-1}  +  β · σ²_{t-1}
//
//   Constraints (covariance stationarity):
//     ω > 0,  α ≥ 0,  β ≥ 0,  α + β < 1
//
//   Recursion seed (backcast), τ = min(75, n):
//       σ²_0 = ω + (α + β) · b,    b = Σ_{i<τ} w_i ε²_i,   w_i ∝ 0.94^i
//
//   Gaussian log-likelihood:
//       ℓ = −½ Σ_t [ ln 2π + ln σ²_t + ε²_t / σ²_t ]
//
//   Multi-step forecast (h-step ahead, T = last observation):
//       σ²_{T+1} = ω + α·ε²_T + β·σ²_T
//       σ²_{T+h} = ω + (α+β)·σ²_{T+h−1}
//
//   Robust (sandwich) covariance of θ̂:
//       V = H⁻¹ · J · H⁻¹,   H = ∇²(−ℓ),  J = Σ_t ∇ℓ_t ∇ℓ_tᵀ
// ─────────────────────────────────────────────────────────────────────────
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use chrono::NaiveDate;
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, warn};

use crate::data::ReturnSeries;
use crate::error::{AnalysisError, Result};
use crate::linalg::invert;
use crate::stats::{mean, norm_cdf, norm_ppf};

/// Constants for numerical stability and optimisation
const SMALL_POS: f64 = 1e-12;
const LARGE_NUMBER: f64 = 1e12;
const LN_2PI: f64 = 1.837_877_066_409_345_5;

const BACKCAST_WINDOW: usize = 75;
const BACKCAST_DECAY: f64 = 0.94;

const MAX_ITERS: u64 = 10_000;
const SD_TOLERANCE: f64 = 1e-8;

/// Below this mean squared innovation the series is treated as constant.
const DEGENERATE_VARIANCE: f64 = 1e-20;

/// Fewest returns accepted by [`GarchFit::fit`].
pub const MIN_FIT_OBS: usize = 10;

/// Conditional mean model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeanModel {
    /// μ fixed at 0
    Zero,
    /// μ estimated jointly with the variance parameters
    Constant,
}

impl MeanModel {
    fn n_mean_params(self) -> usize {
        match self {
            MeanModel::Zero => 0,
            MeanModel::Constant => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeanModel::Zero => "Zero Mean",
            MeanModel::Constant => "Constant Mean",
        }
    }
}

impl std::str::FromStr for MeanModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(MeanModel::Zero),
            "constant" => Ok(MeanModel::Constant),
            other => Err(format!("unknown mean model '{other}' (expected zero|constant)")),
        }
    }
}

impl std::fmt::Display for MeanModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GarchParams {
    /// μ: conditional mean (0 under the zero-mean model)
    pub mu:    f64,
    /// ω: long-run variance weight
    pub omega: f64,
    /// α: ARCH (shock) coefficient
    pub alpha: f64,
    /// β: GARCH (persistence) coefficient
    pub beta:  f64,
}

impl GarchParams {
    pub fn is_valid(&self) -> bool {
        self.omega > 0.0
            && self.alpha >= 0.0
            && self.beta >= 0.0
            && (self.alpha + self.beta) < 1.0
    }

    /// α + β
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// σ²_∞ = ω / (1 − α − β), if stationary.
    pub fn long_run_variance(&self) -> Option<f64> {
        let p = self.persistence();
        (self.omega > 0.0 && p < 1.0).then(|| self.omega / (1.0 - p))
    }

    fn from_theta(theta: &[f64], mean_model: MeanModel) -> Self {
        match mean_model {
            MeanModel::Zero => Self { mu: 0.0, omega: theta[0], alpha: theta[1], beta: theta[2] },
            MeanModel::Constant => Self { mu: theta[0], omega: theta[1], alpha: theta[2], beta: theta[3] },
        }
    }

    fn to_theta(self, mean_model: MeanModel) -> Vec<f64> {
        match mean_model {
            MeanModel::Zero => vec![self.omega, self.alpha, self.beta],
            MeanModel::Constant => vec![self.mu, self.omega, self.alpha, self.beta],
        }
    }
}

/// Variance recursion state.
#[derive(Debug, Clone)]
pub struct Garch11 {
    pub omega: f64,
    pub alpha: f64,
    pub beta:  f64,
    /// Conditional variance σ²_t of the last processed observation
    pub sigma2: f64,
    /// Squared innovation ε²_t of the last processed observation
    pub prev_eps_sq: f64,
}

impl Garch11 {
    /// Seed both σ² and ε² with the backcast so that σ²_0 = ω + (α+β)·b.
    pub fn new(params: &GarchParams, backcast: f64) -> Self {
        Self {
            omega: params.omega,
            alpha: params.alpha,
            beta: params.beta,
            sigma2: backcast,
            prev_eps_sq: backcast,
        }
    }

    /// Feed innovation ε_t; returns σ²_t (which depends only on t−1 values).
    pub fn update(&mut self, epsilon: f64) -> f64 {
        // σ²_t = ω + α·ε²_{t-1} + β·σ²_{t-1}
        self.sigma2 = self.omega + self.alpha * self.prev_eps_sq + self.beta * self.sigma2;
        self.prev_eps_sq = epsilon * epsilon;
        self.sigma2
    }

    /// Variances for steps 1..=horizon after the last processed observation.
    pub fn forecast_variance(&self, horizon: usize) -> Vec<f64> {
        let persistence = self.alpha + self.beta;
        let mut out = Vec::with_capacity(horizon);
        let mut s2 = self.omega + self.alpha * self.prev_eps_sq + self.beta * self.sigma2;
        for _ in 0..horizon {
            out.push(s2.max(0.0));
            s2 = self.omega + persistence * s2;
        }
        out
    }
}

/// Run GARCH(1,1) over a residual series, return all σ²_t values.
pub fn garch_filter(garch: &mut Garch11, residuals: &[f64]) -> Vec<f64> {
    residuals.iter().map(|&e| garch.update(e)).collect()
}

/// Exponentially weighted mean of the leading squared residuals.
pub fn backcast(residuals: &[f64]) -> f64 {
    let tau = residuals.len().min(BACKCAST_WINDOW);
    if tau == 0 {
        return 0.0;
    }
    let mut weight = 1.0;
    let mut num = 0.0;
    let mut den = 0.0;
    for e in &residuals[..tau] {
        num += weight * e * e;
        den += weight;
        weight *= BACKCAST_DECAY;
    }
    num / den
}

/// Gaussian log-likelihood contributions ℓ_t, or `None` outside the feasible set.
fn observation_loglik(theta: &[f64], returns: &[f64], mean_model: MeanModel, bc: f64) -> Option<Vec<f64>> {
    let params = GarchParams::from_theta(theta, mean_model);
    if !params.is_valid() || !params.mu.is_finite() {
        return None;
    }
    let mut garch = Garch11::new(&params, bc);
    let ll: Vec<f64> = returns
        .iter()
        .map(|r| {
            let e = r - params.mu;
            let s2 = garch.update(e).max(SMALL_POS);
            -0.5 * (LN_2PI + s2.ln() + e * e / s2)
        })
        .collect();
    ll.iter().all(|v| v.is_finite()).then_some(ll)
}

/// Negative log-likelihood objective for Nelder-Mead.
struct GarchLikelihood<'a> {
    returns:    &'a [f64],
    mean_model: MeanModel,
    backcast:   f64,
}

impl GarchLikelihood<'_> {
    fn nll(&self, theta: &[f64]) -> f64 {
        observation_loglik(theta, self.returns, self.mean_model, self.backcast)
            .map(|ll| -ll.iter().sum::<f64>())
            .unwrap_or(LARGE_NUMBER)
    }

    fn contributions(&self, theta: &[f64]) -> Option<Vec<f64>> {
        observation_loglik(theta, self.returns, self.mean_model, self.backcast)
    }
}

impl CostFunction for GarchLikelihood<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> std::result::Result<Self::Output, Error> {
        Ok(self.nll(theta))
    }
}

/// Coarse (α, β) grid with ω targeting the sample variance.
fn starting_values(cost: &GarchLikelihood, mu0: f64, sample_var: f64) -> Vec<f64> {
    const ALPHAS: [f64; 4] = [0.01, 0.05, 0.10, 0.20];
    const PERSISTENCE: [f64; 4] = [0.50, 0.90, 0.95, 0.98];

    let mut best = (f64::INFINITY, Vec::new());
    for &alpha in &ALPHAS {
        for &p in &PERSISTENCE {
            let beta = p - alpha;
            if beta < 0.0 {
                continue;
            }
            let params = GarchParams { mu: mu0, omega: sample_var * (1.0 - p), alpha, beta };
            let theta = params.to_theta(cost.mean_model);
            let nll = cost.nll(&theta);
            if nll < best.0 {
                best = (nll, theta);
            }
        }
    }
    debug!(nll = best.0, theta = ?best.1, "GARCH starting values");
    best.1
}

/// n+1 feasible vertices around θ₀.
fn initial_simplex(theta0: &[f64], mean_model: MeanModel, scale: f64) -> Vec<Vec<f64>> {
    let offset = mean_model.n_mean_params();
    let mut simplex = vec![theta0.to_vec()];
    for i in 0..theta0.len() {
        let mut v = theta0.to_vec();
        match i.checked_sub(offset) {
            None => v[i] += 0.1 * scale,  // mu
            Some(0) => v[i] *= 1.5,       // omega
            Some(1) => {
                // alpha: step up while staying stationary
                let room = 1.0 - v[offset + 1] - v[offset + 2];
                v[i] += (0.5 * room).min(0.03);
            }
            Some(_) => {
                // beta: step down
                v[i] = if v[i] > 0.1 { v[i] - 0.05 } else { v[i] + 0.5 * (1.0 - v[i] - v[offset + 1]) };
            }
        }
        simplex.push(v);
    }
    simplex
}

/// One row of the parameter table.
#[derive(Debug, Clone, Serialize)]
pub struct ParamEstimate {
    pub name:     &'static str,
    pub value:    f64,
    pub std_err:  f64,
    pub t_stat:   f64,
    pub p_value:  f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl ParamEstimate {
    fn new(name: &'static str, value: f64, std_err: f64) -> Self {
        let t_stat = value / std_err;
        let p_value = 2.0 * norm_cdf(-t_stat.abs());
        let z = norm_ppf(0.975);
        Self {
            name,
            value,
            std_err,
            t_stat,
            p_value,
            ci_lower: value - z * std_err,
            ci_upper: value + z * std_err,
        }
    }
}

/// Fitted GARCH(1,1) with in-sample conditional volatility.
#[derive(Debug, Clone)]
pub struct GarchFit {
    pub mean_model:     MeanModel,
    pub params:         GarchParams,
    pub estimates:      Vec<ParamEstimate>,
    pub log_likelihood: f64,
    pub aic:            f64,
    pub bic:            f64,
    pub nobs:           usize,
    pub iterations:     u64,
    pub dates:          Vec<NaiveDate>,
    /// σ_t aligned one-to-one with the training returns
    pub conditional_volatility: Vec<f64>,
    /// Recursion state after the last training observation
    state: Garch11,
}

impl GarchFit {
    /// Maximum likelihood fit. Errors if the optimiser does not converge.
    pub fn fit(returns: &ReturnSeries, mean_model: MeanModel) -> Result<Self> {
        let r = &returns.values;
        let n = r.len();
        if n < MIN_FIT_OBS {
            return Err(AnalysisError::InsufficientData {
                stage: "GARCH fit",
                required: MIN_FIT_OBS,
                actual: n,
            });
        }
        if r.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidSeries(
                "returns contain non-finite values (NaN or Inf)".into(),
            ));
        }

        let mu0 = match mean_model {
            MeanModel::Zero => 0.0,
            MeanModel::Constant => mean(r).unwrap_or(0.0),
        };
        let resid0: Vec<f64> = r.iter().map(|x| x - mu0).collect();
        let sample_var = resid0.iter().map(|e| e * e).sum::<f64>() / n as f64;
        if sample_var < DEGENERATE_VARIANCE {
            warn!(nobs = n, "Return series has no variance; GARCH fit is degenerate");
            return Ok(Self::degenerate(returns, mean_model, mu0));
        }

        let cost = GarchLikelihood { returns: r, mean_model, backcast: backcast(&resid0) };
        let theta0 = starting_values(&cost, mu0, sample_var);
        let simplex = initial_simplex(&theta0, mean_model, sample_var.sqrt());

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(SD_TOLERANCE)
            .map_err(|e| AnalysisError::Convergence(e.to_string()))?;
        let result = Executor::new(
            GarchLikelihood { returns: r, mean_model, backcast: cost.backcast },
            solver,
        )
        .configure(|state| state.max_iters(MAX_ITERS))
        .run()
        .map_err(|e| AnalysisError::Convergence(e.to_string()))?;

        let state = result.state();
        if let Some(TerminationReason::MaxItersReached) = state.get_termination_reason() {
            return Err(AnalysisError::Convergence(format!(
                "Nelder-Mead reached {MAX_ITERS} iterations without meeting tolerance"
            )));
        }
        let iterations = state.get_iter();
        let theta = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| AnalysisError::Convergence("optimiser produced no parameters".into()))?;

        let params = GarchParams::from_theta(&theta, mean_model);
        if !params.is_valid() {
            return Err(AnalysisError::Convergence(format!(
                "invalid parameters: ω={:.6}, α={:.6}, β={:.6}, α+β={:.6}",
                params.omega, params.alpha, params.beta, params.persistence()
            )));
        }

        let log_likelihood = cost
            .contributions(&theta)
            .map(|ll| ll.iter().sum::<f64>())
            .ok_or_else(|| AnalysisError::Convergence("likelihood not finite at optimum".into()))?;

        let std_errs = match robust_covariance(&cost, &theta) {
            Some(cov) => (0..theta.len()).map(|i| cov[[i, i]].max(0.0).sqrt()).collect(),
            None => {
                warn!("Covariance matrix unavailable; standard errors reported as NaN");
                vec![f64::NAN; theta.len()]
            }
        };
        let names: &[&'static str] = match mean_model {
            MeanModel::Zero => &["omega", "alpha[1]", "beta[1]"],
            MeanModel::Constant => &["mu", "omega", "alpha[1]", "beta[1]"],
        };
        let estimates = names
            .iter()
            .zip(theta.iter().zip(&std_errs))
            .map(|(&name, (&v, &se))| ParamEstimate::new(name, v, se))
            .collect();

        let k = theta.len() as f64;
        let residuals: Vec<f64> = r.iter().map(|x| x - params.mu).collect();
        let mut garch = Garch11::new(&params, cost.backcast);
        let conditional_volatility = garch_filter(&mut garch, &residuals)
            .into_iter()
            .map(f64::sqrt)
            .collect();

        debug!(
            omega = params.omega, alpha = params.alpha, beta = params.beta,
            iterations, log_likelihood, "GARCH(1,1) converged"
        );

        Ok(Self {
            mean_model,
            params,
            estimates,
            log_likelihood,
            aic: 2.0 * k - 2.0 * log_likelihood,
            bic: k * (n as f64).ln() - 2.0 * log_likelihood,
            nobs: n,
            iterations,
            dates: returns.dates.clone(),
            conditional_volatility,
            state: garch,
        })
    }

    /// Zero-variance input: ω = α = β = 0 and σ ≡ 0.
    fn degenerate(returns: &ReturnSeries, mean_model: MeanModel, mu: f64) -> Self {
        let params = GarchParams { mu, omega: 0.0, alpha: 0.0, beta: 0.0 };
        let estimates = params
            .to_theta(mean_model)
            .into_iter()
            .zip(match mean_model {
                MeanModel::Zero => vec!["omega", "alpha[1]", "beta[1]"],
                MeanModel::Constant => vec!["mu", "omega", "alpha[1]", "beta[1]"],
            })
            .map(|(v, name)| ParamEstimate::new(name, v, f64::NAN))
            .collect();
        Self {
            mean_model,
            params,
            estimates,
            log_likelihood: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            nobs: returns.len(),
            iterations: 0,
            dates: returns.dates.clone(),
            conditional_volatility: vec![0.0; returns.len()],
            state: Garch11::new(&params, 0.0),
        }
    }

    /// σ_T of the last training observation.
    pub fn latest_volatility(&self) -> f64 {
        self.conditional_volatility.last().copied().unwrap_or(0.0)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Forward variances σ²_{T+1..T+h}.
    pub fn forecast_variance(&self, horizon: usize) -> Vec<f64> {
        self.state.forecast_variance(horizon)
    }
}

/// Sandwich covariance via central finite differences.
fn robust_covariance(cost: &GarchLikelihood, theta: &[f64]) -> Option<Array2<f64>> {
    let k = theta.len();
    let steps: Vec<f64> = theta.iter().map(|t| 1e-4 * t.abs().max(0.1)).collect();
    let shifted = |moves: &[(usize, f64)]| {
        let mut th = theta.to_vec();
        for &(i, d) in moves {
            th[i] += d;
        }
        th
    };

    let mut hessian = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let (hi, hj) = (steps[i], steps[j]);
            let fpp = cost.nll(&shifted(&[(i, hi), (j, hj)]));
            let fpm = cost.nll(&shifted(&[(i, hi), (j, -hj)]));
            let fmp = cost.nll(&shifted(&[(i, -hi), (j, hj)]));
            let fmm = cost.nll(&shifted(&[(i, -hi), (j, -hj)]));
            if [fpp, fpm, fmp, fmm].iter().any(|&f| f >= LARGE_NUMBER) {
                debug!(param = i, "Hessian step left the feasible region");
                return None;
            }
            let h = (fpp - fpm - fmp + fmm) / (4.0 * hi * hj);
            hessian[[i, j]] = h;
            hessian[[j, i]] = h;
        }
    }

    let mut scores: Vec<Vec<f64>> = Vec::with_capacity(k);
    for i in 0..k {
        let up = cost.contributions(&shifted(&[(i, steps[i])]))?;
        let down = cost.contributions(&shifted(&[(i, -steps[i])]))?;
        scores.push(up.iter().zip(&down).map(|(u, d)| (u - d) / (2.0 * steps[i])).collect());
    }
    let mut opg = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let s: f64 = scores[i].iter().zip(&scores[j]).map(|(a, b)| a * b).sum();
            opg[[i, j]] = s;
            opg[[j, i]] = s;
        }
    }

    let h_inv = invert(&hessian)?;
    Some(h_inv.dot(&opg).dot(&h_inv))
}

impl std::fmt::Display for GarchFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);
        writeln!(f, "{:^78}", format!("{} - GARCH Model Results", self.mean_model))?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17.3}", "Dep. Variable:", "Log_Returns_Pct", "Log-Likelihood:", self.log_likelihood)?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17.3}", "Mean Model:", self.mean_model.label(), "AIC:", self.aic)?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17.3}", "Vol Model:", "GARCH", "BIC:", self.bic)?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17}", "Distribution:", "Normal", "No. Observations:", self.nobs)?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17}", "Method:", "Maximum Likelihood", "Iterations:", self.iterations)?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<10}{:>12}{:>12}{:>10}{:>12}   {:^21}",
            "", "coef", "std err", "t", "P>|t|", "95.0% Conf. Int."
        )?;
        writeln!(f, "{thin}")?;
        for e in &self.estimates {
            writeln!(
                f,
                "{:<10}{:>12.4}{:>12.3e}{:>10.3}{:>12.3e}   [{:.3e},{:.3e}]",
                e.name, e.value, e.std_err, e.t_stat, e.p_value, e.ci_lower, e.ci_upper
            )?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Persistence (α+β): {:.4}   Long-run variance: {}",
            self.params.persistence(),
            self.params
                .long_run_variance()
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| "n/a".into())
        )?;
        write!(f, "Covariance estimator: robust")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::Normal;

    /// Simulate r_t = σ_t·z_t from a known GARCH(1,1), discarding a burn-in.
    fn simulate(omega: f64, alpha: f64, beta: f64, n: usize, seed: u64) -> ReturnSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        let z = Normal::new(0.0, 1.0).unwrap();
        let burn = 500;
        let mut sigma2 = omega / (1.0 - alpha - beta);
        let mut prev = 0.0f64;
        let mut values = Vec::with_capacity(n);
        for t in 0..n + burn {
            sigma2 = omega + alpha * prev * prev + beta * sigma2;
            prev = sigma2.sqrt() * z.sample(&mut rng);
            if t >= burn {
                values.push(prev);
            }
        }
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..n).map(|i| start + chrono::Days::new(i as u64)).collect();
        ReturnSeries::new(dates, values).unwrap()
    }

    #[test]
    fn garch_update_monotonic() {
        let p = GarchParams { mu: 0.0, omega: 0.01, alpha: 0.10, beta: 0.85 };
        let mut g = Garch11::new(&p, 0.2);
        g.update(5.0); // large shock enters σ² one step later
        let after_shock = g.update(0.0);
        let after_calm = g.update(0.0);
        assert!(after_shock > after_calm);
    }

    #[test]
    fn forecast_reverts_to_long_run_variance() {
        let p = GarchParams { mu: 0.0, omega: 0.01, alpha: 0.10, beta: 0.85 };
        let mut g = Garch11::new(&p, 2.0);
        garch_filter(&mut g, &[3.0, -2.5, 4.0]);
        let path = g.forecast_variance(2000);
        assert_eq!(path.len(), 2000);
        let longrun = p.long_run_variance().unwrap();
        assert!((path[1999] - longrun).abs() < 1e-9);
        assert!(path.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn backcast_weights_early_observations_most() {
        assert_eq!(backcast(&[]), 0.0);
        assert!((backcast(&[2.0; 100]) - 4.0).abs() < 1e-12);
        let early_shock = backcast(&[3.0, 0.0, 0.0]);
        let late_shock = backcast(&[0.0, 0.0, 3.0]);
        assert!(early_shock > late_shock);
    }

    #[test]
    fn mean_model_parses() {
        assert_eq!("zero".parse::<MeanModel>(), Ok(MeanModel::Zero));
        assert_eq!("Constant".parse::<MeanModel>(), Ok(MeanModel::Constant));
        assert!("ar1".parse::<MeanModel>().is_err());
    }

    #[test]
    fn recovers_known_parameters() {
        let (omega, alpha, beta) = (0.01, 0.10, 0.85);
        let n = 4000;
        let fits: Vec<GarchFit> = (1..=4)
            .map(|seed| GarchFit::fit(&simulate(omega, alpha, beta, n, seed), MeanModel::Zero).unwrap())
            .collect();

        let avg = |f: fn(&GarchParams) -> f64| fits.iter().map(|g| f(&g.params)).sum::<f64>() / 4.0;
        let a = avg(|p| p.alpha);
        let b = avg(|p| p.beta);
        let w = avg(|p| p.omega);

        assert!((a - alpha).abs() <= 0.3 * alpha, "alpha = {a}");
        assert!((b - beta).abs() <= 0.3 * beta, "beta = {b}");
        assert!((w - omega).abs() <= 0.3 * omega, "omega = {w}");
        for g in &fits {
            assert!(g.params.is_valid());
            assert_eq!(g.conditional_volatility.len(), n);
            assert!(g.log_likelihood.is_finite());
        }
    }

    #[test]
    fn fit_reports_standard_errors_and_summary() {
        let fit = GarchFit::fit(&simulate(0.05, 0.08, 0.9, 1500, 42), MeanModel::Zero).unwrap();
        assert_eq!(fit.estimates.len(), 3);
        for e in &fit.estimates {
            assert!(e.std_err.is_finite() && e.std_err > 0.0, "{}: {}", e.name, e.std_err);
            assert!(e.ci_lower < e.value && e.value < e.ci_upper);
        }
        assert!(fit.aic > -2.0 * fit.log_likelihood);
        let summary = fit.to_string();
        assert!(summary.contains("Zero Mean - GARCH Model Results"));
        assert!(summary.contains("beta[1]"));
    }

    #[test]
    fn constant_mean_estimates_drift() {
        let base = simulate(0.05, 0.08, 0.9, 1500, 3);
        let shifted = ReturnSeries::new(
            base.dates.clone(),
            base.values.iter().map(|r| r + 0.5).collect(),
        )
        .unwrap();
        let fit = GarchFit::fit(&shifted, MeanModel::Constant).unwrap();
        assert_eq!(fit.estimates[0].name, "mu");
        assert!((fit.params.mu - 0.5).abs() < 0.15, "mu = {}", fit.params.mu);
    }

    #[test]
    fn constant_series_gives_degenerate_fit() {
        let dates = (0..50)
            .map(|i| NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + chrono::Days::new(i))
            .collect();
        let flat = ReturnSeries::new(dates, vec![0.0; 50]).unwrap();
        let fit = GarchFit::fit(&flat, MeanModel::Zero).unwrap();
        assert_eq!(fit.params.alpha, 0.0);
        assert_eq!(fit.params.beta, 0.0);
        assert_eq!(fit.latest_volatility(), 0.0);
        let path = fit.forecast_variance(30);
        assert_eq!(path.len(), 30);
        assert!(path.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn too_few_observations_is_an_error() {
        let dates = (0..5)
            .map(|i| NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + chrono::Days::new(i))
            .collect();
        let short = ReturnSeries::new(dates, vec![1.0, -1.0, 0.5, 0.2, -0.3]).unwrap();
        assert!(matches!(
            GarchFit::fit(&short, MeanModel::Zero),
            Err(AnalysisError::InsufficientData { required: MIN_FIT_OBS, .. })
        ));
    }
}
