use ace_core::errors::{AceError, ErrorInfo};
use ace_core::{Configuration, EffectEstimate, Estimator, RngHandle, SampleView};
use rand::Rng;

/// Critical value for the 95% confidence interval.
const Z_CRIT: f64 = 1.959_963_984_540_054;

/// Minimum number of records the estimator accepts after filtering.
const MIN_RECORDS: usize = 8;

/// Bootstrap-resampling difference-in-means estimator.
///
/// Each trial draws a seeded bootstrap resample of the working sample and
/// computes an adjusted difference of arm means. The active components of the
/// configuration toggle individual refinements; an unrecognised component name
/// is an estimation error, surfaced per trial rather than aborting the sweep.
#[derive(Debug, Clone, Default)]
pub struct ResamplingEstimator;

impl ResamplingEstimator {
    /// Creates the estimator.
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for ResamplingEstimator {
    fn estimate(
        &self,
        sample: SampleView<'_>,
        config: &Configuration,
        seed: u64,
    ) -> Result<EffectEstimate, AceError> {
        for component in &config.components {
            if !KNOWN_COMPONENTS.contains(&component.as_str()) {
                return Err(AceError::Estimator(
                    ErrorInfo::new("unknown-component", "component not recognised")
                        .with_context("component", component.clone())
                        .with_context("config", config.id()),
                ));
            }
        }
        if sample.len() < MIN_RECORDS {
            return Err(AceError::Estimator(
                ErrorInfo::new("sample-too-small", "not enough records to resample")
                    .with_context("n", sample.len().to_string()),
            ));
        }

        let mut rng = RngHandle::from_seed(seed);
        let n = sample.len();
        let mut y = Vec::with_capacity(n);
        let mut t = Vec::with_capacity(n);
        let mut x1 = Vec::with_capacity(n);
        let mut x2 = Vec::with_capacity(n);
        for _ in 0..n {
            let row = rng.inner_mut().gen_range(0..n);
            y.push(sample.outcome[row]);
            t.push(sample.treatment[row]);
            x1.push(sample.covariates[0][row]);
            x2.push(sample.covariates[1][row]);
        }

        let has = |name: &str| config.components.iter().any(|c| c == name);

        if has("trim") {
            apply_trim(&mut y, &mut t, &mut x1, &mut x2)?;
        }
        if has("winsor") {
            apply_winsor(&mut y);
        }

        let (estimate, variance) = if has("crossfit") {
            crossfit_estimate(&y, &t, &x1, &x2, has("stabilize"), has("adjust"))?
        } else {
            point_estimate(&y, &t, &x1, &x2, has("stabilize"), has("adjust"))?
        };

        if !estimate.is_finite() || !variance.is_finite() || variance < 0.0 {
            return Err(AceError::Estimator(
                ErrorInfo::new("estimator-diverged", "non-finite estimate or variance")
                    .with_context("config", config.id())
                    .with_context("seed", seed.to_string()),
            ));
        }

        let se = variance.sqrt();
        let z = if se > 0.0 { estimate / se } else { 0.0 };
        Ok(EffectEstimate {
            estimate,
            variance,
            ci_lower: estimate - Z_CRIT * se,
            ci_upper: estimate + Z_CRIT * se,
            p_value: 2.0 * normal_sf(z.abs()),
        })
    }
}

/// Component names the reference estimator understands.
pub const KNOWN_COMPONENTS: [&str; 5] = ["trim", "winsor", "stabilize", "crossfit", "adjust"];

fn apply_trim(
    y: &mut Vec<f64>,
    t: &mut Vec<bool>,
    x1: &mut Vec<f64>,
    x2: &mut Vec<f64>,
) -> Result<(), AceError> {
    let lower = quantile(y, 0.02);
    let upper = quantile(y, 0.98);
    let keep: Vec<bool> = y.iter().map(|&v| v >= lower && v <= upper).collect();
    retain_by_mask(y, &keep);
    retain_by_mask(t, &keep);
    retain_by_mask(x1, &keep);
    retain_by_mask(x2, &keep);
    if y.len() < MIN_RECORDS {
        return Err(AceError::Estimator(
            ErrorInfo::new("trim-degenerate", "trimming removed too many records")
                .with_context("remaining", y.len().to_string()),
        ));
    }
    Ok(())
}

fn apply_winsor(y: &mut [f64]) {
    let lower = quantile(y, 0.01);
    let upper = quantile(y, 0.99);
    for value in y.iter_mut() {
        *value = value.clamp(lower, upper);
    }
}

fn retain_by_mask<T: Copy>(values: &mut Vec<T>, keep: &[bool]) {
    let mut index = 0;
    values.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
}

fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let position = (q * (sorted.len() - 1) as f64).round() as usize;
    sorted[position.min(sorted.len() - 1)]
}

struct ArmStats {
    mean_t: f64,
    mean_c: f64,
    var_t: f64,
    var_c: f64,
    n_t: usize,
    n_c: usize,
}

fn arm_stats(y: &[f64], t: &[bool]) -> Result<ArmStats, AceError> {
    let mut sum_t = 0.0;
    let mut sum_c = 0.0;
    let mut n_t = 0usize;
    let mut n_c = 0usize;
    for (&value, &treated) in y.iter().zip(t.iter()) {
        if treated {
            sum_t += value;
            n_t += 1;
        } else {
            sum_c += value;
            n_c += 1;
        }
    }
    if n_t < 2 || n_c < 2 {
        return Err(AceError::Estimator(
            ErrorInfo::new("arm-degenerate", "resample lost a treatment arm")
                .with_context("treated", n_t.to_string())
                .with_context("control", n_c.to_string()),
        ));
    }
    let mean_t = sum_t / n_t as f64;
    let mean_c = sum_c / n_c as f64;
    let mut ss_t = 0.0;
    let mut ss_c = 0.0;
    for (&value, &treated) in y.iter().zip(t.iter()) {
        if treated {
            ss_t += (value - mean_t).powi(2);
        } else {
            ss_c += (value - mean_c).powi(2);
        }
    }
    Ok(ArmStats {
        mean_t,
        mean_c,
        var_t: ss_t / (n_t - 1) as f64,
        var_c: ss_c / (n_c - 1) as f64,
        n_t,
        n_c,
    })
}

fn arm_mean_gap(values: &[f64], t: &[bool]) -> f64 {
    let mut sum_t = 0.0;
    let mut sum_c = 0.0;
    let mut n_t = 0usize;
    let mut n_c = 0usize;
    for (&value, &treated) in values.iter().zip(t.iter()) {
        if treated {
            sum_t += value;
            n_t += 1;
        } else {
            sum_c += value;
            n_c += 1;
        }
    }
    if n_t == 0 || n_c == 0 {
        return 0.0;
    }
    sum_t / n_t as f64 - sum_c / n_c as f64
}

fn point_estimate(
    y: &[f64],
    t: &[bool],
    x1: &[f64],
    x2: &[f64],
    stabilize: bool,
    adjust: bool,
) -> Result<(f64, f64), AceError> {
    let stats = arm_stats(y, t)?;
    let mut mean_t = stats.mean_t;
    let mut mean_c = stats.mean_c;
    if stabilize {
        let pooled = (stats.mean_t * stats.n_t as f64 + stats.mean_c * stats.n_c as f64)
            / (stats.n_t + stats.n_c) as f64;
        mean_t -= (mean_t - pooled) / (stats.n_t as f64).sqrt();
        mean_c -= (mean_c - pooled) / (stats.n_c as f64).sqrt();
    }
    let mut estimate = mean_t - mean_c;
    if adjust {
        // Imbalance correction with the known control-surface coefficients.
        estimate -= 0.8 * arm_mean_gap(x1, t) + 0.5 * arm_mean_gap(x2, t);
    }
    let variance = stats.var_t / stats.n_t as f64 + stats.var_c / stats.n_c as f64;
    Ok((estimate, variance))
}

fn crossfit_estimate(
    y: &[f64],
    t: &[bool],
    x1: &[f64],
    x2: &[f64],
    stabilize: bool,
    adjust: bool,
) -> Result<(f64, f64), AceError> {
    let split = |fold: usize| {
        let pick = |src: &[f64]| -> Vec<f64> {
            src.iter()
                .enumerate()
                .filter(|(i, _)| i % 2 == fold)
                .map(|(_, &v)| v)
                .collect()
        };
        let t_fold: Vec<bool> = t
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == fold)
            .map(|(_, &v)| v)
            .collect();
        (pick(y), t_fold, pick(x1), pick(x2))
    };
    let (y_a, t_a, x1_a, x2_a) = split(0);
    let (y_b, t_b, x1_b, x2_b) = split(1);
    let (est_a, var_a) = point_estimate(&y_a, &t_a, &x1_a, &x2_a, stabilize, adjust)?;
    let (est_b, var_b) = point_estimate(&y_b, &t_b, &x1_b, &x2_b, stabilize, adjust)?;
    Ok(((est_a + est_b) / 2.0, (var_a + var_b) / 4.0))
}

/// Standard normal survival function via the Abramowitz-Stegun erf
/// approximation (maximum absolute error ~1.5e-7).
fn normal_sf(z: f64) -> f64 {
    let x = z / std::f64::consts::SQRT_2;
    0.5 * erfc(x)
}

fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    poly * (-x * x).exp()
}
