// driftwatch-core/src/domain/drift/stats.rs

//! Numerical kernels behind the drift tests.
//!
//! Every function here is total on non-empty inputs: degenerate samples
//! (constant columns, a single category) produce a finite statistic instead
//! of NaN. Callers are responsible for rejecting empty samples.

use std::collections::BTreeMap;

const EPS: f64 = 1e-12;
/// Floor applied to empty bins before taking logarithms in PSI.
pub const PSI_FLOOR: f64 = 1e-4;

/// Raw output of a statistical test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: Option<f64>,
}

impl TestOutcome {
    pub fn distance(statistic: f64) -> Self {
        Self {
            statistic,
            p_value: None,
        }
    }

    pub fn with_p_value(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value: Some(p_value.clamp(0.0, 1.0)),
        }
    }

    /// The value compared against the threshold.
    pub fn score(&self) -> f64 {
        self.p_value.unwrap_or(self.statistic)
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

// --- KOLMOGOROV-SMIRNOV ---

/// Two-sample Kolmogorov-Smirnov test.
///
/// The p-value uses the asymptotic Kolmogorov distribution with Stephens'
/// small-sample correction.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> TestOutcome {
    let a = sorted(reference);
    let b = sorted(current);
    let (n, m) = (a.len(), b.len());

    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < n && j < m {
        let x = a[i].min(b[j]);
        while i < n && a[i] <= x {
            i += 1;
        }
        while j < m && b[j] <= x {
            j += 1;
        }
        let gap = (i as f64 / n as f64 - j as f64 / m as f64).abs();
        d = d.max(gap);
    }

    let en = ((n * m) as f64 / (n + m) as f64).sqrt();
    let p = kolmogorov_q((en + 0.12 + 0.11 / en) * d);
    TestOutcome::with_p_value(d, p)
}

/// Complementary CDF of the Kolmogorov distribution.
fn kolmogorov_q(z: f64) -> f64 {
    if z <= 0.0 {
        return 1.0;
    }
    if z < 1.18 {
        let y = (-1.233_700_550_136_169_8 / (z * z)).exp();
        let cdf = 2.256_758_334_191_025 * (-y.ln()).sqrt() * (y + y.powi(9) + y.powi(25) + y.powi(49));
        (1.0 - cdf).clamp(0.0, 1.0)
    } else {
        let x = (-2.0 * z * z).exp();
        (2.0 * (x - x.powi(4) + x.powi(9))).clamp(0.0, 1.0)
    }
}

// --- WASSERSTEIN ---

/// Wasserstein-1 distance between two empirical distributions.
pub fn wasserstein(reference: &[f64], current: &[f64]) -> f64 {
    let a = sorted(reference);
    let b = sorted(current);
    let mut all: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    all.sort_by(f64::total_cmp);

    let (n, m) = (a.len() as f64, b.len() as f64);
    all.windows(2)
        .map(|w| {
            let fa = a.partition_point(|v| *v <= w[0]) as f64 / n;
            let fb = b.partition_point(|v| *v <= w[0]) as f64 / m;
            (fa - fb).abs() * (w[1] - w[0])
        })
        .sum()
}

/// Wasserstein-1 distance in units of the reference standard deviation.
///
/// A constant reference falls back to the pooled standard deviation. When
/// every value on both sides is identical the distance is zero.
pub fn wasserstein_normed(reference: &[f64], current: &[f64]) -> TestOutcome {
    let distance = wasserstein(reference, current);

    let mut scale = std_dev(reference);
    if scale <= EPS {
        let pooled: Vec<f64> = reference.iter().chain(current.iter()).copied().collect();
        scale = std_dev(&pooled);
    }
    if scale <= EPS {
        return TestOutcome::distance(0.0);
    }
    TestOutcome::distance(distance / scale)
}

// --- FREQUENCY TABLES ---

/// Category counts over the union of both samples, in label order.
pub fn frequency_table(reference: &[String], current: &[String]) -> Vec<(String, u64, u64)> {
    let mut table: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for label in reference {
        table.entry(label.as_str()).or_default().0 += 1;
    }
    for label in current {
        table.entry(label.as_str()).or_default().1 += 1;
    }
    table
        .into_iter()
        .map(|(label, (r, c))| (label.to_string(), r, c))
        .collect()
}

/// Relative frequencies of both samples over a shared set of categories.
pub fn category_proportions(reference: &[String], current: &[String]) -> (Vec<f64>, Vec<f64>) {
    let table = frequency_table(reference, current);
    let (n, m) = (reference.len() as f64, current.len() as f64);
    table
        .iter()
        .map(|(_, r, c)| (*r as f64 / n, *c as f64 / m))
        .unzip()
}

/// Equal-width histogram proportions over the combined range of both samples.
pub fn histogram_proportions(
    reference: &[f64],
    current: &[f64],
    bins: usize,
) -> (Vec<f64>, Vec<f64>) {
    let (lo, hi) = reference
        .iter()
        .chain(current.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(*x), hi.max(*x))
        });

    if hi - lo <= EPS || bins < 2 {
        return (vec![1.0], vec![1.0]);
    }

    let width = (hi - lo) / bins as f64;
    let fill = |values: &[f64]| -> Vec<f64> {
        let mut counts = vec![0u64; bins];
        for x in values {
            let idx = (((x - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let total = values.len() as f64;
        counts.into_iter().map(|c| c as f64 / total).collect()
    };

    (fill(reference), fill(current))
}

/// Chi-squared test of homogeneity on a 2 x k contingency table.
pub fn chi_square(reference: &[String], current: &[String]) -> TestOutcome {
    let table = frequency_table(reference, current);
    if table.len() < 2 {
        return TestOutcome::with_p_value(0.0, 1.0);
    }

    let (n_ref, n_cur) = (reference.len() as f64, current.len() as f64);
    let total = n_ref + n_cur;
    let statistic: f64 = table
        .iter()
        .map(|(_, r, c)| {
            let col = (*r + *c) as f64;
            let e_ref = n_ref * col / total;
            let e_cur = n_cur * col / total;
            (*r as f64 - e_ref).powi(2) / e_ref + (*c as f64 - e_cur).powi(2) / e_cur
        })
        .sum();

    let dof = (table.len() - 1) as f64;
    TestOutcome::with_p_value(statistic, gamma_q(dof / 2.0, statistic / 2.0))
}

/// Population stability index between two proportion vectors.
pub fn psi(reference: &[f64], current: &[f64]) -> TestOutcome {
    let value = reference
        .iter()
        .zip(current.iter())
        .map(|(r, c)| {
            let r = r.max(PSI_FLOOR);
            let c = c.max(PSI_FLOOR);
            (c - r) * (c / r).ln()
        })
        .sum();
    TestOutcome::distance(value)
}

/// Jensen-Shannon distance (square root of the divergence, natural log).
pub fn jensen_shannon(reference: &[f64], current: &[f64]) -> TestOutcome {
    let kl = |p: f64, m: f64| if p > 0.0 { p * (p / m).ln() } else { 0.0 };
    let divergence: f64 = reference
        .iter()
        .zip(current.iter())
        .map(|(p, q)| {
            let m = 0.5 * (p + q);
            0.5 * kl(*p, m) + 0.5 * kl(*q, m)
        })
        .sum();
    TestOutcome::distance(divergence.max(0.0).sqrt())
}

// --- SPECIAL FUNCTIONS ---

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS[0], |acc, (i, c)| acc + c / (x + i as f64));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

const GAMMA_ITER: usize = 500;
const GAMMA_EPS: f64 = 1e-14;
const FPMIN: f64 = 1e-300;

/// Regularized upper incomplete gamma function Q(a, x).
pub fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    let value = if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_fraction(a, x)
    };
    value.clamp(0.0, 1.0)
}

fn gamma_prefactor(a: f64, x: f64) -> f64 {
    (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..GAMMA_ITER {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * GAMMA_EPS {
            break;
        }
    }
    sum * gamma_prefactor(a, x)
}

// Modified Lentz evaluation of the continued fraction.
fn gamma_q_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..GAMMA_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    gamma_prefactor(a, x) * h
}
