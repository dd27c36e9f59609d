use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrangerResult {
    /// Improvement in one-step-ahead predictive fit when the source's past
    /// is added to the target's own past.
    pub delta_r2: f64,
    /// Permutation p-value for the improvement.
    pub p_value: f64,
}

/// R-squared of an OLS fit of `y` on `x` (plus intercept), solving the
/// normal equations by Gaussian elimination with partial pivoting.
pub fn ols_r2(y: &[f64], x: &[Vec<f64>]) -> f64 {
    let n = y.len();
    let p = x.first().map(|row| row.len()).unwrap_or(0);
    let k = p + 1;

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for i in 0..n {
        let mut xi = Vec::with_capacity(k);
        xi.push(1.0);
        xi.extend_from_slice(&x[i]);

        for a in 0..k {
            xty[a] += xi[a] * y[i];
            for b in 0..k {
                xtx[a][b] += xi[a] * xi[b];
            }
        }
    }

    let mut aug = vec![vec![0.0; k + 1]; k];
    for i in 0..k {
        aug[i][..k].copy_from_slice(&xtx[i]);
        aug[i][k] = xty[i];
    }

    for col in 0..k {
        let mut pivot = col;
        for row in col + 1..k {
            if aug[row][col].abs() > aug[pivot][col].abs() {
                pivot = row;
            }
        }
        aug.swap(col, pivot);

        let div = aug[col][col];
        if div.abs() < 1e-12 {
            continue;
        }
        for c in col..=k {
            aug[col][c] /= div;
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            for c in col..=k {
                aug[row][c] -= factor * aug[col][c];
            }
        }
    }

    let beta: Vec<f64> = aug.iter().map(|row| row[k]).collect();

    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for i in 0..n {
        let mut y_hat = beta[0];
        for a in 0..p {
            y_hat += beta[a + 1] * x[i][a];
        }
        ss_tot += (y[i] - y_mean) * (y[i] - y_mean);
        ss_res += (y[i] - y_hat) * (y[i] - y_hat);
    }

    if ss_tot <= 1e-12 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Granger causality proxy: delta in R-squared between predicting the
/// target's next value from its own past alone versus its own past plus
/// the source's past, with a permutation test (shuffled source) for the
/// p-value. The caller guarantees `len > lag_steps`.
pub fn granger_delta_r2(
    src: &[u8],
    tgt: &[u8],
    lag_steps: usize,
    iters: usize,
    seed: u64,
) -> GrangerResult {
    let len = src.len().min(tgt.len());

    let mut y = Vec::with_capacity(len - lag_steps);
    let mut x_reduced = Vec::with_capacity(len - lag_steps);
    let mut x_full = Vec::with_capacity(len - lag_steps);

    for t in 0..len - lag_steps {
        y.push(tgt[t + lag_steps] as f64);
        x_reduced.push(vec![tgt[t] as f64]);
        x_full.push(vec![tgt[t] as f64, src[t] as f64]);
    }

    let r2_full = ols_r2(&y, &x_full);
    let r2_reduced = ols_r2(&y, &x_reduced);
    let delta_r2 = r2_full - r2_reduced;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut permuted: Vec<f64> = src[..len - lag_steps].iter().map(|v| *v as f64).collect();
    let mut num_ge = 0usize;

    for _ in 0..iters {
        permuted.shuffle(&mut rng);

        let x_permuted: Vec<Vec<f64>> = x_full
            .iter()
            .zip(&permuted)
            .map(|(row, shuffled_src)| vec![row[0], *shuffled_src])
            .collect();

        let delta_permuted = ols_r2(&y, &x_permuted) - r2_reduced;
        if delta_permuted >= delta_r2 {
            num_ge += 1;
        }
    }

    let p_value = (num_ge + 1) as f64 / (iters + 1) as f64;

    GrangerResult { delta_r2, p_value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_series(len: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(0..2u8)).collect()
    }

    #[test]
    fn perfect_linear_fit() {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..50).map(|i| 2.0 * i as f64 + 1.0).collect();

        assert_approx_eq!(f64, ols_r2(&y, &x), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_target_has_zero_r2() {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let y = vec![3.0; 50];

        assert_approx_eq!(f64, ols_r2(&y, &x), 0.0);
    }

    #[test]
    fn uninformative_regressor() {
        let x: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![if i % 2 == 0 { 1.0 } else { 0.0 }])
            .collect();
        let y: Vec<f64> = (0..100)
            .map(|i| if (i / 2) % 2 == 0 { 1.0 } else { 0.0 })
            .collect();

        assert!(ols_r2(&y, &x).abs() < 0.05);
    }

    #[test]
    fn coupled_series_yield_high_delta_and_low_p() {
        let src = random_series(5000, 10);
        let lag = 1;
        let mut tgt = vec![0u8; src.len()];
        for t in 0..src.len() - lag {
            tgt[t + lag] = src[t];
        }

        let result = granger_delta_r2(&src, &tgt, lag, 50, 11);

        assert!(result.delta_r2 > 0.9, "delta_r2 = {}", result.delta_r2);
        assert_approx_eq!(f64, result.p_value, 1.0 / 51.0);
    }

    #[test]
    fn independent_series_yield_negligible_delta() {
        let src = random_series(5000, 12);
        let tgt = random_series(5000, 13);

        let result = granger_delta_r2(&src, &tgt, 1, 50, 14);

        assert!(result.delta_r2.abs() < 0.01, "delta_r2 = {}", result.delta_r2);
    }
}
