use simple_error::SimpleError;

use crate::util::bits_to_bitmask;

/// Empirical state-transition probability matrix over bitmask-encoded
/// network states, estimated from one spike train at a fixed lag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tpm {
    pub n: usize,
    pub mat: Vec<Vec<f64>>,
    pub row_counts: Vec<usize>,
}

pub fn build_tpm(spikes: &[Vec<u8>], delay_steps: usize) -> Result<Tpm, SimpleError> {
    let n = spikes.len();

    if n == 0 || n > 16 {
        return Err(SimpleError::new(
            "TPM construction requires between 1 and 16 series",
        ));
    }

    let len = spikes[0].len();
    if len <= delay_steps {
        return Err(SimpleError::new(
            "time series too short for analysis delay",
        ));
    }

    let num_states = 1usize << n;
    let mut counts = vec![vec![0usize; num_states]; num_states];
    let mut row_counts = vec![0usize; num_states];

    let mut from_bits = vec![0u8; n];
    let mut to_bits = vec![0u8; n];

    for t in 0..len - delay_steps {
        for i in 0..n {
            from_bits[i] = spikes[i][t];
            to_bits[i] = spikes[i][t + delay_steps];
        }
        let from = bits_to_bitmask(&from_bits);
        let to = bits_to_bitmask(&to_bits);
        counts[from][to] += 1;
        row_counts[from] += 1;
    }

    let mat = counts
        .iter()
        .zip(&row_counts)
        .map(|(row, count)| {
            if *count == 0 {
                return vec![0.0; num_states];
            }
            row.iter().map(|c| *c as f64 / *count as f64).collect()
        })
        .collect();

    Ok(Tpm {
        n,
        mat,
        row_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn alternating_pair_cycles_between_two_states() {
        let spikes = vec![vec![0, 1, 0, 1, 0, 1], vec![1, 0, 1, 0, 1, 0]];
        let tpm = build_tpm(&spikes, 1).unwrap();

        // state 0b10 always transitions to 0b01 and vice versa
        assert_approx_eq!(f64, tpm.mat[0b10][0b01], 1.0);
        assert_approx_eq!(f64, tpm.mat[0b01][0b10], 1.0);
        assert_eq!(tpm.row_counts[0b10] + tpm.row_counts[0b01], 5);
    }

    #[test]
    fn constant_series_self_transitions() {
        let spikes = vec![vec![1, 1, 1, 1]];
        let tpm = build_tpm(&spikes, 1).unwrap();

        assert_approx_eq!(f64, tpm.mat[1][1], 1.0);
        assert_eq!(tpm.row_counts[1], 3);
    }

    #[test]
    fn unvisited_rows_are_zero() {
        let spikes = vec![vec![0, 0, 0, 0]];
        let tpm = build_tpm(&spikes, 1).unwrap();

        assert_eq!(tpm.row_counts[1], 0);
        assert_approx_eq!(f64, tpm.mat[1][0], 0.0);
        assert_approx_eq!(f64, tpm.mat[1][1], 0.0);
    }

    #[test]
    fn rows_sum_to_one_when_visited() {
        let spikes = vec![vec![0, 1, 1, 0, 1, 0, 0, 1], vec![1, 1, 0, 0, 1, 1, 0, 0]];
        let tpm = build_tpm(&spikes, 2).unwrap();

        for (row, count) in tpm.mat.iter().zip(&tpm.row_counts) {
            if *count > 0 {
                assert_approx_eq!(f64, row.iter().sum::<f64>(), 1.0);
            }
        }
    }

    #[test]
    fn too_many_series_rejected() {
        let spikes = vec![vec![0, 1]; 17];
        let result = build_tpm(&spikes, 1);

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().as_str(),
            "TPM construction requires between 1 and 16 series"
        );
    }

    #[test]
    fn too_short_series_rejected() {
        let spikes = vec![vec![0, 1]];
        let result = build_tpm(&spikes, 2);

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().as_str(),
            "time series too short for analysis delay"
        );
    }
}
