pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.max(0.0).min(1.0)
}

pub fn fmt(x: f64, decimals: usize) -> String {
    if !x.is_finite() {
        return "-".to_string();
    }
    format!("{:.*}", decimals, x)
}

pub fn bits_to_bitmask(bits: &[u8]) -> usize {
    let mut mask = 0;
    for (i, bit) in bits.iter().enumerate() {
        if *bit != 0 {
            mask |= 1 << i;
        }
    }
    mask
}

pub fn hamming_distance(a: usize, b: usize) -> usize {
    (a ^ b).count_ones() as usize
}

#[cfg(test)]
pub mod test_util {
    use float_cmp::{assert_approx_eq, ApproxEq};
    use std::fmt::Debug;

    pub fn assert_approx_eq_slice<T>(left: &[T], right: &[T])
    where
        T: ApproxEq + Debug + Copy,
    {
        assert_eq!(left.len(), right.len());

        for item in left.iter().zip(right) {
            assert_approx_eq!(T, *item.0, *item.1);
        }
    }
}
