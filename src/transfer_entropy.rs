/// Transfer entropy for binary series with history length one:
/// `TE = sum p(y1,y0,x0) * log2(p(y1|y0,x0) / p(y1|y0))`, estimated from
/// delay-embedded frequency counts. Terms with an empty cell contribute
/// zero (the 0*log(0/0) convention), so degenerate distributions never
/// produce NaN. The caller guarantees `len > lag_steps + 1`.
pub fn transfer_entropy(src: &[u8], tgt: &[u8], lag_steps: usize) -> f64 {
    let len = src.len().min(tgt.len());
    let mut counts = [[[0usize; 2]; 2]; 2];
    let mut total = 0usize;

    for t in 0..len - lag_steps - 1 {
        let x0 = src[t] as usize;
        let y0 = tgt[t] as usize;
        let y1 = tgt[t + lag_steps] as usize;
        counts[y1][y0][x0] += 1;
        total += 1;
    }

    let mut te = 0.0;

    for y1 in 0..2 {
        for y0 in 0..2 {
            for x0 in 0..2 {
                let n = counts[y1][y0][x0];
                if n == 0 {
                    continue;
                }

                let p_joint = n as f64 / total as f64;
                let n_y0x0 = counts[0][y0][x0] + counts[1][y0][x0];
                let n_y1y0 = counts[y1][y0][0] + counts[y1][y0][1];
                let n_y0: usize = (0..2).map(|y| counts[y][y0][0] + counts[y][y0][1]).sum();

                let p_cond_full = if n_y0x0 > 0 {
                    n as f64 / n_y0x0 as f64
                } else {
                    0.0
                };
                let p_cond_reduced = if n_y0 > 0 {
                    n_y1y0 as f64 / n_y0 as f64
                } else {
                    0.0
                };

                if p_cond_full > 0.0 && p_cond_reduced > 0.0 {
                    te += p_joint * (p_cond_full / p_cond_reduced).log2();
                }
            }
        }
    }

    te
}

/// Joint transfer entropy from a source pair onto a target, embedding the
/// pair as a four-state symbol. Used to measure super-additive (synergistic)
/// information flow beyond the two individual source contributions.
pub fn joint_transfer_entropy(a: &[u8], b: &[u8], tgt: &[u8], lag_steps: usize) -> f64 {
    let len = a.len().min(b.len()).min(tgt.len());
    let mut counts = [[[0usize; 4]; 2]; 2];
    let mut total = 0usize;

    for t in 0..len - lag_steps - 1 {
        let x = ((a[t] << 1) | b[t]) as usize;
        let y0 = tgt[t] as usize;
        let y1 = tgt[t + lag_steps] as usize;
        counts[y1][y0][x] += 1;
        total += 1;
    }

    let mut te = 0.0;

    for y1 in 0..2 {
        for y0 in 0..2 {
            for x in 0..4 {
                let n = counts[y1][y0][x];
                if n == 0 {
                    continue;
                }

                let p_joint = n as f64 / total as f64;
                let n_y0x = counts[0][y0][x] + counts[1][y0][x];
                let n_y1y0: usize = counts[y1][y0].iter().sum();
                let n_y0: usize = (0..2).map(|y| counts[y][y0].iter().sum::<usize>()).sum();

                let p_cond_full = if n_y0x > 0 {
                    n as f64 / n_y0x as f64
                } else {
                    0.0
                };
                let p_cond_reduced = if n_y0 > 0 {
                    n_y1y0 as f64 / n_y0 as f64
                } else {
                    0.0
                };

                if p_cond_full > 0.0 && p_cond_reduced > 0.0 {
                    te += p_joint * (p_cond_full / p_cond_reduced).log2();
                }
            }
        }
    }

    te
}
