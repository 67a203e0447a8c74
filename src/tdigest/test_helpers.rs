pub fn assert_exact(label: &str, expected: f64, got: f64) {
    assert!(
        expected == got,
        "{}: expected exactly {:.9}, got {:.9}",
        label,
        expected,
        got
    );
}

pub fn assert_abs_close(label: &str, expected: f64, got: f64, atol: f64) {
    let err = (expected - got).abs();
    assert!(
        err < atol,
        "{}: expected ~= {:.9}, got {:.9}, abs_err={:.6e}, atol={:.6e}",
        label,
        expected,
        got,
        err,
        atol
    );
}

pub fn assert_monotone_chain(label: &str, values: &[f64]) {
    for i in 1..values.len() {
        assert!(
            values[i] >= values[i - 1],
            "{}: non-monotone at i={}: {} < {}",
            label,
            i,
            values[i],
            values[i - 1]
        );
    }
}

/// Linear-interpolated order statistic of an ascending sample.
///
/// `q == 1` (or a single value) answers the last element; an empty sample is NaN.
pub fn exact_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if q >= 1.0 || n == 1 {
        return sorted[n - 1];
    }
    let index = q.max(0.0) * (n - 1) as f64;
    let lo = index.floor() as usize;
    let frac = index - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac
}
