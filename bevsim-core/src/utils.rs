//! Module containing various utility functions shared across the pipeline.

use crate::imports::*;

/// Error-less maximum for f64
pub fn max(a: f64, b: f64) -> f64 {
    a.max(b)
}

/// Error-less minimum for f64
pub fn min(a: f64, b: f64) -> f64 {
    a.min(b)
}

/// First-order difference of `x` with a leading zero, such that
/// `diff(x)[i] == x[i] - x[i-1]` for `i > 0` and `diff(x)[0] == 0`.
pub fn diff(x: &Array1<f64>) -> Array1<f64> {
    if x.is_empty() {
        return Array::zeros(0);
    }
    concatenate(
        Axis(0),
        &[
            array![0.0].view(),
            (&x.slice(s![1..]) - &x.slice(s![..-1])).view(),
        ],
    )
    .unwrap()
}

/// return cumsum <f64> of arr
pub fn ndarrcumsum(arr: &Array1<f64>) -> Array1<f64> {
    arr.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff() {
        let x = array![0.0, 1.0, 3.0, 3.0];
        assert_eq!(diff(&x), array![0.0, 1.0, 2.0, 0.0]);
        assert_eq!(diff(&Array::zeros(0)).len(), 0);
    }

    #[test]
    fn test_ndarrcumsum() {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let expected = array![0.0, 1.0, 3.0, 6.0];
        assert_eq!(ndarrcumsum(&x), expected);
    }
}
