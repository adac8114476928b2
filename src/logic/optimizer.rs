/// `1 / phi`, the fraction of the interval kept on every narrowing step.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("invalid bounds: lower {lower} must not exceed upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OptimizeResult {
    pub argmax: f64,
    pub value: f64,
    /// False when the iteration budget ran out before the interval shrank to the tolerance.
    /// The result is then a best-effort estimate.
    pub converged: bool,
    pub iterations: usize,
}

/// Maximize `f` over `[lower, upper]` by golden-section search.
///
/// `f` does not need to be smooth, only evaluable on the whole interval. Non-finite values
/// (use `f64::NEG_INFINITY` for "cannot trade here") simply lose every comparison.
/// There is no bracketing requirement: a candidate is always returned.
pub fn maximize<F>(mut f: F, lower: f64, upper: f64, tolerance: f64, max_iterations: usize) -> Result<OptimizeResult, OptimizeError>
where
    F: FnMut(f64) -> f64,
{
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(OptimizeError::InvalidBounds { lower, upper });
    }
    let tolerance = tolerance.abs();

    if upper - lower <= tolerance {
        let argmax = lower + (upper - lower) / 2.0;
        return Ok(OptimizeResult { argmax, value: f(argmax), converged: true, iterations: 0 });
    }

    let (mut a, mut b) = (lower, upper);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    let mut iterations = 0;
    while b - a > tolerance && iterations < max_iterations {
        if better(fc, fd) {
            // the maximum cannot lie in (d, b]
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            // the maximum cannot lie in [a, c)
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
        iterations += 1;
    }

    let converged = b - a <= tolerance;
    let (argmax, value) = if better(fc, fd) { (c, fc) } else { (d, fd) };

    Ok(OptimizeResult { argmax, value, converged, iterations })
}

// NaN never wins a comparison
fn better(left: f64, right: f64) -> bool {
    left >= right || right.is_nan()
}
