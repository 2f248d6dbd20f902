//! Bounded 1-D maximization by golden-section search.

/// `(sqrt(5) - 1) / 2`.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Result of a bounded maximization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SearchResult {
    /// Best abscissa found.
    pub(crate) x: f64,
    /// Objective at `x`.
    pub(crate) value: f64,
    /// Bracket reductions performed.
    pub(crate) iterations: usize,
}

/// Maximize `f` on `[lo, hi]` by golden-section search.
///
/// Stops once the bracket is narrower than `tol` or after `max_iter`
/// reductions. Every evaluated point competes for the result, with ties going
/// to the smaller abscissa, so a flat objective returns its left-most probe.
pub(crate) fn golden_section_max<F>(
    mut f: F,
    lo: f64,
    hi: f64,
    tol: f64,
    max_iter: usize,
) -> SearchResult
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut best = SearchResult {
        x: a,
        value: f(a),
        iterations: 0,
    };
    let consider = |x: f64, v: f64, best: &mut SearchResult| {
        if super::profile::improves(x, v, best.x, best.value) || !best.value.is_finite() {
            best.x = x;
            best.value = v;
        }
    };

    let fb = f(b);
    consider(b, fb, &mut best);
    if b - a <= tol {
        return best;
    }

    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    consider(c, fc, &mut best);
    consider(d, fd, &mut best);

    let mut iterations = 0usize;
    while b - a > tol && iterations < max_iter {
        iterations += 1;
        // `>=` keeps the left bracket on ties.
        if fc >= fd || fd.is_nan() {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
            consider(c, fc, &mut best);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
            consider(d, fd, &mut best);
        }
        tracing::trace!("golden iteration {}: bracket [{:.4}, {:.4}]", iterations, a, b);
    }

    best.iterations = iterations;
    best
}
