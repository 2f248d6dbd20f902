//! Radius grids, angular aggregation and peak selection for medialness profiles.

use super::config::AngularAggregator;

/// Coarse candidate radii on a fixed lattice `anchor + k * step`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RadiusGrid {
    pub(crate) radii: Vec<f64>,
    pub(crate) window: [f64; 2],
}

impl RadiusGrid {
    /// Lattice radii inside `window`.
    ///
    /// The lattice is anchored at `anchor` (normally `min_radius`) so the grid
    /// does not move with the initial guess. A window too narrow to contain a
    /// lattice radius yields the single radius `fallback`.
    pub(crate) fn from_window(window: [f64; 2], anchor: f64, step: f64, fallback: f64) -> Self {
        let mut radii = Vec::new();
        if step > 0.0 && window[1] >= window[0] {
            let k0 = ((window[0] - anchor) / step - 1e-9).ceil().max(0.0) as usize;
            let mut k = k0;
            loop {
                let r = anchor + k as f64 * step;
                if r > window[1] + 1e-9 {
                    break;
                }
                if r >= window[0] - 1e-9 {
                    radii.push(r.clamp(window[0], window[1]));
                }
                k += 1;
            }
        }
        if radii.is_empty() {
            radii.push(fallback.clamp(window[0], window[1]));
        }
        Self { radii, window }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.radii.len()
    }
}

/// Aggregate per-ray responses into one scalar value.
pub(crate) fn aggregate(values: &mut [f64], agg: &AngularAggregator) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match *agg {
        AngularAggregator::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AngularAggregator::Median => {
            let mid = values.len() / 2;
            let (_, median, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            *median
        }
        AngularAggregator::TrimmedMean { trim_fraction } => {
            values.sort_by(|a, b| a.total_cmp(b));
            let k = (values.len() as f64 * trim_fraction).floor() as usize;
            let start = k.min(values.len());
            let end = values.len().saturating_sub(k).max(start);
            let slice = &values[start..end];
            if slice.is_empty() {
                values[values.len() / 2]
            } else {
                slice.iter().sum::<f64>() / slice.len() as f64
            }
        }
    }
}

/// Index of the largest finite value. Ties resolve to the lowest index,
/// i.e. the smallest radius on an ascending grid.
pub(crate) fn peak_idx(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Whether candidate `(r, v)` should replace incumbent `(r_best, v_best)`.
///
/// Higher response wins; an exact tie goes to the smaller radius.
#[inline]
pub(crate) fn improves(r: f64, v: f64, r_best: f64, v_best: f64) -> bool {
    v.is_finite() && (v > v_best || (v == v_best && r < r_best))
}
