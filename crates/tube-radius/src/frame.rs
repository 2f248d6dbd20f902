//! Tangent/normal frames along a discrete centerline.
//!
//! Tangents come from centered differences of neighbouring positions
//! (one-sided at the two ends). Normals are an orthonormal complement of the
//! tangent built by Gram-Schmidt from a coordinate-axis seed; in 3-D the
//! second normal is `tangent x normal1` so every frame is right-handed.

use nalgebra::SVector;

use crate::tube::TubePoint;

/// Minimum number of points required to build frames.
pub const MIN_FRAME_POINTS: usize = 3;

/// Default tolerance used by [`check_frame`] for unit length and orthogonality.
pub const FRAME_TOLERANCE: f64 = 1e-2;

/// Squared length below which a difference vector is treated as zero.
const DEGENERATE_NORM_SQ: f64 = 1e-24;

/// Largest tangent component accepted for a seed axis.
const SEED_MAX_ALIGNMENT: f64 = 0.9;

// ── Errors and reports ─────────────────────────────────────────────────────

/// Errors that abort frame construction for the whole centerline.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Fewer points than [`MIN_FRAME_POINTS`].
    TooFewPoints {
        /// Required minimum number of points.
        needed: usize,
        /// Provided number of points.
        got: usize,
    },
    /// A position has a non-finite coordinate.
    NonFinitePosition {
        /// Index of the offending point.
        index: usize,
    },
    /// No point has a well-defined tangent (all positions coincide).
    DegenerateCenterline,
    /// Frames need at least a 2-D space.
    UnsupportedDimension(usize),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints { needed, got } => {
                write!(f, "too few points: need {}, got {}", needed, got)
            }
            Self::NonFinitePosition { index } => {
                write!(f, "non-finite position at point {}", index)
            }
            Self::DegenerateCenterline => write!(f, "all centerline positions coincide"),
            Self::UnsupportedDimension(d) => {
                write!(f, "frames require dimension >= 2, got {}", d)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Local frame problem found on a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryDefect {
    /// Position or a frame vector has a non-finite component.
    NonFinite,
    /// A frame vector is not of unit length (includes unpopulated zero vectors).
    NotUnitLength,
    /// Frame vectors are not mutually orthogonal.
    NotOrthogonal,
}

impl std::fmt::Display for GeometryDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite frame"),
            Self::NotUnitLength => write!(f, "frame vector not of unit length"),
            Self::NotOrthogonal => write!(f, "frame vectors not orthogonal"),
        }
    }
}

/// A tangent that was undefined and copied from a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TangentRepair {
    /// Point whose tangent was undefined.
    pub index: usize,
    /// Point the tangent was borrowed from.
    pub source: usize,
}

/// Outcome of [`compute_tangents_and_normals`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameReport {
    /// Number of points processed.
    pub n_points: usize,
    /// Zero-length tangents replaced by a neighbour's tangent.
    pub repairs: Vec<TangentRepair>,
}

// ── Frame construction ─────────────────────────────────────────────────────

/// Populate `tangent`, `normal1` and `normal2` of every point in place.
///
/// Positions are read only. A zero-length difference (coincident points)
/// borrows the tangent of the nearest point with a valid one, earlier index
/// first on ties, and is recorded in the returned report.
pub fn compute_tangents_and_normals<const D: usize>(
    points: &mut [TubePoint<D>],
) -> Result<FrameReport, FrameError> {
    if D < 2 {
        return Err(FrameError::UnsupportedDimension(D));
    }
    let n = points.len();
    if n < MIN_FRAME_POINTS {
        return Err(FrameError::TooFewPoints {
            needed: MIN_FRAME_POINTS,
            got: n,
        });
    }
    if let Some(index) = points
        .iter()
        .position(|p| p.position.iter().any(|c| !c.is_finite()))
    {
        return Err(FrameError::NonFinitePosition { index });
    }

    let raw: Vec<Option<SVector<f64, D>>> = (0..n).map(|i| raw_tangent(points, i)).collect();
    if raw.iter().all(Option::is_none) {
        return Err(FrameError::DegenerateCenterline);
    }

    let mut report = FrameReport {
        n_points: n,
        repairs: Vec::new(),
    };
    for (i, point) in points.iter_mut().enumerate() {
        let tangent = match raw[i] {
            Some(t) => t,
            None => {
                let source = nearest_valid(&raw, i).ok_or(FrameError::DegenerateCenterline)?;
                tracing::warn!(
                    "point {}: zero-length tangent, borrowed from point {}",
                    i,
                    source
                );
                report.repairs.push(TangentRepair { index: i, source });
                raw[source].ok_or(FrameError::DegenerateCenterline)?
            }
        };
        let (normal1, normal2) = orthonormal_complement(&tangent);
        point.tangent = tangent;
        point.normal1 = normal1;
        point.normal2 = normal2;
    }

    tracing::debug!(
        "built frames for {} points ({} repaired tangents)",
        n,
        report.repairs.len()
    );
    Ok(report)
}

/// Unit tangent from neighbour differences, `None` when the difference vanishes.
fn raw_tangent<const D: usize>(points: &[TubePoint<D>], i: usize) -> Option<SVector<f64, D>> {
    let n = points.len();
    let (a, b) = if i == 0 {
        (0, 1)
    } else if i + 1 == n {
        (n - 2, n - 1)
    } else {
        (i - 1, i + 1)
    };
    let d = points[b].position - points[a].position;
    let nsq = d.norm_squared();
    if nsq <= DEGENERATE_NORM_SQ || !nsq.is_finite() {
        return None;
    }
    Some(d / nsq.sqrt())
}

fn nearest_valid<T>(raw: &[Option<T>], i: usize) -> Option<usize> {
    (1..raw.len()).find_map(|step| {
        let before = i.checked_sub(step).filter(|&j| raw[j].is_some());
        let after = Some(i + step).filter(|&j| j < raw.len() && raw[j].is_some());
        before.or(after)
    })
}

/// Two unit normals orthogonal to the unit vector `t` (second is zero in 2-D).
///
/// Below 2-D there is no normal direction and both vectors are zero.
pub fn orthonormal_complement<const D: usize>(
    t: &SVector<f64, D>,
) -> (SVector<f64, D>, SVector<f64, D>) {
    if D < 2 {
        return (SVector::zeros(), SVector::zeros());
    }
    let seed_axis = (0..D)
        .find(|&k| t[k].abs() < SEED_MAX_ALIGNMENT)
        .unwrap_or(0);
    let normal1 = reject_axis(seed_axis, &[*t]).unwrap_or_else(SVector::zeros);

    let normal2 = match D {
        2 => SVector::zeros(),
        3 => {
            let mut c = SVector::<f64, D>::zeros();
            c[0] = t[1] * normal1[2] - t[2] * normal1[1];
            c[1] = t[2] * normal1[0] - t[0] * normal1[2];
            c[2] = t[0] * normal1[1] - t[1] * normal1[0];
            c.normalize()
        }
        _ => (0..D)
            .filter_map(|k| {
                let v = axis_residual(k, &[*t, normal1]);
                let len = v.norm();
                (len > 1e-6).then_some((len, v))
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(len, v)| v / len)
            .unwrap_or_else(SVector::zeros),
    };
    (normal1, normal2)
}

/// Unit vector of axis `k` with the components along `basis` removed.
fn reject_axis<const D: usize>(
    k: usize,
    basis: &[SVector<f64, D>],
) -> Option<SVector<f64, D>> {
    let v = axis_residual(k, basis);
    let len = v.norm();
    (len > 1e-9).then(|| v / len)
}

fn axis_residual<const D: usize>(k: usize, basis: &[SVector<f64, D>]) -> SVector<f64, D> {
    let mut v = SVector::<f64, D>::zeros();
    v[k] = 1.0;
    for b in basis {
        v -= *b * b.dot(&v);
    }
    v
}

/// Validate one point's frame against the orthonormality invariant.
///
/// Returns the first defect found, or `None` for a usable frame. `normal2` is
/// only checked in 3-D and above.
pub fn check_frame<const D: usize>(point: &TubePoint<D>, tol: f64) -> Option<GeometryDefect> {
    let mut vectors = vec![&point.position, &point.tangent, &point.normal1];
    if TubePoint::<D>::has_normal2() {
        vectors.push(&point.normal2);
    }
    if vectors.iter().any(|v| v.iter().any(|c| !c.is_finite())) {
        return Some(GeometryDefect::NonFinite);
    }

    let axes = &vectors[1..];
    if axes.iter().any(|v| (v.norm() - 1.0).abs() > tol) {
        return Some(GeometryDefect::NotUnitLength);
    }
    for (i, a) in axes.iter().enumerate() {
        for b in &axes[i + 1..] {
            if a.dot(*b).abs() > tol {
                return Some(GeometryDefect::NotOrthogonal);
            }
        }
    }
    None
}
