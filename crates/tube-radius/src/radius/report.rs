//! Per-point diagnostics returned alongside the mutated centerline.

use crate::frame::GeometryDefect;

use super::medialness::MedialnessSample;

/// Why an estimate was produced but not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowConfidence {
    /// Coarse response below `thresh_medialness_start`; refinement skipped.
    BelowStartThreshold,
    /// Refined response below `thresh_medialness`.
    BelowThreshold,
    /// Every ray was out of bounds at every candidate radius; the radius
    /// keeps its seed value.
    FieldUnavailable,
}

/// Outcome for one centerline point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    /// Radius written and response above `thresh_medialness`.
    Accepted,
    /// Radius written, flagged for review.
    LowConfidence(LowConfidence),
    /// Frame was unusable; the point was left untouched.
    Skipped(GeometryDefect),
}

impl PointStatus {
    /// Whether a radius was written to the point.
    pub fn has_estimate(self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

/// Diagnostics for one centerline point.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointReport {
    /// Index of the point in the centerline.
    pub index: usize,
    /// Final status.
    pub status: PointStatus,
    /// Initial radius after clamping.
    pub seed_radius: f64,
    /// Best radius of the coarse grid.
    pub coarse_radius: f64,
    /// Response at `coarse_radius`.
    pub coarse_medialness: f64,
    /// Radius written to the point (unchanged input radius when skipped).
    pub radius: f64,
    /// Response at `radius`.
    pub medialness: f64,
    /// Fraction of rays in bounds at `radius`.
    pub coverage: f64,
    /// Golden-section iterations spent in refinement.
    pub iterations: usize,
    /// Coarse response profile, when `store_response` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<MedialnessSample>>,
}

impl PointReport {
    pub(crate) fn skipped(index: usize, defect: GeometryDefect, radius: f64) -> Self {
        Self {
            index,
            status: PointStatus::Skipped(defect),
            seed_radius: radius,
            coarse_radius: radius,
            coarse_medialness: 0.0,
            radius,
            medialness: 0.0,
            coverage: 0.0,
            iterations: 0,
            response: None,
        }
    }
}

/// Complete per-point report of one estimator run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadiusReport {
    /// One entry per centerline point, in centerline order.
    pub points: Vec<PointReport>,
}

impl RadiusReport {
    /// Number of points accepted.
    pub fn n_accepted(&self) -> usize {
        self.count(|s| s == PointStatus::Accepted)
    }

    /// Number of points with a low-confidence estimate.
    pub fn n_low_confidence(&self) -> usize {
        self.count(|s| matches!(s, PointStatus::LowConfidence(_)))
    }

    /// Number of points skipped because of a geometry defect.
    pub fn n_skipped(&self) -> usize {
        self.count(|s| matches!(s, PointStatus::Skipped(_)))
    }

    /// Indices of points that need caller review (low confidence or skipped).
    pub fn flagged(&self) -> Vec<usize> {
        self.points
            .iter()
            .filter(|p| p.status != PointStatus::Accepted)
            .map(|p| p.index)
            .collect()
    }

    fn count(&self, pred: impl Fn(PointStatus) -> bool) -> usize {
        self.points.iter().filter(|p| pred(p.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(index: usize, status: PointStatus) -> PointReport {
        PointReport {
            status,
            ..PointReport::skipped(index, GeometryDefect::NonFinite, 1.0)
        }
    }

    #[test]
    fn counters_partition_points() {
        let r = RadiusReport {
            points: vec![
                report(0, PointStatus::Accepted),
                report(1, PointStatus::LowConfidence(LowConfidence::BelowThreshold)),
                report(2, PointStatus::Skipped(GeometryDefect::NotOrthogonal)),
                report(3, PointStatus::Accepted),
            ],
        };
        assert_eq!(r.n_accepted(), 2);
        assert_eq!(r.n_low_confidence(), 1);
        assert_eq!(r.n_skipped(), 1);
        assert_eq!(r.flagged(), vec![1, 2]);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let s = PointStatus::LowConfidence(LowConfidence::FieldUnavailable);
        let json = serde_json::to_string(&s).expect("serialize");
        assert_eq!(json, r#"{"low_confidence":"field_unavailable"}"#);
        assert!(!PointStatus::Skipped(GeometryDefect::NonFinite).has_estimate());
        assert!(s.has_estimate());
    }
}
