use serde::{Deserialize, Serialize};

pub const ENROLLMENT_MAX: f64 = 25.0;
pub const DURATION_MAX: f64 = 10.0;
pub const ADVERSE_EVENT_MAX: f64 = 30.0;
pub const RETENTION_MAX: f64 = 10.0;
pub const TOTAL_MAX: f64 = ENROLLMENT_MAX + DURATION_MAX + ADVERSE_EVENT_MAX + RETENTION_MAX;

/// Cohort-relative operational quality of a single trial.
///
/// `adverse_event_score` is not clamped and may be negative for a trial that is far worse
/// than its cohort on both event rates; the other parts stay within their maxima.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
	pub enrollment_score: f64,
	pub duration_score: f64,
	pub adverse_event_score: f64,
	pub retention_score: f64,
	pub total: f64,
	pub max: f64,
}
impl ScoreBreakdown {
	pub fn new(
		enrollment_score: f64,
		duration_score: f64,
		adverse_event_score: f64,
		retention_score: f64,
	) -> Self {
		Self {
			enrollment_score,
			duration_score,
			adverse_event_score,
			retention_score,
			total: enrollment_score + duration_score + adverse_event_score + retention_score,
			max: TOTAL_MAX,
		}
	}

	pub fn zero() -> Self {
		Self::new(0.0, 0.0, 0.0, 0.0)
	}
}
impl Default for ScoreBreakdown {
	fn default() -> Self {
		Self::zero()
	}
}
