//! Operational score of one trial relative to a comparison cohort.
//!
//! Every part is computed independently. A part that cannot be computed (missing field,
//! unparseable date, zero denominator) contributes 0 and the rest of the breakdown still
//! counts. The target trial must not be part of `cohort`; callers build leave-one-out
//! cohorts.

use trialscope_domain::{
	ScoreBreakdown, TrialDate, TrialDocument,
	score::{ADVERSE_EVENT_MAX, DURATION_MAX, ENROLLMENT_MAX, RETENTION_MAX},
};

const SERIOUS_EVENT_WEIGHT: f64 = 0.7;
const OTHER_EVENT_WEIGHT: f64 = 0.3;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
	#[error("missing {field}")]
	MissingField { field: &'static str },
	#[error("{what} is undefined")]
	Undefined { what: &'static str },
	#[error("invalid date: {message}")]
	InvalidDate { message: String },
	#[error("invalid {field}: {value}")]
	InvalidValue { field: &'static str, value: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EventRates {
	serious: f64,
	other: f64,
}

pub fn score_trial(target: &TrialDocument, cohort: &[&TrialDocument]) -> ScoreBreakdown {
	let enrollment = degrade(target, "enrollment", enrollment_score(target, cohort));
	let duration = degrade(target, "duration", duration_score(target));
	let adverse_event = degrade(target, "adverse_event", adverse_event_score(target, cohort));
	let retention = degrade(target, "retention", retention_score(target));

	ScoreBreakdown::new(enrollment, duration, adverse_event, retention)
}

pub fn enrollment_score(target: &TrialDocument, cohort: &[&TrialDocument]) -> Result<f64, ScoreError> {
	let enrollment = positive_enrollment(target)?;

	if cohort.is_empty() {
		return Err(ScoreError::Undefined { what: "cohort enrollment mean" });
	}

	let total: i64 = cohort.iter().map(|trial| trial.enrollment_count.unwrap_or(0)).sum();
	let mean = total as f64 / cohort.len() as f64;

	if mean <= 0.0 {
		return Err(ScoreError::Undefined { what: "cohort enrollment mean" });
	}

	Ok(ENROLLMENT_MAX * (enrollment / mean).clamp(0.0, 1.0))
}

/// Ratio of actual to planned months, with the plan read from the earliest protocol version
/// when available and from the primary completion date otherwise.
pub fn duration_score(target: &TrialDocument) -> Result<f64, ScoreError> {
	let start = parse_date(target.start_date.as_deref(), "start date")?;
	let estimated = parse_date(
		target.estimated_completion_date.as_deref().or(target.primary_completion_date.as_deref()),
		"estimated completion date",
	)?;
	let actual = parse_date(target.completion_date.as_deref(), "completion date")?;
	let planned_months = start.months_until(estimated);
	let actual_months = start.months_until(actual);

	if planned_months <= 0 {
		return Err(ScoreError::Undefined { what: "planned duration" });
	}

	let ratio = f64::from(actual_months) / f64::from(planned_months);

	Ok(DURATION_MAX * ratio.clamp(0.0, 1.0))
}

/// Left unclamped: a trial far worse than its cohort on both rates scores below zero.
pub fn adverse_event_score(
	target: &TrialDocument,
	cohort: &[&TrialDocument],
) -> Result<f64, ScoreError> {
	if !target.has_results {
		return Ok(0.0);
	}

	let rates = event_rates(target)?;
	let cohort_rates: Vec<EventRates> = cohort
		.iter()
		.filter(|trial| trial.has_results)
		.filter_map(|trial| match event_rates(trial) {
			Ok(rates) => Some(rates),
			Err(err) => {
				tracing::debug!(document_id = %trial.id, error = %err, "Skipping cohort trial for event rates.");

				None
			},
		})
		.collect();

	if cohort_rates.is_empty() {
		return Err(ScoreError::Undefined { what: "cohort event rates" });
	}

	let count = cohort_rates.len() as f64;
	let mean_serious = cohort_rates.iter().map(|rates| rates.serious).sum::<f64>() / count;
	let mean_other = cohort_rates.iter().map(|rates| rates.other).sum::<f64>() / count;

	if mean_serious <= 0.0 || mean_other <= 0.0 {
		return Err(ScoreError::Undefined { what: "normalized event rate" });
	}

	let norm_serious = rates.serious / mean_serious;
	let norm_other = rates.other / mean_other;

	Ok(ADVERSE_EVENT_MAX
		* (1.0 - (SERIOUS_EVENT_WEIGHT * norm_serious + OTHER_EVENT_WEIGHT * norm_other)))
}

pub fn retention_score(target: &TrialDocument) -> Result<f64, ScoreError> {
	if !target.has_results {
		return Ok(0.0);
	}

	let enrollment = positive_enrollment(target)?;
	let reasons = target
		.dropout_reasons
		.as_ref()
		.ok_or(ScoreError::MissingField { field: "participant flow" })?;
	let mut dropouts = 0_i64;

	for reason in reasons {
		let count = reason.num_subjects.ok_or(ScoreError::MissingField { field: "numSubjects" })?;

		dropouts += count;
	}

	let completers = enrollment - dropouts as f64;

	Ok(RETENTION_MAX * (completers / enrollment).clamp(0.0, 1.0))
}

fn event_rates(trial: &TrialDocument) -> Result<EventRates, ScoreError> {
	let enrollment = positive_enrollment(trial)?;
	let groups = trial
		.adverse_event_groups
		.as_ref()
		.ok_or(ScoreError::MissingField { field: "adverse event groups" })?;
	let mut serious = 0_i64;
	let mut other = 0_i64;

	for group in groups {
		serious += group
			.serious_num_affected
			.ok_or(ScoreError::MissingField { field: "seriousNumAffected" })?;
		other +=
			group.other_num_affected.ok_or(ScoreError::MissingField { field: "otherNumAffected" })?;
	}

	Ok(EventRates { serious: serious as f64 / enrollment, other: other as f64 / enrollment })
}

fn positive_enrollment(trial: &TrialDocument) -> Result<f64, ScoreError> {
	let count =
		trial.enrollment_count.ok_or(ScoreError::MissingField { field: "enrollment count" })?;

	if count <= 0 {
		return Err(ScoreError::InvalidValue { field: "enrollment count", value: count });
	}

	Ok(count as f64)
}

fn parse_date(raw: Option<&str>, field: &'static str) -> Result<TrialDate, ScoreError> {
	let raw = raw.ok_or(ScoreError::MissingField { field })?;

	TrialDate::parse(raw).map_err(|err| ScoreError::InvalidDate { message: err.to_string() })
}

fn degrade(target: &TrialDocument, part: &'static str, result: Result<f64, ScoreError>) -> f64 {
	match result {
		Ok(score) if score.is_finite() => score,
		Ok(score) => {
			tracing::debug!(document_id = %target.id, part, score, "Non-finite sub-score degraded to 0.");

			0.0
		},
		Err(err) => {
			tracing::debug!(document_id = %target.id, part, error = %err, "Sub-score degraded to 0.");

			0.0
		},
	}
}
