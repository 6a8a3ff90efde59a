use std::collections::{BTreeMap, BTreeSet};

use rayon::{ThreadPool, prelude::*};

use trialscope_domain::{CategorizedCriteria, CriteriaItem, ScoreBreakdown, TrialDocument};

use crate::criteria::{operational, round_to};

/// Every trial id referenced by any item's source map.
pub fn source_trial_ids(categories: &CategorizedCriteria) -> BTreeSet<String> {
	categories
		.values()
		.flat_map(|buckets| buckets.items())
		.flat_map(|item| item.source.keys().cloned())
		.collect()
}

/// Scores each trial against the batch with itself left out.
///
/// `documents` must already hold the whole batch; nothing is fetched while scoring. A trial
/// missing from `documents` scores zero, and missing cohort members are skipped.
pub fn score_sources(
	pool: &ThreadPool,
	trial_ids: &BTreeSet<String>,
	batch_ids: &[String],
	documents: &BTreeMap<String, TrialDocument>,
) -> BTreeMap<String, ScoreBreakdown> {
	pool.install(|| {
		trial_ids
			.par_iter()
			.map(|trial_id| (trial_id.clone(), score_one(trial_id, batch_ids, documents)))
			.collect()
	})
}

/// Writes operational score, source count, and best source into every item.
pub fn propagate_scores(
	categories: &mut CategorizedCriteria,
	scores: &BTreeMap<String, ScoreBreakdown>,
	precision: u32,
) {
	for buckets in categories.values_mut() {
		for item in buckets.inclusion.iter_mut().chain(buckets.exclusion.iter_mut()) {
			apply_item(item, scores, precision);
		}
	}
}

fn score_one(
	trial_id: &str,
	batch_ids: &[String],
	documents: &BTreeMap<String, TrialDocument>,
) -> ScoreBreakdown {
	let Some(target) = documents.get(trial_id) else {
		tracing::warn!(trial_id, "Source trial is missing from the batch; scoring zero.");

		return ScoreBreakdown::zero();
	};
	let mut cohort = Vec::with_capacity(batch_ids.len());

	for id in batch_ids.iter().filter(|id| id.as_str() != trial_id) {
		match documents.get(id) {
			Some(document) => cohort.push(document),
			None => tracing::debug!(trial_id, cohort_id = %id, "Cohort trial has no document."),
		}
	}

	operational::score_trial(target, &cohort)
}

fn apply_item(item: &mut CriteriaItem, scores: &BTreeMap<String, ScoreBreakdown>, precision: u32) {
	let mut best: Option<(&str, f64)> = None;

	for trial_id in item.source.keys() {
		let total = scores
			.get(trial_id)
			.map(|breakdown| breakdown.total)
			.filter(|total| total.is_finite())
			.unwrap_or(0.0);

		if best.is_none_or(|(_, current)| total > current) {
			best = Some((trial_id.as_str(), total));
		}
	}

	let best_trial_id = best.map(|(trial_id, _)| trial_id.to_string());
	let best_total = best.map(|(_, total)| total).unwrap_or(0.0);

	item.operational_score = round_to(best_total.max(0.0), precision);
	item.source_count = item.source.len();
	item.best_trial_id = best_trial_id;
}
