pub mod batch;
pub mod merge;
pub mod operational;
pub mod percentile;
pub mod propagate;
pub mod tags;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use batch::MergeBatchPlan;
use trialscope_domain::{CategorizedCriteria, CriteriaItem, ScoreBreakdown, TrialDocument, trial};

use crate::{Result, TrialScopeService, pool};

const CRITERIA_ID_PREFIX: &str = "cid_";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaRequest {
	#[serde(default)]
	pub inclusion: Vec<CriteriaItem>,
	#[serde(default)]
	pub exclusion: Vec<CriteriaItem>,
	/// Already categorized criteria. When set, `inclusion` and `exclusion` are ignored.
	#[serde(default)]
	pub categorized: Option<CategorizedCriteria>,
	/// Tag-merge items within each category side.
	#[serde(default = "default_consolidate")]
	pub consolidate: bool,
	/// The fully materialized batch of trial documents.
	#[serde(default)]
	pub documents: Vec<TrialDocument>,
	/// Trial ids forming the comparison batch. Defaults to the ids of `documents`.
	#[serde(default)]
	pub document_ids: Vec<String>,
}
impl Default for CriteriaRequest {
	fn default() -> Self {
		Self {
			inclusion: Vec::new(),
			exclusion: Vec::new(),
			categorized: None,
			consolidate: default_consolidate(),
			documents: Vec::new(),
			document_ids: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaResponse {
	pub categories: CategorizedCriteria,
	pub trial_scores: BTreeMap<String, ScoreBreakdown>,
	/// Items per normalized tag, seeded with every configured default tag.
	pub tag_counts: BTreeMap<String, usize>,
}

impl TrialScopeService {
	pub fn score_criteria(&self, req: CriteriaRequest) -> Result<CriteriaResponse> {
		let consolidate = req.consolidate;
		let batch_ids = batch_ids(&req);
		let mut categories = self.prepare_categories(req.inclusion, req.exclusion, req.categorized);

		if consolidate {
			categories = merge::consolidate(
				categories,
				&self.cfg.criteria.fallback_tag,
				&self.cfg.criteria.excluded_tags,
			);
		}

		let documents = trial::index_by_id(req.documents);
		let trial_ids = propagate::source_trial_ids(&categories);
		let pool = pool::build(self.cfg.scoring.workers, "scoring")?;
		let trial_scores = propagate::score_sources(&pool, &trial_ids, &batch_ids, &documents);
		let precision = self.cfg.scoring.score_precision;

		propagate::propagate_scores(&mut categories, &trial_scores, precision);
		percentile::assign_percentiles(&mut categories, precision);

		let tag_counts = tag_counts(&categories, &self.cfg.criteria.default_tags);

		tracing::info!(
			categories = categories.len(),
			trials = trial_scores.len(),
			batch = batch_ids.len(),
			"Scored criteria."
		);

		Ok(CriteriaResponse { categories, trial_scores, tag_counts })
	}

	/// Categorizes raw criteria and splits each side into batches of at most
	/// `criteria.merge_batch_size` items for the downstream merge step.
	pub fn plan_merge_batches(&self, req: CriteriaRequest) -> Vec<MergeBatchPlan> {
		let categories = self.prepare_categories(req.inclusion, req.exclusion, req.categorized);

		batch::plan_merge_batches(&categories, self.cfg.criteria.merge_batch_size as usize)
	}

	fn prepare_categories(
		&self,
		inclusion: Vec<CriteriaItem>,
		exclusion: Vec<CriteriaItem>,
		categorized: Option<CategorizedCriteria>,
	) -> CategorizedCriteria {
		match categorized {
			Some(mut categorized) => {
				for buckets in categorized.values_mut() {
					buckets.inclusion.iter_mut().for_each(prepare_item);
					buckets.exclusion.iter_mut().for_each(prepare_item);
				}

				categorized
			},
			None => {
				let inclusion = prepared(inclusion);
				let exclusion = prepared(exclusion);

				merge::categorize(
					&inclusion,
					&exclusion,
					&self.cfg.criteria.categories,
					&self.cfg.criteria.fallback_category,
				)
			},
		}
	}
}

/// Rounds half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
	let factor = 10_f64.powi(precision as i32);

	(value * factor).round() / factor
}

fn default_consolidate() -> bool {
	true
}

fn batch_ids(req: &CriteriaRequest) -> Vec<String> {
	let ids = if req.document_ids.is_empty() {
		req.documents.iter().map(|document| document.id.clone()).collect()
	} else {
		req.document_ids.clone()
	};
	let mut seen = HashSet::new();

	ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn tag_counts(categories: &CategorizedCriteria, default_tags: &[String]) -> BTreeMap<String, usize> {
	let mut counts: BTreeMap<String, usize> =
		default_tags.iter().map(|tag| (merge::normalize_tag(tag), 0)).collect();

	for item in categories.values().flat_map(|buckets| buckets.items()) {
		let mut tags: Vec<String> = item.tags.iter().map(|tag| merge::normalize_tag(tag)).collect();

		tags.sort();
		tags.dedup();

		for tag in tags.into_iter().filter(|tag| !tag.is_empty()) {
			*counts.entry(tag).or_insert(0) += 1;
		}
	}

	counts
}

fn prepared(mut items: Vec<CriteriaItem>) -> Vec<CriteriaItem> {
	items.iter_mut().for_each(prepare_item);

	items
}

fn prepare_item(item: &mut CriteriaItem) {
	if item.id.trim().is_empty() {
		item.id = format!("{CRITERIA_ID_PREFIX}{}", Uuid::new_v4());
	}

	tags::resolve_tags(item);

	item.source_count = item.source.len();
}

#[cfg(test)]
mod tests {
	use crate::criteria::round_to;

	#[test]
	fn rounding_respects_precision() {
		assert_eq!(round_to(12.345_67, 2), 12.35);
		assert_eq!(round_to(-1.005, 0), -1.0);
		assert_eq!(round_to(7.0, 2), 7.0);
	}
}
