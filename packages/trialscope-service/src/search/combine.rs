use std::collections::HashMap;

use crate::PartialMatch;

/// Reduces per-field hits to the best hit per document, in first-seen document order.
///
/// A later hit replaces the kept one only when its score is strictly higher, so equal
/// scores keep the first-seen entry. NaN scores never win against a real score.
pub fn combine_matches<I>(matches: I) -> Vec<PartialMatch>
where
	I: IntoIterator<Item = PartialMatch>,
{
	let mut best: Vec<PartialMatch> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for candidate in matches {
		match index.get(&candidate.document_id).copied() {
			Some(position) =>
				if beats(candidate.score, best[position].score) {
					best[position] = candidate;
				},
			None => {
				index.insert(candidate.document_id.clone(), best.len());
				best.push(candidate);
			},
		}
	}

	best
}

fn beats(score: f64, incumbent: f64) -> bool {
	!score.is_nan() && (incumbent.is_nan() || score > incumbent)
}

#[cfg(test)]
mod tests {
	use trialscope_domain::Module;

	use crate::{PartialMatch, search::combine::combine_matches};

	fn hit(id: &str, module: Module, score: f64) -> PartialMatch {
		PartialMatch { document_id: id.to_string(), module, score }
	}

	fn best<'a>(combined: &'a [PartialMatch], id: &str) -> &'a PartialMatch {
		combined.iter().find(|hit| hit.document_id == id).expect("Document must be combined.")
	}

	#[test]
	fn keeps_highest_score_per_document() {
		let combined = combine_matches(vec![
			hit("NCT01", Module::Title, 0.4),
			hit("NCT02", Module::Title, 0.9),
			hit("NCT01", Module::Condition, 0.8),
			hit("NCT01", Module::Rationale, 0.6),
		]);

		assert_eq!(combined.len(), 2);
		assert_eq!(best(&combined, "NCT01").module, Module::Condition);
		assert_eq!(best(&combined, "NCT02").score, 0.9);
	}

	#[test]
	fn equal_scores_keep_first_seen() {
		let combined = combine_matches(vec![
			hit("NCT01", Module::Title, 0.5),
			hit("NCT01", Module::Condition, 0.5),
		]);

		assert_eq!(best(&combined, "NCT01").module, Module::Title);
	}

	#[test]
	fn nan_score_loses_to_real_score() {
		let combined = combine_matches(vec![
			hit("NCT01", Module::Title, f64::NAN),
			hit("NCT01", Module::Condition, 0.1),
		]);

		assert_eq!(best(&combined, "NCT01").module, Module::Condition);
	}

	#[test]
	fn documents_keep_discovery_order() {
		let combined = combine_matches(vec![
			hit("NCT09", Module::Condition, 0.2),
			hit("NCT01", Module::Condition, 0.9),
			hit("NCT09", Module::Title, 0.95),
			hit("NCT05", Module::Title, 0.1),
		]);
		let ids: Vec<&str> = combined.iter().map(|hit| hit.document_id.as_str()).collect();

		assert_eq!(ids, vec!["NCT09", "NCT01", "NCT05"]);
		assert_eq!(combined[0].module, Module::Title);
	}
}
