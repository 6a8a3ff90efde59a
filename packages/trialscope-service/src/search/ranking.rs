use std::cmp::Ordering;

use serde::Serialize;

use trialscope_domain::{ModuleScores, SimilarityWeights};

use crate::{ModuleEmbeddings, PartialMatch};

/// A filtered candidate with its per-module similarity values.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
	pub document_id: String,
	pub module_scores: ModuleScores,
	pub best_match: Option<PartialMatch>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDocument {
	pub document_id: String,
	pub combined_score: f64,
	pub module_scores: ModuleScores,
	pub weighted_module_scores: ModuleScores,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub best_match: Option<PartialMatch>,
}

/// Weighted mean of the module similarities, over modules with a positive weight.
///
/// Returns `None` when no weighted module overlaps the document's scores.
pub fn combined_score(module_scores: &ModuleScores, weights: &SimilarityWeights) -> Option<f64> {
	let mut weighted_sum = 0.0;
	let mut weight_sum = 0.0;

	for (module, score) in module_scores {
		let weight = weights.weight(*module);

		if weight <= 0.0 || !score.is_finite() {
			continue;
		}

		weighted_sum += score * weight;
		weight_sum += weight;
	}

	if weight_sum <= 0.0 {
		return None;
	}

	Some(weighted_sum / weight_sum)
}

/// Scores, sorts descending, and truncates to `limit`.
///
/// The sort is stable, so equal scores keep their input order.
pub fn rank_documents(
	candidates: Vec<ScoredCandidate>,
	weights: &SimilarityWeights,
	limit: usize,
) -> Vec<RankedDocument> {
	let mut ranked: Vec<RankedDocument> = candidates
		.into_iter()
		.filter_map(|candidate| {
			let Some(combined) = combined_score(&candidate.module_scores, weights) else {
				tracing::debug!(
					document_id = %candidate.document_id,
					"Candidate has no weighted module overlap with the query."
				);

				return None;
			};
			let weighted_module_scores = candidate
				.module_scores
				.iter()
				.map(|(module, score)| (*module, score * weights.weight(*module)))
				.collect();

			Some(RankedDocument {
				document_id: candidate.document_id,
				combined_score: combined,
				module_scores: candidate.module_scores,
				weighted_module_scores,
				best_match: candidate.best_match,
			})
		})
		.collect();

	ranked.sort_by(|left, right| cmp_f64_desc(left.combined_score, right.combined_score));
	ranked.truncate(limit);

	ranked
}

/// Cosine similarity per module present in both the query and the document.
pub fn module_similarities(query: &ModuleEmbeddings, document: &ModuleEmbeddings) -> ModuleScores {
	query
		.iter()
		.filter_map(|(module, query_vec)| {
			let document_vec = document.get(module)?;

			cosine_similarity(query_vec, document_vec).map(|score| (*module, f64::from(score)))
		})
		.collect()
}

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

pub fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
