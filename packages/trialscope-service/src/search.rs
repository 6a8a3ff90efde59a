pub mod combine;
pub mod filter;
pub mod ranking;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use filter::FilterImpact;
pub use ranking::RankedDocument;
use trialscope_domain::{Filters, Module, ModuleScores, SimilarityWeights, TrialDocument, trial};

use crate::{
	Error, ModuleEmbeddings, PartialMatch, Result, TrialScopeService, pool,
	search::ranking::ScoredCandidate,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	/// Query text per module. Blank fields are not searched and not ranked.
	pub query: BTreeMap<Module, String>,
	/// Query embeddings per module, computed by the caller's embedding provider.
	#[serde(default)]
	pub query_embeddings: ModuleEmbeddings,
	#[serde(default)]
	pub weights: Option<SimilarityWeights>,
	#[serde(default)]
	pub filters: Filters,
	/// Registry metadata for candidate documents.
	#[serde(default)]
	pub documents: Vec<TrialDocument>,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub results: Vec<RankedDocument>,
	pub candidate_count: usize,
	pub filter_impact: FilterImpact,
}

struct Candidate {
	best_match: PartialMatch,
	document: TrialDocument,
}
impl AsRef<TrialDocument> for Candidate {
	fn as_ref(&self) -> &TrialDocument {
		&self.document
	}
}

impl TrialScopeService {
	pub fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let weights = match req.weights {
			Some(weights) => {
				weights.validate()?;

				weights
			},
			None => SimilarityWeights::from_named(&self.cfg.search.weights)?,
		};

		if weights.is_empty() {
			return Err(Error::InvalidRequest {
				message: "weights must contain at least one positive weight.".to_string(),
			});
		}

		let limit = req.limit.unwrap_or(self.cfg.search.result_limit) as usize;
		let active: Vec<(Module, &str)> = req
			.query
			.iter()
			.map(|(module, text)| (*module, text.trim()))
			.filter(|(_, text)| !text.is_empty())
			.collect();

		if active.is_empty() {
			return Err(Error::InvalidRequest {
				message: "query must contain at least one non-empty field.".to_string(),
			});
		}

		let query_embeddings: ModuleEmbeddings = req
			.query_embeddings
			.iter()
			.filter(|(module, _)| active.iter().any(|(active, _)| active == *module))
			.map(|(module, vector)| (*module, vector.clone()))
			.collect();
		let pool = pool::build(self.cfg.search.workers, "search")?;
		let per_field: Vec<Option<Vec<PartialMatch>>> = pool.install(|| {
			active.par_iter().map(|(module, text)| self.search_field(*module, text)).collect()
		});

		if per_field.iter().all(Option::is_none) {
			return Err(Error::Provider { message: "every field search failed.".to_string() });
		}

		let combined = combine::combine_matches(per_field.into_iter().flatten().flatten());
		let mut metadata = trial::index_by_id(req.documents);
		let candidates: Vec<Candidate> = combined
			.into_iter()
			.map(|best_match| {
				let document = metadata.remove(&best_match.document_id).unwrap_or_else(|| {
					tracing::debug!(
						document_id = %best_match.document_id,
						"Candidate has no registry metadata; using placeholder."
					);

					TrialDocument::placeholder(best_match.document_id.as_str())
				});

				Candidate { best_match, document }
			})
			.collect();
		let candidate_count = candidates.len();
		let (kept, filter_impact) = filter::apply_filters(candidates, &req.filters);
		let active_modules: Vec<Module> = active.iter().map(|(module, _)| *module).collect();
		let scored: Vec<ScoredCandidate> = pool.install(|| {
			kept.into_par_iter()
				.filter_map(|candidate| {
					self.score_candidate(candidate, &active_modules, &query_embeddings)
				})
				.collect()
		});
		let results = ranking::rank_documents(scored, &weights, limit);

		tracing::debug!(candidate_count, ranked = results.len(), "Search completed.");

		Ok(SearchResponse { results, candidate_count, filter_impact })
	}

	/// Returns `None` when the lookup failed; other fields still contribute.
	fn search_field(&self, module: Module, text: &str) -> Option<Vec<PartialMatch>> {
		match self.providers.searcher.search(module, text) {
			Ok(matches) => Some(matches),
			Err(err) => {
				tracing::warn!(module = %module, error = %err, "Field search failed.");

				None
			},
		}
	}

	/// Module similarities come from supplied scores when present, otherwise from embeddings.
	/// A candidate whose embeddings cannot be fetched is dropped.
	fn score_candidate(
		&self,
		candidate: Candidate,
		active_modules: &[Module],
		query_embeddings: &ModuleEmbeddings,
	) -> Option<ScoredCandidate> {
		let Candidate { best_match, document } = candidate;
		let module_scores: ModuleScores = if document.module_scores.is_empty() {
			match self.providers.embeddings.document_embeddings(&document.id) {
				Ok(embeddings) => ranking::module_similarities(query_embeddings, &embeddings),
				Err(err) => {
					tracing::warn!(
						document_id = %document.id,
						error = %err,
						"Embedding fetch failed; dropping candidate."
					);

					return None;
				},
			}
		} else {
			document
				.module_scores
				.iter()
				.filter(|(module, _)| active_modules.contains(module))
				.map(|(module, score)| (*module, *score))
				.collect()
		};

		Some(ScoredCandidate {
			document_id: document.id,
			module_scores,
			best_match: Some(best_match),
		})
	}
}
