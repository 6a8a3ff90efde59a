use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: Search,
	#[serde(default)]
	pub scoring: Scoring,
	pub criteria: Criteria,
	#[serde(default)]
	pub metrics: Metrics,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Number of ranked documents kept after sorting.
	#[serde(default = "default_result_limit")]
	pub result_limit: u32,
	/// Upper bound on concurrent field lookups and embedding fetches.
	#[serde(default = "default_search_workers")]
	pub workers: u32,
	/// Default per-module weights, keyed by module name (e.g. "inclusionCriteria").
	pub weights: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct Scoring {
	#[serde(default = "default_scoring_workers")]
	pub workers: u32,
	#[serde(default = "default_score_precision")]
	pub score_precision: u32,
}
impl Default for Scoring {
	fn default() -> Self {
		Self { workers: default_scoring_workers(), score_precision: default_score_precision() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Criteria {
	pub categories: Vec<String>,
	pub fallback_category: String,
	#[serde(default = "default_fallback_tag")]
	pub fallback_tag: String,
	/// Buckets larger than this are halved recursively before an upstream merge pass.
	#[serde(default = "default_merge_batch_size")]
	pub merge_batch_size: u32,
	#[serde(default)]
	pub excluded_tags: Vec<String>,
	#[serde(default)]
	pub default_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Metrics {
	#[serde(default = "default_range_size")]
	pub range_size: u32,
}
impl Default for Metrics {
	fn default() -> Self {
		Self { range_size: default_range_size() }
	}
}

fn default_result_limit() -> u32 {
	100
}

fn default_search_workers() -> u32 {
	6
}

fn default_scoring_workers() -> u32 {
	5
}

fn default_score_precision() -> u32 {
	2
}

fn default_fallback_tag() -> String {
	"Others".to_string()
}

fn default_merge_batch_size() -> u32 {
	25
}

fn default_range_size() -> u32 {
	50
}
