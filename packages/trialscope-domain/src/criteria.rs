use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category name to its inclusion and exclusion lists.
pub type CategorizedCriteria = BTreeMap<String, CriteriaBuckets>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum CriteriaSide {
	Inclusion,
	Exclusion,
}

/// One eligibility statement, possibly attributed to several source trials.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaItem {
	#[serde(default, alias = "criteriaID")]
	pub id: String,
	#[serde(alias = "criteria")]
	pub text: String,
	#[serde(default, alias = "class")]
	pub categories: Vec<String>,
	/// Source trial id to the statement that trial used.
	#[serde(default)]
	pub source: BTreeMap<String, String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub structured_tags: Vec<StructuredTag>,
	#[serde(default)]
	pub operational_score: f64,
	#[serde(default, alias = "count")]
	pub source_count: usize,
	#[serde(default)]
	pub percentile: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub best_trial_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CriteriaBuckets {
	#[serde(rename = "Inclusion", default)]
	pub inclusion: Vec<CriteriaItem>,
	#[serde(rename = "Exclusion", default)]
	pub exclusion: Vec<CriteriaItem>,
}
impl CriteriaBuckets {
	pub fn side(&self, side: CriteriaSide) -> &[CriteriaItem] {
		match side {
			CriteriaSide::Inclusion => &self.inclusion,
			CriteriaSide::Exclusion => &self.exclusion,
		}
	}

	pub fn side_mut(&mut self, side: CriteriaSide) -> &mut Vec<CriteriaItem> {
		match side {
			CriteriaSide::Inclusion => &mut self.inclusion,
			CriteriaSide::Exclusion => &mut self.exclusion,
		}
	}

	pub fn items(&self) -> impl Iterator<Item = &CriteriaItem> {
		self.inclusion.iter().chain(self.exclusion.iter())
	}
}

/// Tag as produced by the upstream extractor: a category plus either a boolean or a range.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredTag {
	pub category: String,
	#[serde(default)]
	pub boolean_value: Option<bool>,
	#[serde(default)]
	pub lower_limit: Option<Value>,
	#[serde(default)]
	pub upper_limit: Option<Value>,
}
