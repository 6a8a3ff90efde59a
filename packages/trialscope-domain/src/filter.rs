use serde::{Deserialize, Serialize};

/// How multiple location filters combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryLogic {
	And,
	#[default]
	Or,
}

/// Structured post-filters for the search path. Every unset field passes all documents.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
	#[serde(default)]
	pub phases: Vec<String>,
	#[serde(default)]
	pub locations: Vec<String>,
	#[serde(default)]
	pub country_logic: CountryLogic,
	#[serde(default)]
	pub sponsor_type: Option<String>,
	#[serde(default)]
	pub start_date: Option<String>,
	#[serde(default)]
	pub end_date: Option<String>,
	#[serde(default)]
	pub sample_size_min: Option<i64>,
	#[serde(default)]
	pub sample_size_max: Option<i64>,
}
impl Filters {
	pub fn is_empty(&self) -> bool {
		self.phases.is_empty()
			&& self.locations.is_empty()
			&& self.sponsor_type.as_deref().is_none_or(str::is_empty)
			&& (self.start_date.is_none() || self.end_date.is_none())
			&& (self.sample_size_min.is_none() || self.sample_size_max.is_none())
	}
}
