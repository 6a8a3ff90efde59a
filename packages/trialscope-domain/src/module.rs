use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-module similarity values for one document.
pub type ModuleScores = BTreeMap<Module, f64>;

/// A named text field searched and scored independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Module {
	#[serde(rename = "inclusionCriteria")]
	InclusionCriteria,
	#[serde(rename = "exclusionCriteria")]
	ExclusionCriteria,
	#[serde(rename = "rationale")]
	Rationale,
	#[serde(rename = "condition")]
	Condition,
	#[serde(rename = "trialOutcomes")]
	Outcome,
	#[serde(rename = "title")]
	Title,
}
impl Module {
	pub const ALL: [Self; 6] = [
		Self::InclusionCriteria,
		Self::ExclusionCriteria,
		Self::Rationale,
		Self::Condition,
		Self::Outcome,
		Self::Title,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::InclusionCriteria => "inclusionCriteria",
			Self::ExclusionCriteria => "exclusionCriteria",
			Self::Rationale => "rationale",
			Self::Condition => "condition",
			Self::Outcome => "trialOutcomes",
			Self::Title => "title",
		}
	}
}
impl FromStr for Module {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|module| module.as_str() == raw)
			.ok_or_else(|| Error::UnknownModule { name: raw.to_string() })
	}
}
impl fmt::Display for Module {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Non-negative weight per module. Absent modules weigh zero.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SimilarityWeights(BTreeMap<Module, f64>);
impl SimilarityWeights {
	pub fn new(weights: BTreeMap<Module, f64>) -> Result<Self> {
		let weights = Self(weights);

		weights.validate()?;

		Ok(weights)
	}

	/// Builds weights from string-keyed configuration, rejecting unknown module names.
	pub fn from_named(named: &BTreeMap<String, f64>) -> Result<Self> {
		let mut weights = BTreeMap::new();

		for (name, weight) in named {
			weights.insert(name.parse::<Module>()?, *weight);
		}

		Self::new(weights)
	}

	pub fn validate(&self) -> Result<()> {
		for (module, weight) in &self.0 {
			if !weight.is_finite() {
				return Err(Error::InvalidWeight {
					module: module.to_string(),
					message: "weight must be a finite number.".to_string(),
				});
			}
			if *weight < 0.0 {
				return Err(Error::InvalidWeight {
					module: module.to_string(),
					message: "weight must be zero or greater.".to_string(),
				});
			}
		}

		Ok(())
	}

	pub fn weight(&self, module: Module) -> f64 {
		self.0.get(&module).copied().unwrap_or(0.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.values().all(|weight| *weight == 0.0)
	}
}
