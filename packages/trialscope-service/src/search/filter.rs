use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use trialscope_domain::{CountryLogic, Filters, TrialDate, TrialDocument};

#[derive(Clone, Debug, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FilterCompileError {
	field: &'static str,
	message: String,
}

/// First check a dropped document failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
	Phase,
	Location,
	Sponsor,
	DateRange,
	SampleSize,
}
impl DropReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Phase => "phase",
			Self::Location => "location",
			Self::Sponsor => "sponsor",
			Self::DateRange => "date_range",
			Self::SampleSize => "sample_size",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterImpact {
	pub applied: bool,
	pub candidate_count_pre: usize,
	pub candidate_count_post: usize,
	pub dropped_total: usize,
	pub drop_reasons: BTreeMap<String, usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skipped_reason: Option<String>,
}

/// Filters resolved once per request: dates parsed, optional bounds paired up.
#[derive(Debug)]
pub struct CompiledFilters<'a> {
	phases: HashSet<&'a str>,
	locations: &'a [String],
	country_logic: CountryLogic,
	sponsor_type: Option<&'a str>,
	date_range: Option<(TrialDate, TrialDate)>,
	sample_size: Option<(i64, i64)>,
}
impl<'a> CompiledFilters<'a> {
	pub fn compile(filters: &'a Filters) -> Result<Self, FilterCompileError> {
		let start = non_empty(filters.start_date.as_deref());
		let end = non_empty(filters.end_date.as_deref());
		let date_range = match (start, end) {
			(Some(start), Some(end)) => Some((
				TrialDate::parse(start).map_err(|err| FilterCompileError {
					field: "startDate",
					message: err.to_string(),
				})?,
				TrialDate::parse(end).map_err(|err| FilterCompileError {
					field: "endDate",
					message: err.to_string(),
				})?,
			)),
			_ => None,
		};
		let sample_size = filters.sample_size_min.zip(filters.sample_size_max);

		Ok(Self {
			phases: filters.phases.iter().map(String::as_str).collect(),
			locations: filters.locations.as_slice(),
			country_logic: filters.country_logic,
			sponsor_type: non_empty(filters.sponsor_type.as_deref()),
			date_range,
			sample_size,
		})
	}

	pub fn check(&self, document: &TrialDocument) -> Result<(), DropReason> {
		if !self.passes_phases(document) {
			return Err(DropReason::Phase);
		}
		if !self.passes_locations(document) {
			return Err(DropReason::Location);
		}
		if let Some(sponsor) = self.sponsor_type
			&& document.sponsor_type != sponsor
		{
			return Err(DropReason::Sponsor);
		}
		if !self.passes_dates(document) {
			return Err(DropReason::DateRange);
		}
		if let Some((min, max)) = self.sample_size {
			let Some(count) = document.enrollment_count else {
				return Err(DropReason::SampleSize);
			};

			if !(min..=max).contains(&count) {
				return Err(DropReason::SampleSize);
			}
		}

		Ok(())
	}

	fn passes_phases(&self, document: &TrialDocument) -> bool {
		self.phases.is_empty()
			|| document.phases.iter().any(|phase| self.phases.contains(phase.as_str()))
	}

	fn passes_locations(&self, document: &TrialDocument) -> bool {
		if self.locations.is_empty() {
			return true;
		}

		match self.country_logic {
			CountryLogic::And =>
				self.locations.iter().all(|location| document.locations.contains(location)),
			CountryLogic::Or =>
				self.locations.iter().any(|location| document.locations.contains(location)),
		}
	}

	fn passes_dates(&self, document: &TrialDocument) -> bool {
		let Some((lower, upper)) = self.date_range else {
			return true;
		};
		let within = |raw: Option<&str>| {
			let Some(raw) = raw else {
				return false;
			};

			match TrialDate::parse(raw) {
				Ok(date) => lower <= date && date <= upper,
				Err(err) => {
					tracing::debug!(document_id = %document.id, error = %err, "Unparseable trial date.");

					false
				},
			}
		};

		within(document.start_date.as_deref()) && within(document.completion_date.as_deref())
	}
}

/// Keeps the documents passing every configured filter, preserving input order.
///
/// A filter set that cannot be compiled leaves the input untouched.
pub fn apply_filters<T>(documents: Vec<T>, filters: &Filters) -> (Vec<T>, FilterImpact)
where
	T: AsRef<TrialDocument>,
{
	let pre = documents.len();

	if filters.is_empty() {
		return (
			documents,
			FilterImpact { candidate_count_pre: pre, candidate_count_post: pre, ..Default::default() },
		);
	}

	let compiled = match CompiledFilters::compile(filters) {
		Ok(compiled) => compiled,
		Err(err) => {
			tracing::warn!(error = %err, "Malformed filters; returning candidates unfiltered.");

			return (
				documents,
				FilterImpact {
					candidate_count_pre: pre,
					candidate_count_post: pre,
					skipped_reason: Some(err.to_string()),
					..Default::default()
				},
			);
		},
	};
	let mut kept = Vec::with_capacity(pre);
	let mut drop_reasons: BTreeMap<String, usize> = BTreeMap::new();

	for document in documents {
		match compiled.check(document.as_ref()) {
			Ok(()) => kept.push(document),
			Err(reason) => *drop_reasons.entry(reason.as_str().to_string()).or_insert(0) += 1,
		}
	}

	let post = kept.len();

	tracing::debug!(pre, post, "Filtered candidates.");

	(
		kept,
		FilterImpact {
			applied: true,
			candidate_count_pre: pre,
			candidate_count_post: post,
			dropped_total: pre - post,
			drop_reasons,
			skipped_reason: None,
		},
	)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
