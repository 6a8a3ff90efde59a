//! Descriptive statistics over a batch of trials, reported next to generated criteria.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use trialscope_domain::{TrialDate, TrialDocument};

use crate::TrialScopeService;

const DAYS_PER_WEEK: i64 = 7;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortMetrics {
	pub study_duration: Vec<RangeBucket>,
	pub site_count: Vec<RangeBucket>,
	pub enrollment_info: Vec<RangeBucket>,
	pub unique_countries: Vec<CountryMetric>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountryMetric {
	pub value: String,
	pub count: usize,
	pub source: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RangeBucket {
	pub value: String,
	pub count: usize,
	pub source: Vec<String>,
}

impl TrialScopeService {
	pub fn cohort_metrics(&self, documents: &[TrialDocument]) -> CohortMetrics {
		cohort_metrics(documents, self.cfg.metrics.range_size)
	}
}

pub fn cohort_metrics(documents: &[TrialDocument], range_size: u32) -> CohortMetrics {
	let range_size = i64::from(range_size.max(1));

	CohortMetrics {
		study_duration: histogram(documents, range_size, study_duration_weeks),
		site_count: histogram(documents, range_size, |document| document.site_count.max(1) as i64),
		enrollment_info: histogram(documents, range_size, |document| {
			document.enrollment_count.unwrap_or(0)
		}),
		unique_countries: unique_countries(documents),
	}
}

/// Trials per country, most common first; ties ordered by country name.
pub fn unique_countries(documents: &[TrialDocument]) -> Vec<CountryMetric> {
	let mut by_country: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

	for document in documents {
		for country in &document.locations {
			by_country.entry(country.as_str()).or_default().insert(document.id.as_str());
		}
	}

	let mut metrics: Vec<CountryMetric> = by_country
		.into_iter()
		.map(|(country, ids)| CountryMetric {
			value: country.to_string(),
			count: ids.len(),
			source: ids.into_iter().map(str::to_string).collect(),
		})
		.collect();

	metrics.sort_by(|left, right| right.count.cmp(&left.count));

	metrics
}

/// Whole weeks from start to primary completion, falling back to completion. Unknown or
/// negative durations count as zero.
pub fn study_duration_weeks(document: &TrialDocument) -> i64 {
	let start = document.start_date.as_deref().and_then(|raw| TrialDate::parse(raw).ok());
	let end = document
		.primary_completion_date
		.as_deref()
		.or(document.completion_date.as_deref())
		.and_then(|raw| TrialDate::parse(raw).ok());

	match start.zip(end) {
		Some((start, end)) => start.days_until(end).div_euclid(DAYS_PER_WEEK).max(0),
		None => {
			tracing::debug!(document_id = %document.id, "Study duration unknown.");

			0
		},
	}
}

pub fn bucket_label(value: i64, range_size: i64) -> (i64, String) {
	let lower = value.div_euclid(range_size) * range_size;

	(lower, format!("{lower}-{}", lower + range_size))
}

fn histogram<F>(documents: &[TrialDocument], range_size: i64, value: F) -> Vec<RangeBucket>
where
	F: Fn(&TrialDocument) -> i64,
{
	let mut buckets: BTreeMap<i64, RangeBucket> = BTreeMap::new();

	for document in documents {
		let (lower, label) = bucket_label(value(document), range_size);
		let bucket = buckets.entry(lower).or_insert_with(|| RangeBucket {
			value: label,
			count: 0,
			source: Vec::new(),
		});

		bucket.count += 1;
		bucket.source.push(document.id.clone());
	}

	buckets.into_values().collect()
}
