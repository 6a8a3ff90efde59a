use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, ModuleScores, Result};

const UNKNOWN: &str = "Unknown";

/// Read-only view of one registry record, flattened to the fields scoring and filtering use.
///
/// Optional fields stay `None` when the record lacks them so each consumer can decide how to
/// degrade.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialDocument {
	pub id: String,
	#[serde(default)]
	pub module_scores: ModuleScores,
	#[serde(default)]
	pub locations: BTreeSet<String>,
	#[serde(default)]
	pub site_count: usize,
	#[serde(default)]
	pub phases: Vec<String>,
	pub enrollment_count: Option<i64>,
	pub start_date: Option<String>,
	pub primary_completion_date: Option<String>,
	/// Actual completion date; doubles as the end date for range filtering.
	pub completion_date: Option<String>,
	/// Completion date taken from the earliest recorded protocol version.
	pub estimated_completion_date: Option<String>,
	#[serde(default)]
	pub sponsor_type: String,
	#[serde(default)]
	pub has_results: bool,
	pub adverse_event_groups: Option<Vec<AdverseEventGroup>>,
	pub dropout_reasons: Option<Vec<DropoutReason>>,
}
impl TrialDocument {
	/// Metadata for a candidate whose record could not be fetched.
	pub fn placeholder(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			phases: vec![UNKNOWN.to_string()],
			enrollment_count: Some(0),
			sponsor_type: UNKNOWN.to_string(),
			..Default::default()
		}
	}

	/// Flattens a registry record and, when available, its protocol version history.
	pub fn from_record(record: &Value, versions: Option<&Value>) -> Result<Self> {
		let id = pointer_str(record, "/protocolSection/identificationModule/nctId")
			.or_else(|| pointer_str(record, "/nctId"))
			.ok_or(Error::MissingField { field: "protocolSection.identificationModule.nctId" })?;
		let sites = record
			.pointer("/protocolSection/contactsLocationsModule/locations")
			.and_then(Value::as_array);
		let locations = sites
			.map(|sites| {
				sites
					.iter()
					.filter_map(|site| site.get("country").and_then(Value::as_str))
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();
		let phases = record
			.pointer("/protocolSection/designModule/phases")
			.and_then(Value::as_array)
			.map(|phases| {
				phases.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>()
			})
			.unwrap_or_else(|| vec![UNKNOWN.to_string()]);
		let estimated_completion_date = versions.and_then(|versions| {
			pointer_str(
				versions,
				"/versions/0/study/protocolSection/statusModule/completionDateStruct/date",
			)
		});

		Ok(Self {
			id,
			module_scores: ModuleScores::new(),
			locations,
			site_count: sites.map(Vec::len).unwrap_or(0),
			phases,
			enrollment_count: record
				.pointer("/protocolSection/designModule/enrollmentInfo/count")
				.and_then(as_count),
			start_date: pointer_str(record, "/protocolSection/statusModule/startDateStruct/date"),
			primary_completion_date: pointer_str(
				record,
				"/protocolSection/statusModule/primaryCompletionDateStruct/date",
			),
			completion_date: pointer_str(
				record,
				"/protocolSection/statusModule/completionDateStruct/date",
			),
			estimated_completion_date,
			sponsor_type: pointer_str(
				record,
				"/protocolSection/sponsorCollaboratorsModule/leadSponsor/class",
			)
			.unwrap_or_else(|| UNKNOWN.to_string()),
			has_results: record.get("hasResults").and_then(Value::as_bool).unwrap_or(false),
			adverse_event_groups: record
				.pointer("/resultsSection/adverseEventsModule/eventGroups")
				.and_then(Value::as_array)
				.map(|groups| groups.iter().map(AdverseEventGroup::from_value).collect()),
			dropout_reasons: record
				.pointer("/resultsSection/participantFlowModule/periods")
				.and_then(Value::as_array)
				.map(|periods| collect_dropout_reasons(periods)),
		})
	}
}

impl AsRef<TrialDocument> for TrialDocument {
	fn as_ref(&self) -> &TrialDocument {
		self
	}
}

/// Affected-participant counts for one arm of the adverse-events table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseEventGroup {
	pub serious_num_affected: Option<i64>,
	pub other_num_affected: Option<i64>,
}
impl AdverseEventGroup {
	fn from_value(value: &Value) -> Self {
		Self {
			serious_num_affected: value.get("seriousNumAffected").and_then(as_count),
			other_num_affected: value.get("otherNumAffected").and_then(as_count),
		}
	}
}

/// One reported withdrawal reason. `num_subjects` is `None` when the registry value is not a
/// whole number.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoutReason {
	pub period: Option<String>,
	pub reason: Option<String>,
	pub num_subjects: Option<i64>,
}

/// Groups documents by id; later duplicates replace earlier ones.
pub fn index_by_id(documents: Vec<TrialDocument>) -> BTreeMap<String, TrialDocument> {
	documents.into_iter().map(|document| (document.id.clone(), document)).collect()
}

fn collect_dropout_reasons(periods: &[Value]) -> Vec<DropoutReason> {
	let mut out = Vec::new();

	for period in periods {
		let title = period.get("title").and_then(Value::as_str).map(str::to_string);
		let withdraws = period.get("dropWithdraws").and_then(Value::as_array);

		for withdraw in withdraws.into_iter().flatten() {
			let kind = withdraw.get("type").and_then(Value::as_str);
			let reasons = withdraw.get("reasons").and_then(Value::as_array);

			for reason in reasons.into_iter().flatten() {
				out.push(DropoutReason {
					period: title.clone(),
					reason: kind.map(str::to_string),
					num_subjects: reason.get("numSubjects").and_then(as_count),
				});
			}
		}
	}

	out
}

fn pointer_str(value: &Value, pointer: &str) -> Option<String> {
	value
		.pointer(pointer)
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.map(str::to_string)
}

/// Registry counts arrive as integers, integral floats, or numeric strings.
fn as_count(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) => number.as_i64().or_else(|| {
			number.as_f64().filter(|value| value.fract() == 0.0).map(|value| value as i64)
		}),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::trial::{TrialDocument, as_count};

	#[test]
	fn counts_accept_numeric_strings_and_integral_floats() {
		assert_eq!(as_count(&json!(12)), Some(12));
		assert_eq!(as_count(&json!(12.0)), Some(12));
		assert_eq!(as_count(&json!(" 7 ")), Some(7));
		assert_eq!(as_count(&json!(1.5)), None);
		assert_eq!(as_count(&json!("n/a")), None);
		assert_eq!(as_count(&json!(null)), None);
	}

	#[test]
	fn record_without_id_is_rejected() {
		assert!(TrialDocument::from_record(&json!({ "protocolSection": {} }), None).is_err());
	}
}
