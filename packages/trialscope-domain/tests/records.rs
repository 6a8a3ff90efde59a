use std::collections::BTreeMap;

use serde_json::json;

use trialscope_domain::{CountryLogic, Filters, Module, SimilarityWeights, TrialDocument};

#[test]
fn full_record_flattens_results_and_versions() {
	let record = json!({
		"hasResults": true,
		"protocolSection": {
			"identificationModule": { "nctId": "NCT00000001" },
			"statusModule": {
				"startDateStruct": { "date": "2019-02" },
				"primaryCompletionDateStruct": { "date": "2020-08-15" },
				"completionDateStruct": { "date": "2021-01" }
			},
			"designModule": { "phases": ["PHASE2", "PHASE3"], "enrollmentInfo": { "count": 240 } },
			"sponsorCollaboratorsModule": { "leadSponsor": { "class": "NIH" } },
			"contactsLocationsModule": {
				"locations": [
					{ "facility": "A", "country": "United States" },
					{ "facility": "B", "country": "United States" },
					{ "facility": "C", "country": "Canada" }
				]
			}
		},
		"resultsSection": {
			"adverseEventsModule": {
				"eventGroups": [
					{ "seriousNumAffected": 3, "otherNumAffected": "12" },
					{ "seriousNumAffected": 1.0, "otherNumAffected": 9 }
				]
			},
			"participantFlowModule": {
				"periods": [{
					"title": "Overall Study",
					"dropWithdraws": [
						{ "type": "Adverse Event", "reasons": [{ "groupId": "FG000", "numSubjects": "4" }] },
						{ "type": "Lost to Follow-up", "reasons": [{ "groupId": "FG001", "numSubjects": 2 }] }
					]
				}]
			}
		}
	});
	let versions = json!({
		"versions": [{
			"study": {
				"protocolSection": { "statusModule": { "completionDateStruct": { "date": "2020-06" } } }
			}
		}]
	});
	let document = TrialDocument::from_record(&record, Some(&versions)).expect("Record must parse.");

	assert_eq!(document.id, "NCT00000001");
	assert_eq!(document.site_count, 3);
	assert_eq!(document.locations.len(), 2);
	assert_eq!(document.enrollment_count, Some(240));
	assert_eq!(document.sponsor_type, "NIH");
	assert_eq!(document.estimated_completion_date.as_deref(), Some("2020-06"));
	assert!(document.has_results);

	let groups = document.adverse_event_groups.expect("Event groups must be present.");

	assert_eq!(groups[0].other_num_affected, Some(12));
	assert_eq!(groups[1].serious_num_affected, Some(1));

	let reasons = document.dropout_reasons.expect("Dropouts must be present.");
	let total: i64 = reasons.iter().filter_map(|reason| reason.num_subjects).sum();

	assert_eq!(reasons.len(), 2);
	assert_eq!(total, 6);
	assert_eq!(reasons[0].period.as_deref(), Some("Overall Study"));
}

#[test]
fn sparse_record_defaults_to_unknowns() {
	let record = json!({ "protocolSection": { "identificationModule": { "nctId": "NCT02" } } });
	let document = TrialDocument::from_record(&record, None).expect("Record must parse.");

	assert_eq!(document.phases, vec!["Unknown".to_string()]);
	assert_eq!(document.sponsor_type, "Unknown");
	assert_eq!(document.enrollment_count, None);
	assert!(document.adverse_event_groups.is_none());
	assert!(!document.has_results);
}

#[test]
fn weights_reject_unknown_modules_and_negative_values() {
	let named = BTreeMap::from([("title".to_string(), 1.0), ("summary".to_string(), 1.0)]);

	assert!(SimilarityWeights::from_named(&named).is_err());

	let negative = BTreeMap::from([(Module::Title, -0.5)]);

	assert!(SimilarityWeights::new(negative).is_err());

	let weights = SimilarityWeights::new(BTreeMap::from([(Module::Condition, 2.0)]))
		.expect("Weights must be valid.");

	assert_eq!(weights.weight(Module::Condition), 2.0);
	assert_eq!(weights.weight(Module::Title), 0.0);
}

#[test]
fn filters_deserialize_from_camel_case() {
	let filters: Filters = serde_json::from_value(json!({
		"phases": ["PHASE1"],
		"locations": ["France"],
		"countryLogic": "AND",
		"sampleSizeMin": 10,
		"sampleSizeMax": 100
	}))
	.expect("Filters must deserialize.");

	assert_eq!(filters.country_logic, CountryLogic::And);
	assert_eq!(filters.sample_size_max, Some(100));
	assert!(!filters.is_empty());
	assert!(Filters::default().is_empty());
}
