use std::collections::BTreeMap;

use proptest::prelude::*;

use trialscope_domain::{
	AdverseEventGroup, DropoutReason, Module, TrialDocument,
	score::{DURATION_MAX, ENROLLMENT_MAX, RETENTION_MAX},
};
use trialscope_service::{
	PartialMatch,
	criteria::{operational, percentile},
	search::combine,
};

fn matches_strategy() -> impl Strategy<Value = Vec<PartialMatch>> {
	prop::collection::vec((0_u8..6, 0_usize..Module::ALL.len(), 0_u32..1_000), 0..40).prop_map(
		|raw| {
			raw.into_iter()
				.enumerate()
				.map(|(idx, (doc, module, score))| PartialMatch {
					document_id: format!("NCT{doc:02}"),
					module: Module::ALL[module],
					// Unique scores keep the reduction independent of tie order.
					score: f64::from(score) / 1_000.0 + idx as f64 * 1e-9,
				})
				.collect()
		},
	)
}

fn by_document(matches: Vec<PartialMatch>) -> BTreeMap<String, PartialMatch> {
	combine::combine_matches(matches)
		.into_iter()
		.map(|hit| (hit.document_id.clone(), hit))
		.collect()
}

fn date_strategy() -> impl Strategy<Value = Option<String>> {
	prop::option::of((1995_i32..2035, 1_u8..13, prop::option::of(1_u8..29))).prop_map(|date| {
		date.map(|(year, month, day)| match day {
			Some(day) => format!("{year}-{month:02}-{day:02}"),
			None => format!("{year}-{month:02}"),
		})
	})
}

prop_compose! {
	fn trial_strategy(id: &'static str)(
		enrollment in prop::option::of(-10_i64..5_000),
		start in date_strategy(),
		primary in date_strategy(),
		completion in date_strategy(),
		estimated in date_strategy(),
		has_results in any::<bool>(),
		serious in prop::option::of(0_i64..500),
		other in prop::option::of(0_i64..500),
		dropouts in prop::collection::vec(prop::option::of(-5_i64..500), 0..4),
	) -> TrialDocument {
		TrialDocument {
			id: id.to_string(),
			enrollment_count: enrollment,
			start_date: start,
			primary_completion_date: primary,
			completion_date: completion,
			estimated_completion_date: estimated,
			has_results,
			adverse_event_groups: Some(vec![AdverseEventGroup {
				serious_num_affected: serious,
				other_num_affected: other,
			}]),
			dropout_reasons: Some(
				dropouts
					.into_iter()
					.map(|num_subjects| DropoutReason { num_subjects, ..Default::default() })
					.collect(),
			),
			..Default::default()
		}
	}
}

proptest! {
	#[test]
	fn combining_is_idempotent(matches in matches_strategy()) {
		let once = combine::combine_matches(matches);
		let twice = combine::combine_matches(once.iter().cloned());

		prop_assert_eq!(once, twice);
	}

	#[test]
	fn combining_ignores_input_order(
		(matches, shuffled) in matches_strategy().prop_flat_map(|matches| {
			(Just(matches.clone()), Just(matches).prop_shuffle())
		}),
	) {
		prop_assert_eq!(by_document(matches), by_document(shuffled));
	}

	#[test]
	fn bounded_parts_stay_within_their_maxima(
		target in trial_strategy("NCT01"),
		first in trial_strategy("NCT02"),
		second in trial_strategy("NCT03"),
	) {
		let breakdown = operational::score_trial(&target, &[&first, &second]);

		prop_assert!((0.0..=ENROLLMENT_MAX).contains(&breakdown.enrollment_score));
		prop_assert!((0.0..=DURATION_MAX).contains(&breakdown.duration_score));
		prop_assert!((0.0..=RETENTION_MAX).contains(&breakdown.retention_score));
		prop_assert!(breakdown.adverse_event_score.is_finite());
		prop_assert!(breakdown.adverse_event_score <= 30.0);
	}

	#[test]
	fn percentiles_are_monotonic_in_score(
		scores in prop::collection::vec(0_u32..10_000, 1..50),
	) {
		let scores: Vec<f64> = scores.into_iter().map(|score| f64::from(score) / 100.0).collect();
		let ranks = percentile::percentile_ranks(&scores, 2);

		for (left, left_rank) in scores.iter().zip(&ranks) {
			prop_assert!(*left_rank > 0.0 && *left_rank <= 100.0);

			for (right, right_rank) in scores.iter().zip(&ranks) {
				if left < right {
					prop_assert!(left_rank <= right_rank);
				}
			}
		}
	}
}
