use trialscope_domain::{CategorizedCriteria, CriteriaItem};

use crate::criteria::round_to;

/// Rank-based percentile of every score within `scores`.
///
/// A score's rank is the position of its first occurrence in the ascending order, so ties
/// share the percentile of the lowest tied position.
pub fn percentile_ranks(scores: &[f64], precision: u32) -> Vec<f64> {
	let mut sorted = scores.to_vec();

	sorted.sort_by(f64::total_cmp);

	let denominator = (sorted.len() + 1) as f64;

	scores
		.iter()
		.map(|score| {
			let first = sorted.partition_point(|candidate| candidate.total_cmp(score).is_lt());

			round_to((first + 1) as f64 / denominator * 100.0, precision)
		})
		.collect()
}

/// Assigns percentiles per category and per side.
pub fn assign_percentiles(categories: &mut CategorizedCriteria, precision: u32) {
	for buckets in categories.values_mut() {
		assign_bucket(&mut buckets.inclusion, precision);
		assign_bucket(&mut buckets.exclusion, precision);
	}
}

fn assign_bucket(items: &mut [CriteriaItem], precision: u32) {
	let scores: Vec<f64> = items.iter().map(|item| item.operational_score).collect();

	for (item, percentile) in items.iter_mut().zip(percentile_ranks(&scores, precision)) {
		item.percentile = percentile;
	}
}

#[cfg(test)]
mod tests {
	use crate::criteria::percentile::percentile_ranks;

	#[test]
	fn ties_share_the_lowest_rank() {
		assert_eq!(percentile_ranks(&[10.0, 10.0, 30.0], 2), vec![25.0, 25.0, 75.0]);
		assert_eq!(percentile_ranks(&[30.0, 10.0, 10.0], 2), vec![75.0, 25.0, 25.0]);
	}

	#[test]
	fn single_item_lands_at_half() {
		assert_eq!(percentile_ranks(&[42.0], 2), vec![50.0]);
		assert!(percentile_ranks(&[], 2).is_empty());
	}

	#[test]
	fn percentiles_are_rounded() {
		assert_eq!(percentile_ranks(&[1.0, 2.0], 2), vec![33.33, 66.67]);
	}
}
