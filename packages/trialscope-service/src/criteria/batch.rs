use serde::Serialize;

use trialscope_domain::{CategorizedCriteria, CriteriaItem, CriteriaSide};

/// Batches of one category side, each small enough for a single downstream merge call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBatchPlan {
	pub category: String,
	pub side: CriteriaSide,
	pub batches: Vec<Vec<CriteriaItem>>,
}

/// Halves `items` recursively until every batch holds at most `batch_size` entries.
pub fn split_oversized<T>(items: &[T], batch_size: usize) -> Vec<Vec<T>>
where
	T: Clone,
{
	if items.is_empty() {
		return Vec::new();
	}
	if items.len() <= batch_size.max(1) {
		return vec![items.to_vec()];
	}

	let (left, right) = items.split_at(items.len() / 2);
	let mut batches = split_oversized(left, batch_size);

	batches.extend(split_oversized(right, batch_size));

	batches
}

/// Plans merge batches for every non-empty side of every category.
pub fn plan_merge_batches(categories: &CategorizedCriteria, batch_size: usize) -> Vec<MergeBatchPlan> {
	let mut plans = Vec::new();

	for (category, buckets) in categories {
		for side in [CriteriaSide::Inclusion, CriteriaSide::Exclusion] {
			let batches = split_oversized(buckets.side(side), batch_size);

			if batches.is_empty() {
				continue;
			}

			tracing::debug!(category = %category, ?side, batches = batches.len(), "Planned merge batches.");

			plans.push(MergeBatchPlan { category: category.clone(), side, batches });
		}
	}

	plans
}

#[cfg(test)]
mod tests {
	use crate::criteria::batch::split_oversized;

	#[test]
	fn small_inputs_stay_whole() {
		let items: Vec<u32> = (0..25).collect();

		assert_eq!(split_oversized(&items, 25), vec![items.clone()]);
	}

	#[test]
	fn oversized_inputs_halve_recursively() {
		let items: Vec<u32> = (0..60).collect();
		let batches = split_oversized(&items, 25);
		let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();

		assert_eq!(sizes, vec![15, 15, 15, 15]);
		assert_eq!(batches.concat(), items);
	}

	#[test]
	fn odd_lengths_put_the_extra_item_right() {
		let items: Vec<u32> = (0..27).collect();
		let sizes: Vec<usize> = split_oversized(&items, 25).iter().map(Vec::len).collect();

		assert_eq!(sizes, vec![13, 14]);
	}
}
