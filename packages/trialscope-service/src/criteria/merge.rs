use std::collections::HashMap;

use trialscope_domain::{CategorizedCriteria, CriteriaBuckets, CriteriaItem, CriteriaSide};

/// Trims a tag and strips one trailing `.0`, so `"Age "` and `"Age.0"` share a key.
pub fn normalize_tag(tag: &str) -> String {
	let trimmed = tag.trim();

	trimmed.strip_suffix(".0").unwrap_or(trimmed).trim().to_string()
}

/// Consolidates items into one record per distinct normalized tag.
///
/// An item contributes once to every distinct tag it carries; untagged items go to
/// `fallback_tag`. Records keep first-seen tag order. The merged record takes its id and
/// categories from the first contributor, the union of all sources, and the longest text.
pub fn merge_by_tag(
	items: &[CriteriaItem],
	fallback_tag: &str,
	excluded_tags: &[String],
) -> Vec<CriteriaItem> {
	let excluded: Vec<String> = excluded_tags.iter().map(|tag| normalize_tag(tag)).collect();
	let mut merged: Vec<CriteriaItem> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for item in items {
		let mut tags: Vec<String> = Vec::new();

		for tag in item.tags.iter().map(|tag| normalize_tag(tag)) {
			if !tag.is_empty() && !tags.contains(&tag) {
				tags.push(tag);
			}
		}
		if tags.is_empty() {
			tags.push(fallback_tag.to_string());
		}

		for tag in tags {
			if excluded.contains(&tag) {
				tracing::debug!(criteria_id = %item.id, tag = %tag, "Skipping excluded tag.");

				continue;
			}

			match index.get(&tag).copied() {
				Some(position) => absorb(&mut merged[position], item),
				None => {
					let mut record = item.clone();

					record.tags = vec![tag.clone()];
					record.source_count = record.source.len();

					index.insert(tag, merged.len());
					merged.push(record);
				},
			}
		}
	}

	merged
}

/// Splits items into per-category inclusion and exclusion slots.
///
/// Every configured category gets an entry. Items naming no configured category land in
/// `fallback_category`; an item naming several categories is placed in each.
pub fn categorize(
	inclusion: &[CriteriaItem],
	exclusion: &[CriteriaItem],
	categories: &[String],
	fallback_category: &str,
) -> CategorizedCriteria {
	let mut out: CategorizedCriteria = categories
		.iter()
		.map(|category| (category.clone(), CriteriaBuckets::default()))
		.collect();

	for (side, items) in [(CriteriaSide::Inclusion, inclusion), (CriteriaSide::Exclusion, exclusion)]
	{
		for item in items {
			let mut placed = false;

			for category in item.categories.iter().map(|category| category.trim()) {
				if let Some(buckets) = out.get_mut(category) {
					buckets.side_mut(side).push(item.clone());

					placed = true;
				}
			}

			if !placed {
				out.entry(fallback_category.to_string())
					.or_default()
					.side_mut(side)
					.push(item.clone());
			}
		}
	}

	out
}

/// Tag-merges every slot of `categorized` independently.
pub fn consolidate(
	categorized: CategorizedCriteria,
	fallback_tag: &str,
	excluded_tags: &[String],
) -> CategorizedCriteria {
	categorized
		.into_iter()
		.map(|(category, buckets)| {
			let merged = CriteriaBuckets {
				inclusion: merge_by_tag(&buckets.inclusion, fallback_tag, excluded_tags),
				exclusion: merge_by_tag(&buckets.exclusion, fallback_tag, excluded_tags),
			};

			tracing::debug!(
				category = %category,
				inclusion = merged.inclusion.len(),
				exclusion = merged.exclusion.len(),
				"Consolidated category."
			);

			(category, merged)
		})
		.collect()
}

fn absorb(record: &mut CriteriaItem, item: &CriteriaItem) {
	record.source.extend(item.source.iter().map(|(id, text)| (id.clone(), text.clone())));
	record.source_count = record.source.len();

	if item.text.chars().count() > record.text.chars().count() {
		record.text = item.text.clone();
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use trialscope_domain::CriteriaItem;

	use crate::criteria::merge::{categorize, merge_by_tag, normalize_tag};

	fn item(id: &str, text: &str, tags: &[&str], sources: &[&str]) -> CriteriaItem {
		CriteriaItem {
			id: id.to_string(),
			text: text.to_string(),
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			source: sources.iter().map(|id| (id.to_string(), text.to_string())).collect(),
			..Default::default()
		}
	}

	#[test]
	fn normalization_strips_whitespace_and_integral_suffix() {
		assert_eq!(normalize_tag("  Age "), "Age");
		assert_eq!(normalize_tag("Age.0"), "Age");
		assert_eq!(normalize_tag("Age : 18.0 "), "Age : 18");
		assert_eq!(normalize_tag("HbA1c 7.05"), "HbA1c 7.05");
	}

	#[test]
	fn longest_text_wins_and_first_id_is_kept() {
		let merged = merge_by_tag(
			&[
				item("cid_a", "Adults", &["Age"], &["NCT01"]),
				item("cid_b", "Adults aged 18 to 65", &["Age"], &["NCT02"]),
			],
			"Others",
			&[],
		);

		assert_eq!(merged.len(), 1);
		assert_eq!(merged[0].id, "cid_a");
		assert_eq!(merged[0].text, "Adults aged 18 to 65");
		assert_eq!(merged[0].source_count, 2);
	}

	#[test]
	fn items_fan_out_across_tags() {
		let merged = merge_by_tag(
			&[item("cid_a", "Adults with diabetes", &["Age", "Diabetes", "Age.0"], &["NCT01"])],
			"Others",
			&[],
		);
		let tags: Vec<&str> = merged.iter().map(|record| record.tags[0].as_str()).collect();

		assert_eq!(tags, vec!["Age", "Diabetes"]);
	}

	#[test]
	fn untagged_items_use_fallback_and_excluded_tags_are_skipped() {
		let merged = merge_by_tag(
			&[item("cid_a", "Consent", &[], &["NCT01"]), item("cid_b", "Other", &["Misc"], &["NCT02"])],
			"Others",
			&["Misc".to_string()],
		);

		assert_eq!(merged.len(), 1);
		assert_eq!(merged[0].tags, vec!["Others".to_string()]);
		assert_eq!(merged[0].source, BTreeMap::from([("NCT01".to_string(), "Consent".to_string())]));
	}

	#[test]
	fn exclusion_items_stay_in_exclusion_slots() {
		let mut inclusion = item("cid_a", "Adults", &["Age"], &["NCT01"]);
		let mut exclusion = item("cid_b", "Pregnant", &["Pregnancy"], &["NCT01"]);
		let mut unknown = item("cid_c", "Other", &[], &["NCT02"]);

		inclusion.categories = vec!["Demographic".to_string()];
		exclusion.categories = vec!["Demographic".to_string()];
		unknown.categories = vec!["Unlisted".to_string()];

		let categories = vec!["Demographic".to_string(), "Other".to_string()];
		let out = categorize(&[inclusion], &[exclusion, unknown], &categories, "Other");

		assert_eq!(out["Demographic"].inclusion[0].id, "cid_a");
		assert_eq!(out["Demographic"].exclusion[0].id, "cid_b");
		assert_eq!(out["Other"].exclusion[0].id, "cid_c");
		assert!(out["Other"].inclusion.is_empty());
	}
}
