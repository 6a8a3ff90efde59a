use serde_json::Value;

use trialscope_domain::{CriteriaItem, StructuredTag};

const CONDITION_MARKER: &str = "Condition";
const MISSING_LIMIT: &str = "X";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagKind {
	Condition { name: String },
	Boolean,
	Range,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainTag {
	pub tag: String,
	pub kind: TagKind,
}

pub fn main_tag(tag: &StructuredTag) -> MainTag {
	let category = tag.category.trim();

	if category.contains(CONDITION_MARKER) {
		let name = category.split_once(':').map(|(_, name)| name.trim()).unwrap_or_default();

		return MainTag {
			tag: category.to_string(),
			kind: TagKind::Condition { name: name.to_string() },
		};
	}
	if let Some(value) = tag.boolean_value {
		return MainTag { tag: format!("{category} : {value}"), kind: TagKind::Boolean };
	}

	let lower = render_limit(tag.lower_limit.as_ref());
	let upper = render_limit(tag.upper_limit.as_ref());

	MainTag { tag: format!("{category} : {lower} - {upper}"), kind: TagKind::Range }
}

/// Appends the main tag of every structured tag to `item.tags`, skipping ones already present.
pub fn resolve_tags(item: &mut CriteriaItem) {
	for structured in &item.structured_tags {
		if structured.category.trim().is_empty() {
			continue;
		}

		let derived = main_tag(structured).tag;

		if !item.tags.contains(&derived) {
			item.tags.push(derived);
		}
	}
}

fn render_limit(limit: Option<&Value>) -> String {
	match limit {
		None | Some(Value::Null) => MISSING_LIMIT.to_string(),
		Some(Value::String(text)) => {
			let text = text.trim();

			if text.is_empty() {
				return MISSING_LIMIT.to_string();
			}

			text.strip_suffix(".00").or_else(|| text.strip_suffix(".0")).unwrap_or(text).to_string()
		},
		Some(Value::Number(number)) => match number.as_f64() {
			Some(value) if number.is_f64() && value.fract() == 0.0 => format!("{}", value as i64),
			_ => number.to_string(),
		},
		Some(other) => other.to_string(),
	}
}
