mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Criteria, Metrics, Scoring, Search, Service};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { origin: path.display().to_string(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw).map_err(Error::parse_inline)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.search.result_limit == 0 {
		return Err(Error::Validation {
			message: "search.result_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.workers == 0 {
		return Err(Error::Validation {
			message: "search.workers must be greater than zero.".to_string(),
		});
	}
	if cfg.search.weights.is_empty() {
		return Err(Error::Validation {
			message: "search.weights must be non-empty.".to_string(),
		});
	}

	for (module, weight) in &cfg.search.weights {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("search.weights.{module} must be a finite number."),
			});
		}
		if *weight < 0.0 {
			return Err(Error::Validation {
				message: format!("search.weights.{module} must be zero or greater."),
			});
		}
	}

	if cfg.search.weights.values().all(|weight| *weight == 0.0) {
		return Err(Error::Validation {
			message: "search.weights must contain at least one positive weight.".to_string(),
		});
	}
	if cfg.scoring.workers == 0 {
		return Err(Error::Validation {
			message: "scoring.workers must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.score_precision > 6 {
		return Err(Error::Validation {
			message: "scoring.score_precision must be 6 or less.".to_string(),
		});
	}
	if cfg.criteria.categories.is_empty() {
		return Err(Error::Validation {
			message: "criteria.categories must be non-empty.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for category in &cfg.criteria.categories {
		if !seen.insert(category.as_str()) {
			return Err(Error::Validation {
				message: format!("criteria.categories contains duplicate category '{category}'."),
			});
		}
	}

	if !seen.contains(cfg.criteria.fallback_category.as_str()) {
		return Err(Error::Validation {
			message: "criteria.fallback_category must be one of criteria.categories.".to_string(),
		});
	}
	if cfg.criteria.fallback_tag.is_empty() {
		return Err(Error::Validation {
			message: "criteria.fallback_tag must be non-empty.".to_string(),
		});
	}
	if cfg.criteria.merge_batch_size == 0 {
		return Err(Error::Validation {
			message: "criteria.merge_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.metrics.range_size == 0 {
		return Err(Error::Validation {
			message: "metrics.range_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.criteria.fallback_category = cfg.criteria.fallback_category.trim().to_string();
	cfg.criteria.fallback_tag = cfg.criteria.fallback_tag.trim().to_string();

	for list in [
		&mut cfg.criteria.categories,
		&mut cfg.criteria.excluded_tags,
		&mut cfg.criteria.default_tags,
	] {
		*list = list
			.iter()
			.map(|value| value.trim().to_string())
			.filter(|value| !value.is_empty())
			.collect();
	}
}
