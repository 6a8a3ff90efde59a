#![allow(dead_code)]

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;

use trialscope_config::Config;
use trialscope_domain::{Module, TrialDocument};
use trialscope_service::{
	EmbeddingStore, FieldSearcher, ModuleEmbeddings, PartialMatch, Providers, TrialScopeService,
};

pub const TEST_CONFIG: &str = r#"
[service]
log_level = "debug"

[search]
result_limit = 10
workers      = 3

[search.weights]
condition         = 1.0
inclusionCriteria = 1.0
title             = 2.0

[scoring]
workers = 2

[criteria]
categories        = ["Age", "Health Condition/Status", "Other"]
default_tags      = ["Age", "HbA1c"]
fallback_category = "Other"
"#;

pub fn test_config() -> Config {
	trialscope_config::parse(TEST_CONFIG).expect("Test config must be valid.")
}

/// Field search backed by a fixed match list per module.
#[derive(Default)]
pub struct StaticSearcher {
	pub matches: BTreeMap<Module, Vec<PartialMatch>>,
	pub failing: BTreeSet<Module>,
	pub calls: Arc<AtomicUsize>,
}
impl StaticSearcher {
	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl FieldSearcher for StaticSearcher {
	fn search(&self, module: Module, _query: &str) -> eyre::Result<Vec<PartialMatch>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		if self.failing.contains(&module) {
			return Err(eyre::eyre!("Index for {module} is unavailable."));
		}

		Ok(self.matches.get(&module).cloned().unwrap_or_default())
	}
}

/// Embeddings keyed by document id; unknown ids fail.
#[derive(Default)]
pub struct StaticEmbeddings {
	pub vectors: BTreeMap<String, ModuleEmbeddings>,
}
impl EmbeddingStore for StaticEmbeddings {
	fn document_embeddings(&self, document_id: &str) -> eyre::Result<ModuleEmbeddings> {
		self.vectors
			.get(document_id)
			.cloned()
			.ok_or_else(|| eyre::eyre!("No embeddings for {document_id}."))
	}
}

pub fn service(searcher: StaticSearcher, embeddings: StaticEmbeddings) -> TrialScopeService {
	TrialScopeService::new(
		test_config(),
		Providers { searcher: Arc::new(searcher), embeddings: Arc::new(embeddings) },
	)
}

pub fn hit(document_id: &str, module: Module, score: f64) -> PartialMatch {
	PartialMatch { document_id: document_id.to_string(), module, score }
}

pub fn trial(id: &str, enrollment: i64) -> TrialDocument {
	TrialDocument {
		id: id.to_string(),
		enrollment_count: Some(enrollment),
		phases: vec!["PHASE2".to_string()],
		sponsor_type: "INDUSTRY".to_string(),
		..Default::default()
	}
}
