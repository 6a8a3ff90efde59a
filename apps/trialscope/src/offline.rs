//! Providers backed by a pre-fetched input bundle instead of live services.

use std::collections::BTreeMap;

use color_eyre::eyre;
use serde::Deserialize;
use serde_json::Value;

use trialscope_domain::{Module, TrialDocument};
use trialscope_service::{EmbeddingStore, FieldSearcher, ModuleEmbeddings, PartialMatch};

/// A raw registry study plus, optionally, its protocol version history.
#[derive(Clone, Debug, Deserialize)]
pub struct RegistryRecord {
	pub study: Value,
	#[serde(default)]
	pub versions: Option<Value>,
}
impl RegistryRecord {
	pub fn to_document(&self) -> color_eyre::Result<TrialDocument> {
		Ok(TrialDocument::from_record(&self.study, self.versions.as_ref())?)
	}
}

/// Replays recorded vector-index hits per module; the query text is not consulted.
#[derive(Debug, Default)]
pub struct RecordedSearcher {
	matches: BTreeMap<Module, Vec<PartialMatch>>,
}
impl RecordedSearcher {
	pub fn new(matches: BTreeMap<Module, Vec<PartialMatch>>) -> Self {
		Self { matches }
	}
}
impl FieldSearcher for RecordedSearcher {
	fn search(&self, module: Module, _query: &str) -> eyre::Result<Vec<PartialMatch>> {
		let hits = self.matches.get(&module).map(Vec::as_slice).unwrap_or_default();

		Ok(hits.iter().filter(|hit| hit.module == module).cloned().collect())
	}
}

#[derive(Debug, Default)]
pub struct RecordedEmbeddings {
	vectors: BTreeMap<String, ModuleEmbeddings>,
}
impl RecordedEmbeddings {
	pub fn new(vectors: BTreeMap<String, ModuleEmbeddings>) -> Self {
		Self { vectors }
	}
}
impl EmbeddingStore for RecordedEmbeddings {
	fn document_embeddings(&self, document_id: &str) -> eyre::Result<ModuleEmbeddings> {
		self.vectors
			.get(document_id)
			.cloned()
			.ok_or_else(|| eyre::eyre!("No embeddings recorded for {document_id}."))
	}
}
