pub mod criteria;
pub mod metrics;
pub mod search;

mod error;
mod pool;

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

pub use criteria::{CriteriaRequest, CriteriaResponse, MergeBatchPlan};
pub use error::{Error, Result};
pub use metrics::{CohortMetrics, CountryMetric, RangeBucket};
pub use search::{FilterImpact, RankedDocument, SearchRequest, SearchResponse};
use trialscope_config::Config;
use trialscope_domain::Module;

/// Embedding vectors for one document, keyed by module.
pub type ModuleEmbeddings = BTreeMap<Module, Vec<f32>>;

/// One hit from a single field's vector lookup.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialMatch {
	pub document_id: String,
	pub module: Module,
	pub score: f64,
}

/// Vector lookup for one query field.
pub trait FieldSearcher
where
	Self: Send + Sync,
{
	fn search(&self, module: Module, query: &str) -> color_eyre::Result<Vec<PartialMatch>>;
}

/// Per-module document embeddings produced by the external embedding provider.
pub trait EmbeddingStore
where
	Self: Send + Sync,
{
	fn document_embeddings(&self, document_id: &str) -> color_eyre::Result<ModuleEmbeddings>;
}

#[derive(Clone)]
pub struct Providers {
	pub searcher: Arc<dyn FieldSearcher>,
	pub embeddings: Arc<dyn EmbeddingStore>,
}

pub struct TrialScopeService {
	pub cfg: Config,
	pub providers: Providers,
}
impl TrialScopeService {
	pub fn new(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}
