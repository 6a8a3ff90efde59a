pub mod offline;

use std::{collections::BTreeMap, fs, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr};
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use trialscope_config::Config;
use trialscope_domain::{Module, TrialDocument};
use trialscope_service::{
	CriteriaRequest, ModuleEmbeddings, PartialMatch, Providers, SearchRequest, TrialScopeService,
};

use crate::offline::{RecordedEmbeddings, RecordedSearcher, RegistryRecord};

#[derive(Debug, Parser)]
#[command(
	version = trialscope_cli::VERSION,
	rename_all = "kebab",
	styles = trialscope_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Rank trial documents against a multi-field query.
	Search(Io),
	/// Categorize, consolidate, and score generated eligibility criteria.
	Criteria(Io),
	/// Split categorized criteria into merge-sized batches.
	Batches(Io),
	/// Summarize a batch of trials into country counts and range histograms.
	Metrics(Io),
}
impl Command {
	pub fn io(&self) -> &Io {
		match self {
			Self::Search(io) | Self::Criteria(io) | Self::Batches(io) | Self::Metrics(io) => io,
		}
	}
}

#[derive(Debug, clap::Args)]
pub struct Io {
	/// JSON bundle for the pipeline.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	/// Output file; stdout when omitted.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBundle {
	#[serde(flatten)]
	request: SearchRequest,
	#[serde(default)]
	matches: BTreeMap<Module, Vec<PartialMatch>>,
	#[serde(default)]
	embeddings: BTreeMap<String, ModuleEmbeddings>,
	#[serde(default)]
	records: Vec<RegistryRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaBundle {
	#[serde(flatten)]
	request: CriteriaRequest,
	#[serde(default)]
	records: Vec<RegistryRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricsBundle {
	#[serde(default)]
	documents: Vec<TrialDocument>,
	#[serde(default)]
	records: Vec<RegistryRecord>,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = trialscope_config::load(&args.config)?;

	init_tracing(&config)?;

	let io = args.command.io();
	let raw = fs::read_to_string(&io.input)
		.wrap_err_with(|| format!("Failed to read input bundle at {}.", io.input.display()))?;
	let output = execute(config, &args.command, &raw)?;
	let rendered = serde_json::to_string_pretty(&output)?;

	match &io.output {
		Some(path) => fs::write(path, rendered)
			.wrap_err_with(|| format!("Failed to write output to {}.", path.display()))?,
		None => println!("{rendered}"),
	}

	Ok(())
}

/// Runs one pipeline over a JSON bundle with providers replaying the bundle's recorded data.
pub fn execute(config: Config, command: &Command, raw: &str) -> color_eyre::Result<Value> {
	match command {
		Command::Search(_) => {
			let bundle: SearchBundle = serde_json::from_str(raw)?;
			let mut request = bundle.request;

			request.documents.extend(documents_from(&bundle.records)?);

			let service = TrialScopeService::new(
				config,
				Providers {
					searcher: Arc::new(RecordedSearcher::new(bundle.matches)),
					embeddings: Arc::new(RecordedEmbeddings::new(bundle.embeddings)),
				},
			);
			let response = service.search(request)?;

			tracing::info!(
				results = response.results.len(),
				candidates = response.candidate_count,
				"Search finished."
			);

			Ok(serde_json::to_value(response)?)
		},
		Command::Criteria(_) => {
			let bundle: CriteriaBundle = serde_json::from_str(raw)?;
			let mut request = bundle.request;

			request.documents.extend(documents_from(&bundle.records)?);

			let response = offline_service(config).score_criteria(request)?;

			Ok(serde_json::to_value(response)?)
		},
		Command::Batches(_) => {
			let bundle: CriteriaBundle = serde_json::from_str(raw)?;
			let plans = offline_service(config).plan_merge_batches(bundle.request);

			tracing::info!(plans = plans.len(), "Merge batches planned.");

			Ok(serde_json::to_value(plans)?)
		},
		Command::Metrics(_) => {
			let bundle: MetricsBundle = serde_json::from_str(raw)?;
			let mut documents = bundle.documents;

			documents.extend(documents_from(&bundle.records)?);

			if documents.is_empty() {
				return Err(eyre::eyre!("metrics bundle must contain documents or records."));
			}

			Ok(serde_json::to_value(offline_service(config).cohort_metrics(&documents))?)
		},
	}
}

fn offline_service(config: Config) -> TrialScopeService {
	TrialScopeService::new(
		config,
		Providers {
			searcher: Arc::new(RecordedSearcher::default()),
			embeddings: Arc::new(RecordedEmbeddings::default()),
		},
	)
}

fn documents_from(records: &[RegistryRecord]) -> color_eyre::Result<Vec<TrialDocument>> {
	records.iter().map(RegistryRecord::to_document).collect()
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
