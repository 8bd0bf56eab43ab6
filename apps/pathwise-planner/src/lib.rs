use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pathwise_config::Config;
use pathwise_domain::{LearningPlan, PerformanceMetrics, StudentProfile};
use pathwise_service::PathwiseService;
use pathwise_storage::{InMemoryContentSource, catalog};

#[derive(Debug, Parser)]
#[command(
	version = pathwise_cli::VERSION,
	rename_all = "kebab",
	styles = pathwise_cli::styles(),
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
	/// Print recommended content for a student as JSON.
	Recommend {
		#[arg(long, value_name = "FILE")]
		student: PathBuf,
		#[arg(long, value_name = "SUBJECT")]
		subject: Option<String>,
		#[arg(long, short = 'k', value_name = "N")]
		k: Option<usize>,
	},
	/// Synthesize a learning plan and print it as JSON.
	Plan {
		#[arg(long, value_name = "FILE")]
		student: PathBuf,
		#[arg(long, value_name = "SUBJECT")]
		subject: String,
	},
	/// Synthesize a multi-week learning path and print it as JSON.
	Path {
		#[arg(long, value_name = "FILE")]
		student: PathBuf,
		#[arg(long, value_name = "SUBJECT")]
		subject: String,
		#[arg(long, value_name = "N")]
		weeks: Option<u32>,
	},
	/// Adapt a saved plan to performance metrics and print the outcome with the updated plan.
	Adapt {
		#[arg(long, value_name = "FILE")]
		student: PathBuf,
		#[arg(long, value_name = "FILE")]
		plan: PathBuf,
		#[arg(long, value_name = "FILE")]
		metrics: PathBuf,
	},
	/// Embed catalog items that lack embeddings and write the enriched catalog.
	Index {
		#[arg(long, short = 'o', value_name = "FILE")]
		output: PathBuf,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = pathwise_config::load(&args.config)?;
	init_tracing(&config)?;
	let source = load_source(&config)?;
	let service = PathwiseService::new(config, Arc::new(source.clone()));

	match args.command {
		Command::Recommend { student, subject, k } => {
			let profile = load_student(&student)?;
			let mut items = service.recommend(&profile, subject.as_deref(), k).await?;

			for item in &mut items {
				item.embedding = None;
			}

			print_json(&items)?;
		},
		Command::Plan { student, subject } => {
			let profile = load_student(&student)?;
			let plan = service.create_plan(&profile, &subject).await?;

			print_json(&plan.snapshot())?;
		},
		Command::Path { student, subject, weeks } => {
			let profile = load_student(&student)?;
			let path = service.create_learning_path(&profile, &subject, weeks).await?;

			print_json(&path)?;
		},
		Command::Adapt { student, plan, metrics } => {
			let profile = load_student(&student)?;
			let mut learning_plan: LearningPlan = read_json(&plan)?;
			let metrics: PerformanceMetrics = read_json(&metrics)?;
			let adaptation = service.adapt_plan(&profile, &mut learning_plan, &metrics).await?;

			print_json(&serde_json::json!({
				"adaptation": adaptation,
				"plan": learning_plan.snapshot(),
			}))?;
		},
		Command::Index { output } => {
			let report = service.reindex(source.snapshot()).await?;

			for skipped in &report.upsert.skipped {
				tracing::warn!(
					content_id = %skipped.content_id,
					reason = ?skipped.reason,
					"Content was not indexed."
				);
			}

			catalog::write_catalog(&output, &report.items)?;
			tracing::info!(
				path = %output.display(),
				items = report.items.len(),
				embedded = report.embedded,
				"Wrote enriched catalog."
			);
		},
	}

	Ok(())
}

fn load_source(config: &Config) -> color_eyre::Result<InMemoryContentSource> {
	let Some(path) = config.content.catalog_path.as_deref() else {
		tracing::warn!("No content catalog configured. Only fallback content will be served.");

		return Ok(InMemoryContentSource::default());
	};
	let load = catalog::load_catalog(path)?;

	tracing::info!(
		path = %path.display(),
		items = load.items.len(),
		rejected = load.rejected.len(),
		"Loaded content catalog."
	);

	Ok(InMemoryContentSource::from_items(load.items))
}

fn load_student(path: &Path) -> color_eyre::Result<StudentProfile> {
	read_json(path)
}

fn read_json<T>(path: &Path) -> color_eyre::Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let raw = fs::read_to_string(path)?;

	Ok(serde_json::from_str(&raw)?)
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: ?Sized + Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
	Ok(())
}
