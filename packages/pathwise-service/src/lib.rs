pub mod embedding;
pub mod path;
pub mod plans;
pub mod query;
pub mod reindex;
pub mod retriever;
pub mod synthesizer;

mod error;

pub use embedding::Embedder;
pub use error::{Error, PlanParseError, Result};
pub use path::{GeneratedPath, PathSynthesizer, parse_generated_path};
pub use query::{ContentQuery, build_query};
pub use reindex::ReindexReport;
pub use retriever::ContentRetriever;
pub use synthesizer::{GeneratedActivity, GeneratedPlan, PlanSynthesizer, parse_generated_plan};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use pathwise_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use pathwise_domain::FallbackCatalog;
use pathwise_providers::{embedding as http_embedding, generator};
use pathwise_storage::{ContentIndex, ContentSource};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, pathwise_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, pathwise_providers::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generator: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generator: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generator }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { embedding: provider.clone(), generator: provider }
	}
}

/// Retrieval and planning over one content source. Built once per process and shared.
pub struct PathwiseService {
	pub cfg: Config,
	pub source: Arc<dyn ContentSource>,
	pub index: Arc<ContentIndex>,
	pub providers: Providers,
	pub fallback: FallbackCatalog,
}
impl PathwiseService {
	pub fn new(cfg: Config, source: Arc<dyn ContentSource>) -> Self {
		Self::with_providers(cfg, source, Providers::default())
	}

	pub fn with_providers(cfg: Config, source: Arc<dyn ContentSource>, providers: Providers) -> Self {
		let index = Arc::new(ContentIndex::with_source(cfg.index.vector_dim as usize, source.clone()));
		let fallback = FallbackCatalog::builtin(cfg.retrieval.default_subject.clone());

		Self { cfg, source, index, providers, fallback }
	}

	pub fn with_fallback(mut self, fallback: FallbackCatalog) -> Self {
		self.fallback = fallback;

		self
	}

	pub fn embedder(&self) -> Embedder<'_> {
		Embedder::new(&self.cfg.providers.embedding, self.providers.embedding.as_ref())
	}

	pub fn retriever(&self) -> ContentRetriever<'_> {
		ContentRetriever::new(
			self.embedder(),
			self.index.as_ref(),
			self.source.as_ref(),
			&self.fallback,
		)
	}

	pub fn synthesizer(&self) -> PlanSynthesizer<'_> {
		PlanSynthesizer::new(
			&self.cfg.providers.llm_generator,
			&self.cfg.plan,
			self.providers.generator.as_ref(),
		)
	}

	pub fn path_synthesizer(&self) -> PathSynthesizer<'_> {
		PathSynthesizer::new(
			&self.cfg.providers.llm_generator,
			&self.cfg.plan,
			self.providers.generator.as_ref(),
		)
	}
}

struct HttpProviders;
impl EmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, pathwise_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(http_embedding::embed(cfg, texts))
	}
}
impl GenerationProvider for HttpProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, pathwise_providers::Result<Value>> {
		Box::pin(generator::generate(cfg, messages))
	}
}
