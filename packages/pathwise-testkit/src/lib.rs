use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, Value};

use pathwise_config::{
	Config, Content, EmbeddingProviderConfig, Index, LlmProviderConfig, Plan, Providers, Retrieval,
	Service,
};
use pathwise_domain::{ContentItem, ContentType, DifficultyLevel};
use pathwise_service::{BoxFuture, EmbeddingProvider, GenerationProvider};

/// Deterministic unit vector derived from the blake3 hash of `text`.
pub fn hash_vector(text: &str, dimensions: usize) -> Vec<f32> {
	let mut bytes = vec![0_u8; dimensions * 4];

	blake3::Hasher::new().update(text.as_bytes()).finalize_xof().fill(&mut bytes);

	let raw: Vec<f32> = bytes
		.chunks_exact(4)
		.map(|chunk| {
			let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

			(value as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
		})
		.collect();
	let norm = raw.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm == 0.0 {
		return raw;
	}

	raw.into_iter().map(|value| value / norm).collect()
}

pub struct HashEmbedding {
	pub dimensions: usize,
	pub calls: Arc<AtomicUsize>,
}
impl HashEmbedding {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions, calls: Arc::new(AtomicUsize::new(0)) }
	}
}
impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, pathwise_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vectors = texts.iter().map(|text| hash_vector(text, self.dimensions)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Always fails, the way an unreachable backend does.
pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, pathwise_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(pathwise_providers::Error::InvalidResponse {
				message: "Embedding backend is unreachable.".to_string(),
			})
		})
	}
}

/// Returns a fixed reply (or a failure) and records every prompt it receives.
pub struct ScriptedGenerator {
	reply: Option<Value>,
	pub calls: Arc<AtomicUsize>,
	prompts: Mutex<Vec<Vec<Value>>>,
}
impl ScriptedGenerator {
	pub fn replying(reply: Value) -> Self {
		Self { reply: Some(reply), calls: Arc::new(AtomicUsize::new(0)), prompts: Mutex::new(Vec::new()) }
	}

	pub fn failing() -> Self {
		Self { reply: None, calls: Arc::new(AtomicUsize::new(0)), prompts: Mutex::new(Vec::new()) }
	}

	pub fn last_prompt(&self) -> Option<Vec<Value>> {
		self.prompts.lock().unwrap_or_else(|err| err.into_inner()).last().cloned()
	}
}
impl GenerationProvider for ScriptedGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, pathwise_providers::Result<Value>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.prompts.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let reply = self.reply.clone();

		Box::pin(async move {
			reply.ok_or_else(|| pathwise_providers::Error::InvalidResponse {
				message: "Generator response is not valid JSON.".to_string(),
			})
		})
	}
}

pub fn test_config(dimensions: u32) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions,
				timeout_ms: 1_000,
				batch_size: 2,
				default_headers: Map::new(),
			},
			llm_generator: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-generator".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				max_attempts: 1,
				default_headers: Map::new(),
			},
		},
		index: Index { vector_dim: dimensions },
		retrieval: Retrieval {
			default_k: 5,
			plan_candidate_k: 10,
			default_subject: "Mathematics".to_string(),
		},
		plan: Plan { duration_days: 14, default_activity_minutes: 20, path_weeks: 4 },
		content: Content { catalog_path: None },
	}
}

pub fn content_item(
	id: &str,
	subject: &str,
	difficulty_level: DifficultyLevel,
	grade_level: &[i32],
) -> ContentItem {
	ContentItem {
		id: id.to_string(),
		title: format!("{subject} resource {id}"),
		description: format!("Practice material for {subject}."),
		content_type: ContentType::Lesson,
		subject: subject.to_string(),
		topics: vec![subject.to_lowercase()],
		difficulty_level,
		grade_level: grade_level.iter().copied().collect(),
		duration_minutes: Some(15),
		keywords: Vec::new(),
		url: format!("https://content.example.org/{id}"),
		source: "catalog".to_string(),
		embedding: None,
	}
}

/// Mathematics and Science items across grades 5 to 11, embedded with [`hash_vector`].
pub fn sample_catalog(dimensions: usize) -> Vec<ContentItem> {
	use DifficultyLevel::{Advanced, Beginner, Intermediate};

	let mut items = vec![
		content_item("math-fractions", "Mathematics", Beginner, &[5, 6]),
		content_item("math-ratios", "Mathematics", Intermediate, &[6, 7]),
		content_item("math-linear", "Mathematics", Intermediate, &[8, 9]),
		content_item("math-quadratics", "Mathematics", Advanced, &[9, 10]),
		content_item("math-statistics", "Mathematics", Intermediate, &[7, 8]),
		content_item("science-cells", "Science", Intermediate, &[7, 8]),
		content_item("science-forces", "Science", Advanced, &[10, 11]),
	];

	for item in &mut items {
		item.embedding = Some(hash_vector(&item.embedding_text(), dimensions));
	}

	items
}
