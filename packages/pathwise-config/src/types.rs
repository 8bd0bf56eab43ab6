use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub index: Index,
	pub retrieval: Retrieval,
	pub plan: Plan,
	pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm_generator: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Index {
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	pub default_k: u32,
	/// Number of candidates retrieved before plan synthesis.
	pub plan_candidate_k: u32,
	/// Subject whose fallback set is used when the requested subject has none.
	#[serde(default = "default_subject")]
	pub default_subject: String,
}

#[derive(Debug, Deserialize)]
pub struct Plan {
	pub duration_days: u32,
	#[serde(default = "default_activity_minutes")]
	pub default_activity_minutes: u32,
	/// Length of a multi-week learning path when the caller does not pick one.
	#[serde(default = "default_path_weeks")]
	pub path_weeks: u32,
}

#[derive(Debug, Deserialize)]
pub struct Content {
	/// Optional. JSON array of content records; an empty catalog is used when unset.
	pub catalog_path: Option<PathBuf>,
}

fn default_batch_size() -> u32 {
	16
}

fn default_max_attempts() -> u32 {
	3
}

fn default_subject() -> String {
	"Mathematics".to_string()
}

fn default_activity_minutes() -> u32 {
	20
}

fn default_path_weeks() -> u32 {
	4
}
