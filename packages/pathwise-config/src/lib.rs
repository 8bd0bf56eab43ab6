mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Content, EmbeddingProviderConfig, Index, LlmProviderConfig, Plan, Providers,
	Retrieval, Service,
};

use std::{fs, path::Path};

/// Upper bound for `plan.path_weeks` and for per-request path lengths.
pub const MAX_PATH_WEEKS: u32 = 52;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

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
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.index.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match index.vector_dim.".to_string(),
		});
	}
	if cfg.providers.embedding.batch_size == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.batch_size must be greater than zero.".to_string(),
		});
	}

	let temperature = cfg.providers.llm_generator.temperature;

	if !temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm_generator.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.llm_generator.temperature must be in the range 0.0-2.0."
				.to_string(),
		});
	}
	if cfg.providers.llm_generator.max_attempts == 0 {
		return Err(Error::Validation {
			message: "providers.llm_generator.max_attempts must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_generator", &cfg.providers.llm_generator.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	for (label, value) in [
		("retrieval.default_k", cfg.retrieval.default_k),
		("retrieval.plan_candidate_k", cfg.retrieval.plan_candidate_k),
		("plan.duration_days", cfg.plan.duration_days),
		("plan.default_activity_minutes", cfg.plan.default_activity_minutes),
		("plan.path_weeks", cfg.plan.path_weeks),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.plan.path_weeks > MAX_PATH_WEEKS {
		return Err(Error::Validation {
			message: format!("plan.path_weeks must be at most {MAX_PATH_WEEKS}."),
		});
	}
	if cfg.retrieval.default_subject.trim().is_empty() {
		return Err(Error::Validation {
			message: "retrieval.default_subject must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.content
		.catalog_path
		.as_deref()
		.map(|path| path.as_os_str().to_string_lossy().trim().is_empty())
		.unwrap_or(false)
	{
		cfg.content.catalog_path = None;
	}

	cfg.retrieval.default_subject = cfg.retrieval.default_subject.trim().to_string();
}
