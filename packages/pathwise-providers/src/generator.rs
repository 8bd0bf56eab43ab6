use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$")
		.expect("Code fence pattern must compile.")
});

/// Runs a chat completion and returns the reply parsed as a JSON object.
///
/// Replies that are not valid JSON are retried up to `max_attempts` times; transport errors
/// are returned immediately.
pub async fn generate(cfg: &pathwise_config::LlmProviderConfig, messages: &[Value]) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let attempts = cfg.max_attempts.max(1);

	for attempt in 1..=attempts {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
			"response_format": { "type": "json_object" },
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_generation_json(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				tracing::warn!(attempt, error = %err, "Generator reply is not valid JSON.");
			},
		}
	}

	Err(Error::InvalidResponse { message: "Generator response is not valid JSON.".to_string() })
}

fn parse_generation_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(strip_code_fence(content)).map_err(|_| {
			Error::InvalidResponse { message: "Generator content is not valid JSON.".to_string() }
		})?;

		if !parsed.is_object() {
			return Err(Error::InvalidResponse {
				message: "Generator content must be a JSON object.".to_string(),
			});
		}

		return Ok(parsed);
	}

	if json.is_object() && json.get("choices").is_none() {
		return Ok(json);
	}

	Err(Error::InvalidResponse { message: "Generator response is missing JSON content.".to_string() })
}

fn strip_code_fence(content: &str) -> &str {
	CODE_FENCE
		.captures(content)
		.and_then(|captures| captures.get(1))
		.map(|inner| inner.as_str())
		.unwrap_or(content)
		.trim()
}
