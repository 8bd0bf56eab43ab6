use pathwise_config::EmbeddingProviderConfig;

use crate::{EmbeddingProvider, Error, Result};

/// Turns text into vectors of the configured dimensionality. Does no caching.
#[derive(Clone, Copy)]
pub struct Embedder<'a> {
	cfg: &'a EmbeddingProviderConfig,
	provider: &'a dyn EmbeddingProvider,
}
impl<'a> Embedder<'a> {
	pub fn new(cfg: &'a EmbeddingProviderConfig, provider: &'a dyn EmbeddingProvider) -> Self {
		Self { cfg, provider }
	}

	pub fn dimensions(&self) -> usize {
		self.cfg.dimensions as usize
	}

	pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
		let vectors = self.request(&[text.to_string()]).await?;

		vectors.into_iter().next().ok_or_else(|| Error::EmbeddingFailure {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	}

	/// Embeds `texts` in chunks of `batch_size`, returning vectors in input order.
	pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let batch_size = self.cfg.batch_size.max(1) as usize;
		let mut out = Vec::with_capacity(texts.len());

		for chunk in texts.chunks(batch_size) {
			out.extend(self.request(chunk).await?);
		}

		Ok(out)
	}

	async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let vectors = self
			.provider
			.embed(self.cfg, texts)
			.await
			.map_err(|err| Error::EmbeddingFailure { message: err.to_string() })?;

		if vectors.len() != texts.len() {
			return Err(Error::EmbeddingFailure {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					texts.len()
				),
			});
		}

		let expected = self.dimensions();

		if let Some(bad) = vectors.iter().find(|vector| vector.len() != expected) {
			return Err(Error::EmbeddingFailure {
				message: format!(
					"Embedding vector has {} dimensions, expected {expected}.",
					bad.len()
				),
			});
		}

		Ok(vectors)
	}
}
