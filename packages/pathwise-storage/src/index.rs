use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
};

use serde::Serialize;
use tokio::sync::OnceCell;

use pathwise_domain::{
	ContentItem, FilterPredicate,
	similarity::{cmp_f32_desc, cosine_similarity},
};

use crate::{ContentSource, Error, Result};

/// A search hit. `relevance_score` is cosine similarity: higher is more relevant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredResult {
	pub content_id: String,
	pub relevance_score: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
	MissingEmbedding,
	DimensionMismatch { expected: usize, actual: usize },
	NonFiniteEmbedding,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedItem {
	pub content_id: String,
	pub reason: SkipReason,
}

/// Per-item outcome of an upsert batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpsertReport {
	pub indexed: Vec<String>,
	pub skipped: Vec<SkippedItem>,
}
impl UpsertReport {
	pub fn is_complete(&self) -> bool {
		self.skipped.is_empty()
	}
}

struct IndexEntry {
	/// Metadata only; the vector lives beside it.
	item: ContentItem,
	vector: Vec<f32>,
}

/// In-process vector index over content embeddings.
///
/// Writes lock once per item, so a running batch never blocks readers for its whole length.
/// When built with a backing source, the first search or upsert loads every item from it;
/// concurrent first callers share a single load.
pub struct ContentIndex {
	dimensions: usize,
	entries: RwLock<HashMap<String, IndexEntry>>,
	source: Option<Arc<dyn ContentSource>>,
	initialized: OnceCell<()>,
}
impl ContentIndex {
	pub fn new(dimensions: usize) -> Self {
		Self {
			dimensions,
			entries: RwLock::new(HashMap::new()),
			source: None,
			initialized: OnceCell::new(),
		}
	}

	pub fn with_source(dimensions: usize, source: Arc<dyn ContentSource>) -> Self {
		Self { source: Some(source), ..Self::new(dimensions) }
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn len(&self) -> usize {
		self.entries.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn is_initialized(&self) -> bool {
		self.initialized.initialized()
	}

	/// Populates the index from the backing source unless it already holds entries. A failed
	/// load leaves the index uninitialized so the next call retries.
	pub async fn ensure_initialized(&self) -> Result<()> {
		let Some(source) = self.source.as_ref() else {
			return Ok(());
		};

		self.initialized
			.get_or_try_init(|| async {
				if !self.is_empty() {
					return Ok(());
				}

				let items = source
					.list_all()
					.await
					.map_err(|err| Error::IndexUnavailable(err.to_string()))?;
				let report = self.upsert_items(&items);

				tracing::info!(
					indexed = report.indexed.len(),
					skipped = report.skipped.len(),
					"Vector index initialized from content source."
				);

				Ok::<_, Error>(())
			})
			.await
			.map(|_| ())
	}

	pub async fn upsert(&self, items: &[ContentItem]) -> Result<UpsertReport> {
		self.ensure_initialized().await?;

		Ok(self.upsert_items(items))
	}

	/// Best matches first; equal scores are ordered by ascending content id.
	pub async fn search(
		&self,
		query: &[f32],
		filter: Option<&FilterPredicate>,
		k: usize,
	) -> Result<Vec<ScoredResult>> {
		self.ensure_initialized().await?;

		if query.len() != self.dimensions {
			return Err(Error::IndexUnavailable(format!(
				"Query vector has {} dimensions, index expects {}.",
				query.len(),
				self.dimensions
			)));
		}
		if k == 0 {
			return Ok(Vec::new());
		}

		let mut scored: Vec<ScoredResult> = {
			let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());

			entries
				.iter()
				.filter(|(_, entry)| filter.is_none_or(|filter| filter.matches(&entry.item)))
				.map(|(id, entry)| ScoredResult {
					content_id: id.clone(),
					relevance_score: cosine_similarity(query, &entry.vector),
				})
				.collect()
		};

		scored.sort_by(|a, b| {
			cmp_f32_desc(a.relevance_score, b.relevance_score)
				.then_with(|| a.content_id.cmp(&b.content_id))
		});
		scored.truncate(k);

		Ok(scored)
	}

	pub fn remove(&self, content_id: &str) -> bool {
		self.entries.write().unwrap_or_else(|err| err.into_inner()).remove(content_id).is_some()
	}

	fn upsert_items(&self, items: &[ContentItem]) -> UpsertReport {
		let mut report = UpsertReport::default();

		for item in items {
			match self.check_embedding(item) {
				Ok(vector) => {
					let mut metadata = item.clone();

					metadata.embedding = None;

					self.entries
						.write()
						.unwrap_or_else(|err| err.into_inner())
						.insert(item.id.clone(), IndexEntry { item: metadata, vector });
					report.indexed.push(item.id.clone());
				},
				Err(reason) => {
					tracing::warn!(content_id = %item.id, reason = ?reason, "Skipped content during indexing.");

					report.skipped.push(SkippedItem { content_id: item.id.clone(), reason });
				},
			}
		}

		report
	}

	fn check_embedding(&self, item: &ContentItem) -> Result<Vec<f32>, SkipReason> {
		let Some(embedding) = item.embedding.as_ref().filter(|embedding| !embedding.is_empty())
		else {
			return Err(SkipReason::MissingEmbedding);
		};

		if embedding.len() != self.dimensions {
			return Err(SkipReason::DimensionMismatch {
				expected: self.dimensions,
				actual: embedding.len(),
			});
		}
		if embedding.iter().any(|value| !value.is_finite()) {
			return Err(SkipReason::NonFiniteEmbedding);
		}

		Ok(embedding.clone())
	}
}
