use serde::Serialize;

use pathwise_domain::ContentItem;
use pathwise_storage::UpsertReport;

use crate::{PathwiseService, Result};

#[derive(Debug, Serialize)]
pub struct ReindexReport {
	/// Input items, with embeddings filled in where they were missing.
	pub items: Vec<ContentItem>,
	pub embedded: usize,
	pub upsert: UpsertReport,
}

impl PathwiseService {
	/// Embeds items that lack an embedding, then upserts the whole batch into the index.
	///
	/// An embedding failure aborts before anything is written.
	pub async fn reindex(&self, mut items: Vec<ContentItem>) -> Result<ReindexReport> {
		let pending: Vec<usize> = items
			.iter()
			.enumerate()
			.filter(|(_, item)| !item.has_embedding())
			.map(|(position, _)| position)
			.collect();
		let texts: Vec<String> =
			pending.iter().map(|&position| items[position].embedding_text()).collect();
		let vectors = self.embedder().embed_batch(&texts).await?;

		for (&position, vector) in pending.iter().zip(vectors) {
			items[position].embedding = Some(vector);
		}

		let upsert = self.index.upsert(&items).await?;

		tracing::info!(
			embedded = pending.len(),
			indexed = upsert.indexed.len(),
			skipped = upsert.skipped.len(),
			"Reindex finished."
		);

		Ok(ReindexReport { items, embedded: pending.len(), upsert })
	}
}
