use std::collections::HashMap;

use pathwise_domain::{ContentItem, FallbackCatalog, FilterPredicate, StudentProfile};
use pathwise_storage::{ContentIndex, ContentSource, ScoredResult};

use crate::{Embedder, Error, Result, query};

/// Query, embed, search, hydrate. Falls back to the source's own items for subjects the curated
/// catalog does not cover, then to curated content, whenever search yields nothing.
pub struct ContentRetriever<'a> {
	embedder: Embedder<'a>,
	index: &'a ContentIndex,
	source: &'a dyn ContentSource,
	fallback: &'a FallbackCatalog,
}
impl<'a> ContentRetriever<'a> {
	pub fn new(
		embedder: Embedder<'a>,
		index: &'a ContentIndex,
		source: &'a dyn ContentSource,
		fallback: &'a FallbackCatalog,
	) -> Self {
		Self { embedder, index, source, fallback }
	}

	/// Up to `k` items in relevance order.
	///
	/// Backend failures never surface here: they degrade to the fallback set for `subject`.
	/// Only `k == 0` is an error.
	pub async fn retrieve(
		&self,
		profile: &StudentProfile,
		subject: Option<&str>,
		k: usize,
	) -> Result<Vec<ContentItem>> {
		if k == 0 {
			return Err(Error::InvalidRequest { message: "k must be greater than zero.".to_string() });
		}

		let query = query::build_query(profile, subject);
		let subject = query.filter.subject();

		tracing::debug!(
			student_id = %profile.id,
			filter = %query.filter.to_value(),
			"Built content query."
		);

		let vector = match self.embedder.embed(&query.text).await {
			Ok(vector) => vector,
			Err(err) => {
				tracing::warn!(
					student_id = %profile.id,
					error = %err,
					"Query embedding failed. Serving fallback content."
				);

				return Ok(self.fallback_items(&query.filter, k).await);
			},
		};
		let scored = match self.index.search(&vector, Some(&query.filter), k).await {
			Ok(scored) => scored,
			Err(err) => {
				let err = Error::from(err);

				tracing::warn!(student_id = %profile.id, error = %err, "Vector search failed.");

				Vec::new()
			},
		};
		let items = self.hydrate(&scored).await;

		if items.is_empty() {
			tracing::info!(
				student_id = %profile.id,
				subject = subject.unwrap_or("none"),
				"No indexed content matched. Serving fallback content."
			);

			return Ok(self.fallback_items(&query.filter, k).await);
		}

		Ok(items)
	}

	async fn hydrate(&self, scored: &[ScoredResult]) -> Vec<ContentItem> {
		if scored.is_empty() {
			return Vec::new();
		}

		let ids: Vec<String> = scored.iter().map(|hit| hit.content_id.clone()).collect();
		let found = match self.source.get_by_ids(&ids).await {
			Ok(found) => found,
			Err(err) => {
				tracing::warn!(error = %err, "Content hydration failed.");

				return Vec::new();
			},
		};
		let mut by_id: HashMap<String, ContentItem> =
			found.into_iter().map(|item| (item.id.clone(), item)).collect();

		scored
			.iter()
			.filter_map(|hit| {
				let item = by_id.remove(&hit.content_id);

				if item.is_none() {
					tracing::warn!(content_id = %hit.content_id, "Content hydration missed.");
				}

				item
			})
			.collect()
	}

	async fn fallback_items(&self, filter: &FilterPredicate, k: usize) -> Vec<ContentItem> {
		let subject = filter.subject();

		if let Some(subject) = subject.filter(|subject| !self.fallback.covers(subject)) {
			let items = self.subject_items(subject, filter, k).await;

			if !items.is_empty() {
				tracing::debug!(subject, count = items.len(), "Served catalog content for subject.");

				return items;
			}
		}

		let resolved = self.fallback.resolve_subject(subject);
		let items: Vec<ContentItem> = self.fallback.items_for(subject).iter().take(k).cloned().collect();

		tracing::debug!(subject = resolved, count = items.len(), "Resolved fallback content.");

		items
	}

	/// Source items for `subject` that pass `filter`, in id order.
	async fn subject_items(
		&self,
		subject: &str,
		filter: &FilterPredicate,
		k: usize,
	) -> Vec<ContentItem> {
		let mut items = match self.source.get_by_subject(subject).await {
			Ok(items) => items,
			Err(err) => {
				tracing::warn!(subject, error = %err, "Subject lookup failed.");

				return Vec::new();
			},
		};

		items.retain(|item| filter.matches(item));
		items.sort_by(|a, b| a.id.cmp(&b.id));
		items.truncate(k);

		items
	}
}
