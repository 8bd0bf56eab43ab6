use std::{
	collections::BTreeMap,
	sync::{Arc, RwLock},
};

use pathwise_domain::ContentItem;

use crate::{BoxFuture, Result};

/// Read access to the content repository.
pub trait ContentSource
where
	Self: Send + Sync,
{
	/// Items for the ids that exist; unknown ids are omitted, order is unspecified.
	fn get_by_ids<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<ContentItem>>>;

	fn get_by_subject<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<Vec<ContentItem>>>;

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<ContentItem>>>;
}

/// A content source over a validated, in-process catalog.
#[derive(Clone, Default)]
pub struct InMemoryContentSource {
	items: Arc<RwLock<BTreeMap<String, ContentItem>>>,
}
impl InMemoryContentSource {
	/// Builds the source from raw items, dropping (and logging) the ones that fail validation.
	pub fn from_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
		let source = Self::default();

		for item in items {
			if let Err(err) = item.validate() {
				tracing::warn!(content_id = %item.id, error = %err, "Rejected content record.");

				continue;
			}

			source.put(item);
		}

		source
	}

	/// Inserts or replaces an item. Returns the replaced item, if any.
	pub fn put(&self, item: ContentItem) -> Option<ContentItem> {
		let mut items = self.items.write().unwrap_or_else(|err| err.into_inner());

		items.insert(item.id.clone(), item)
	}

	pub fn len(&self) -> usize {
		self.items.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn snapshot(&self) -> Vec<ContentItem> {
		self.items.read().unwrap_or_else(|err| err.into_inner()).values().cloned().collect()
	}
}
impl ContentSource for InMemoryContentSource {
	fn get_by_ids<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<ContentItem>>> {
		let found: Vec<ContentItem> = {
			let items = self.items.read().unwrap_or_else(|err| err.into_inner());

			ids.iter().filter_map(|id| items.get(id).cloned()).collect()
		};

		Box::pin(async move { Ok(found) })
	}

	fn get_by_subject<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<Vec<ContentItem>>> {
		let found: Vec<ContentItem> = {
			let items = self.items.read().unwrap_or_else(|err| err.into_inner());

			items.values().filter(|item| item.subject == subject).cloned().collect()
		};

		Box::pin(async move { Ok(found) })
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<ContentItem>>> {
		let all = self.snapshot();

		Box::pin(async move { Ok(all) })
	}
}
