use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use pathwise_domain::{ContentItem, ContentType, DifficultyLevel, FilterClause, FilterPredicate};
use pathwise_storage::{
	BoxFuture, ContentIndex, ContentSource, Error, InMemoryContentSource, Result, SkipReason,
};

const DIM: usize = 3;

struct CountingSource {
	inner: InMemoryContentSource,
	list_calls: Arc<AtomicUsize>,
	fail_first: bool,
}
impl ContentSource for CountingSource {
	fn get_by_ids<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<ContentItem>>> {
		self.inner.get_by_ids(ids)
	}

	fn get_by_subject<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, Result<Vec<ContentItem>>> {
		self.inner.get_by_subject(subject)
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<ContentItem>>> {
		let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
		let fail = self.fail_first && call == 0;
		let items = self.inner.snapshot();

		Box::pin(async move {
			tokio::time::sleep(Duration::from_millis(20)).await;

			if fail {
				return Err(Error::ContentSource("Catalog backend offline.".to_string()));
			}

			Ok(items)
		})
	}
}

fn item(id: &str, subject: &str, embedding: Option<Vec<f32>>) -> ContentItem {
	ContentItem {
		id: id.to_string(),
		title: format!("Title {id}"),
		description: String::new(),
		content_type: ContentType::Article,
		subject: subject.to_string(),
		topics: Vec::new(),
		difficulty_level: DifficultyLevel::Intermediate,
		grade_level: [8].into_iter().collect(),
		duration_minutes: Some(15),
		keywords: Vec::new(),
		url: format!("https://example.org/{id}"),
		source: "catalog".to_string(),
		embedding,
	}
}

fn catalog() -> Vec<ContentItem> {
	vec![
		item("a", "Mathematics", Some(vec![1.0, 0.0, 0.0])),
		item("b", "Mathematics", Some(vec![0.0, 1.0, 0.0])),
		item("c", "Science", Some(vec![0.7, 0.7, 0.0])),
		item("d", "Science", Some(vec![0.0, 0.0, 1.0])),
	]
}

#[tokio::test]
async fn empty_index_returns_no_results() {
	let index = ContentIndex::new(DIM);
	let hits = index.search(&[1.0, 0.0, 0.0], None, 5).await.expect("search failed");

	assert!(hits.is_empty());
}

#[tokio::test]
async fn results_are_bounded_and_sorted() {
	let index = ContentIndex::new(DIM);

	index.upsert(&catalog()).await.expect("upsert failed");

	let hits = index.search(&[0.9, 0.3, 0.1], None, 3).await.expect("search failed");

	assert_eq!(hits.len(), 3);
	assert!(hits.windows(2).all(|pair| pair[0].relevance_score >= pair[1].relevance_score));
	assert_eq!(hits[0].content_id, "a");
}

#[tokio::test]
async fn equal_scores_break_ties_by_id() {
	let index = ContentIndex::new(DIM);
	let same = Some(vec![0.0, 1.0, 0.0]);

	index
		.upsert(&[item("zeta", "Art", same.clone()), item("alpha", "Art", same.clone())])
		.await
		.expect("upsert failed");

	for _ in 0..3 {
		let hits = index.search(&[0.0, 1.0, 0.0], None, 2).await.expect("search failed");
		let ids = hits.iter().map(|hit| hit.content_id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["alpha", "zeta"]);
	}
}

#[tokio::test]
async fn own_embedding_ranks_first() {
	let index = ContentIndex::new(DIM);

	index.upsert(&catalog()).await.expect("upsert failed");

	let hits = index.search(&[0.7, 0.7, 0.0], None, 4).await.expect("search failed");

	assert_eq!(hits[0].content_id, "c");
	assert!((hits[0].relevance_score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn batch_skips_items_without_usable_embeddings() {
	let index = ContentIndex::new(DIM);
	let report = index
		.upsert(&[
			item("ok", "Art", Some(vec![1.0, 1.0, 1.0])),
			item("bare", "Art", None),
			item("short", "Art", Some(vec![1.0, 1.0])),
		])
		.await
		.expect("upsert failed");

	assert_eq!(report.indexed, vec!["ok".to_string()]);
	assert_eq!(report.skipped.len(), 2);
	assert_eq!(report.skipped[0].content_id, "bare");
	assert_eq!(report.skipped[0].reason, SkipReason::MissingEmbedding);
	assert_eq!(
		report.skipped[1].reason,
		SkipReason::DimensionMismatch { expected: DIM, actual: 2 }
	);
	assert!(!report.is_complete());
	assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn reupsert_replaces_entry() {
	let index = ContentIndex::new(DIM);

	index.upsert(&[item("a", "Art", Some(vec![1.0, 0.0, 0.0]))]).await.expect("upsert failed");
	index.upsert(&[item("a", "Art", Some(vec![0.0, 0.0, 1.0]))]).await.expect("upsert failed");

	let hits = index.search(&[0.0, 0.0, 1.0], None, 1).await.expect("search failed");

	assert_eq!(index.len(), 1);
	assert!((hits[0].relevance_score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn filter_narrows_candidates() {
	let index = ContentIndex::new(DIM);

	index.upsert(&catalog()).await.expect("upsert failed");

	let filter = FilterPredicate::new().and(FilterClause::SubjectEq("Science".to_string()));
	let hits = index.search(&[1.0, 0.0, 0.0], Some(&filter), 10).await.expect("search failed");
	let mut ids = hits.iter().map(|hit| hit.content_id.clone()).collect::<Vec<_>>();

	ids.sort();

	assert_eq!(ids, vec!["c".to_string(), "d".to_string()]);
}

#[tokio::test]
async fn wrong_query_dimension_is_unavailable() {
	let index = ContentIndex::new(DIM);
	let err = index.search(&[1.0, 0.0], None, 5).await.expect_err("Expected dimension error.");

	assert!(matches!(err, Error::IndexUnavailable(_)));
}

#[tokio::test]
async fn zero_k_returns_nothing() {
	let index = ContentIndex::new(DIM);

	index.upsert(&catalog()).await.expect("upsert failed");

	assert!(index.search(&[1.0, 0.0, 0.0], None, 0).await.expect("search failed").is_empty());
}

#[tokio::test]
async fn removed_items_leave_search() {
	let index = ContentIndex::new(DIM);

	index.upsert(&catalog()).await.expect("upsert failed");

	assert!(index.remove("a"));
	assert!(!index.remove("a"));

	let hits = index.search(&[1.0, 0.0, 0.0], None, 10).await.expect("search failed");

	assert!(hits.iter().all(|hit| hit.content_id != "a"));
}

#[tokio::test]
async fn concurrent_first_searches_initialize_once() {
	let list_calls = Arc::new(AtomicUsize::new(0));
	let source = CountingSource {
		inner: InMemoryContentSource::from_items(catalog()),
		list_calls: list_calls.clone(),
		fail_first: false,
	};
	let index = Arc::new(ContentIndex::with_source(DIM, Arc::new(source)));
	let query = [1.0, 0.0, 0.0];
	let (a, b, c) = tokio::join!(
		index.search(&query, None, 2),
		index.search(&query, None, 2),
		index.search(&query, None, 2),
	);

	assert_eq!(list_calls.load(Ordering::SeqCst), 1);
	assert_eq!(index.len(), 4);
	assert!(index.is_initialized());

	let a = a.expect("search failed");

	assert_eq!(a, b.expect("search failed"));
	assert_eq!(a, c.expect("search failed"));
}

#[tokio::test]
async fn failed_initialization_is_retried() {
	let list_calls = Arc::new(AtomicUsize::new(0));
	let source = CountingSource {
		inner: InMemoryContentSource::from_items(catalog()),
		list_calls: list_calls.clone(),
		fail_first: true,
	};
	let index = ContentIndex::with_source(DIM, Arc::new(source));
	let err =
		index.search(&[1.0, 0.0, 0.0], None, 2).await.expect_err("Expected init failure.");

	assert!(matches!(err, Error::IndexUnavailable(_)));
	assert!(!index.is_initialized());

	let hits = index.search(&[1.0, 0.0, 0.0], None, 2).await.expect("search failed");

	assert_eq!(list_calls.load(Ordering::SeqCst), 2);
	assert_eq!(hits[0].content_id, "a");
}
