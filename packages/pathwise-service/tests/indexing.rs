use std::sync::{Arc, atomic::Ordering};

use pathwise_domain::DifficultyLevel;
use pathwise_service::{Embedder, Error, PathwiseService, Providers};
use pathwise_storage::{InMemoryContentSource, SkipReason};
use pathwise_testkit::{FailingEmbedding, HashEmbedding, ScriptedGenerator, content_item, hash_vector};

const DIM: usize = 8;

#[tokio::test]
async fn batches_follow_batch_size_and_keep_order() {
	let cfg = pathwise_testkit::test_config(DIM as u32);
	let provider = HashEmbedding::new(DIM);
	let embedder = Embedder::new(&cfg.providers.embedding, &provider);
	let texts: Vec<String> = (0..5).map(|n| format!("text {n}")).collect();
	let vectors = embedder.embed_batch(&texts).await.expect("embed failed");

	assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
	assert_eq!(vectors.len(), 5);

	for (text, vector) in texts.iter().zip(&vectors) {
		assert_eq!(vector, &hash_vector(text, DIM));
	}
}

#[tokio::test]
async fn wrong_dimension_is_an_embedding_failure() {
	let cfg = pathwise_testkit::test_config(DIM as u32);
	let provider = HashEmbedding::new(DIM / 2);
	let err = Embedder::new(&cfg.providers.embedding, &provider)
		.embed("")
		.await
		.expect_err("Expected embedding failure.");

	assert!(matches!(err, Error::EmbeddingFailure { .. }));
}

#[tokio::test]
async fn reindex_embeds_missing_vectors_and_reports_skips() {
	let mut items = vec![
		content_item("a", "Mathematics", DifficultyLevel::Beginner, &[4]),
		content_item("b", "Science", DifficultyLevel::Advanced, &[11]),
		content_item("c", "History", DifficultyLevel::Intermediate, &[8]),
	];

	items[2].embedding = Some(vec![1.0; DIM - 1]);

	let source = InMemoryContentSource::from_items(items.clone());
	let providers =
		Providers::new(Arc::new(HashEmbedding::new(DIM)), Arc::new(ScriptedGenerator::failing()));
	let service = PathwiseService::with_providers(
		pathwise_testkit::test_config(DIM as u32),
		Arc::new(source),
		providers,
	);
	let report = service.reindex(items).await.expect("reindex failed");

	assert_eq!(report.embedded, 2);
	assert_eq!(report.upsert.indexed, vec!["a".to_string(), "b".to_string()]);
	assert_eq!(report.upsert.skipped.len(), 1);
	assert_eq!(
		report.upsert.skipped[0].reason,
		SkipReason::DimensionMismatch { expected: DIM, actual: DIM - 1 }
	);
	assert!(report.items[0].has_embedding());
	assert_eq!(service.index.len(), 2);
}

#[tokio::test]
async fn reindex_aborts_when_embedding_fails() {
	let items = vec![content_item("a", "Mathematics", DifficultyLevel::Beginner, &[4])];
	let providers =
		Providers::new(Arc::new(FailingEmbedding), Arc::new(ScriptedGenerator::failing()));
	let service = PathwiseService::with_providers(
		pathwise_testkit::test_config(DIM as u32),
		Arc::new(InMemoryContentSource::default()),
		providers,
	);
	let err = service.reindex(items).await.expect_err("Expected embedding failure.");

	assert!(matches!(err, Error::EmbeddingFailure { .. }));
	assert!(service.index.is_empty());
}
