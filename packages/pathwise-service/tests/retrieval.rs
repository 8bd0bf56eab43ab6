use std::{collections::BTreeSet, sync::Arc};

use pathwise_domain::{ContentItem, StudentProfile, fallback::FALLBACK_CONTENT_SOURCE};
use pathwise_service::{EmbeddingProvider, Error, PathwiseService, Providers};
use pathwise_storage::InMemoryContentSource;
use pathwise_testkit::{FailingEmbedding, HashEmbedding, ScriptedGenerator, hash_vector};

const DIM: usize = 8;

fn service_with(items: Vec<ContentItem>, embedding: Arc<dyn EmbeddingProvider>) -> PathwiseService {
	let source = InMemoryContentSource::from_items(items);
	let providers = Providers::new(embedding, Arc::new(ScriptedGenerator::failing()));

	PathwiseService::with_providers(
		pathwise_testkit::test_config(DIM as u32),
		Arc::new(source),
		providers,
	)
}

fn ids(items: &[ContentItem]) -> Vec<&str> {
	items.iter().map(|item| item.id.as_str()).collect()
}

fn id_set(items: &[ContentItem]) -> BTreeSet<&str> {
	items.iter().map(|item| item.id.as_str()).collect()
}

#[tokio::test]
async fn embedding_failure_serves_subject_fallback() {
	let service = service_with(pathwise_testkit::sample_catalog(DIM), Arc::new(FailingEmbedding));
	let profile = StudentProfile::new("s-1").with_grade(8);
	let items = service.recommend(&profile, Some("Science"), Some(5)).await.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["fb-science-001", "fb-science-002"]);
	assert!(items.iter().all(|item| item.source == FALLBACK_CONTENT_SOURCE));
	assert!(items.iter().all(|item| item.subject == "Science"));
}

#[tokio::test]
async fn unknown_or_missing_subject_falls_back_to_default_subject() {
	let service = service_with(Vec::new(), Arc::new(FailingEmbedding));
	let profile = StudentProfile::new("s-2");
	let unknown = service.recommend(&profile, Some("Astronomy"), Some(5)).await.expect("retrieve failed");
	let missing = service.recommend(&profile, None, Some(5)).await.expect("retrieve failed");

	assert_eq!(ids(&unknown), vec!["fb-math-001", "fb-math-002"]);
	assert_eq!(ids(&missing), ids(&unknown));
}

#[tokio::test]
async fn fallback_is_truncated_to_k() {
	let service = service_with(Vec::new(), Arc::new(FailingEmbedding));
	let items = service
		.recommend(&StudentProfile::new("s-3"), Some("History"), Some(1))
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["fb-history-001"]);
}

#[tokio::test]
async fn repeated_retrieval_returns_same_order() {
	let service =
		service_with(pathwise_testkit::sample_catalog(DIM), Arc::new(HashEmbedding::new(DIM)));
	let profile = StudentProfile::new("s-4").with_grade(8).with_interests(["Mathematics"]);
	let first = service.recommend(&profile, Some("Mathematics"), Some(5)).await.expect("retrieve failed");
	let second = service.recommend(&profile, Some("Mathematics"), Some(5)).await.expect("retrieve failed");

	assert_eq!(ids(&first), ids(&second));
	assert_eq!(
		id_set(&first),
		["math-linear", "math-ratios", "math-statistics"].into_iter().collect()
	);
}

#[tokio::test]
async fn grade_eight_sees_intermediate_content_in_window() {
	let service =
		service_with(pathwise_testkit::sample_catalog(DIM), Arc::new(HashEmbedding::new(DIM)));
	let profile = StudentProfile::new("s-5").with_grade(8);
	let items = service.recommend(&profile, None, Some(10)).await.expect("retrieve failed");

	assert_eq!(
		id_set(&items),
		["math-linear", "math-ratios", "math-statistics", "science-cells"].into_iter().collect()
	);
}

#[tokio::test]
async fn zero_k_is_rejected() {
	let service = service_with(Vec::new(), Arc::new(HashEmbedding::new(DIM)));
	let err = service
		.recommend(&StudentProfile::new("s-6"), None, Some(0))
		.await
		.expect_err("Expected invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn hydration_misses_are_dropped() {
	let service =
		service_with(pathwise_testkit::sample_catalog(DIM), Arc::new(HashEmbedding::new(DIM)));
	let mut ghost = pathwise_testkit::content_item(
		"math-ghost",
		"Mathematics",
		pathwise_domain::DifficultyLevel::Beginner,
		&[8],
	);

	ghost.embedding = Some(hash_vector("ghost", DIM));

	let report = service.index.upsert(&[ghost]).await.expect("upsert failed");

	assert!(report.is_complete());

	let items = service
		.recommend(&StudentProfile::new("s-7"), Some("Mathematics"), Some(10))
		.await
		.expect("retrieve failed");

	assert_eq!(items.len(), 5);
	assert!(items.iter().all(|item| item.id != "math-ghost"));
}

#[tokio::test]
async fn empty_index_serves_fallback() {
	let service = service_with(Vec::new(), Arc::new(HashEmbedding::new(DIM)));
	let items = service
		.recommend(&StudentProfile::new("s-8").with_grade(6), Some("English"), None)
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["fb-english-001", "fb-english-002"]);
}

#[tokio::test]
async fn unavailable_index_serves_fallback() {
	let mut cfg = pathwise_testkit::test_config(DIM as u32);

	cfg.index.vector_dim = DIM as u32 + 1;

	let source = InMemoryContentSource::from_items(pathwise_testkit::sample_catalog(DIM));
	let providers =
		Providers::new(Arc::new(HashEmbedding::new(DIM)), Arc::new(ScriptedGenerator::failing()));
	let service = PathwiseService::with_providers(cfg, Arc::new(source), providers);
	let items = service
		.recommend(&StudentProfile::new("s-9"), Some("Science"), Some(5))
		.await
		.expect("retrieve failed");

	assert!(items.iter().all(|item| item.source == FALLBACK_CONTENT_SOURCE));
	assert_eq!(items.len(), 2);
}

fn art_catalog() -> Vec<ContentItem> {
	use pathwise_domain::DifficultyLevel::{Advanced, Beginner};

	let mut items = pathwise_testkit::sample_catalog(DIM);

	items.push(pathwise_testkit::content_item("art-shading", "Art", Beginner, &[5, 6]));
	items.push(pathwise_testkit::content_item("art-color", "Art", Beginner, &[5, 6]));
	items.push(pathwise_testkit::content_item("art-perspective", "Art", Advanced, &[10, 11]));

	items
}

#[tokio::test]
async fn uncurated_subject_serves_catalog_items_for_that_subject() {
	let service = service_with(art_catalog(), Arc::new(FailingEmbedding));
	let items = service
		.recommend(&StudentProfile::new("s-10"), Some("Art"), Some(2))
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["art-color", "art-perspective"]);
	assert!(items.iter().all(|item| item.subject == "Art"));
	assert!(items.iter().all(|item| item.source != FALLBACK_CONTENT_SOURCE));
}

#[tokio::test]
async fn catalog_subject_items_respect_the_grade_policy() {
	let service = service_with(art_catalog(), Arc::new(FailingEmbedding));
	let senior = service
		.recommend(&StudentProfile::new("s-11").with_grade(11), Some("Art"), Some(5))
		.await
		.expect("retrieve failed");
	let middle = service
		.recommend(&StudentProfile::new("s-12").with_grade(8), Some("Art"), Some(5))
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&senior), vec!["art-perspective"]);
	assert_eq!(ids(&middle), vec!["fb-math-001", "fb-math-002"]);
}

#[tokio::test]
async fn curated_subjects_ignore_catalog_items() {
	let service = service_with(art_catalog(), Arc::new(FailingEmbedding));
	let items = service
		.recommend(&StudentProfile::new("s-13"), Some("Mathematics"), Some(5))
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["fb-math-001", "fb-math-002"]);
}

#[tokio::test]
async fn default_http_providers_degrade_to_fallback_when_unreachable() {
	let source = InMemoryContentSource::from_items(pathwise_testkit::sample_catalog(DIM));
	let service = PathwiseService::new(pathwise_testkit::test_config(DIM as u32), Arc::new(source));
	let items = service
		.recommend(&StudentProfile::new("s-14"), Some("History"), Some(5))
		.await
		.expect("retrieve failed");

	assert_eq!(ids(&items), vec!["fb-history-001", "fb-history-002"]);
}
