use std::collections::BTreeMap;

use crate::content::{ContentItem, ContentType, DifficultyLevel};

pub const FALLBACK_CONTENT_SOURCE: &str = "fallback";
pub const DEFAULT_FALLBACK_SUBJECT: &str = "Mathematics";

/// Curated content served when live retrieval yields nothing.
#[derive(Clone, Debug)]
pub struct FallbackCatalog {
	by_subject: BTreeMap<String, Vec<ContentItem>>,
	default_subject: String,
}
impl FallbackCatalog {
	pub fn new(default_subject: impl Into<String>) -> Self {
		Self { by_subject: BTreeMap::new(), default_subject: default_subject.into() }
	}

	/// Two items each for Mathematics, Science, English and History.
	pub fn builtin(default_subject: impl Into<String>) -> Self {
		let mut catalog = Self::new(default_subject);

		catalog.insert(
			"Mathematics",
			vec![
				fallback_item(
					"fb-math-001",
					"Introduction to Algebra Concepts",
					"This resource introduces foundational algebra concepts with visual explanations and interactive examples.",
					ContentType::Lesson,
					DifficultyLevel::Intermediate,
					"https://www.khanacademy.org/math/algebra",
					&[6, 7, 8, 9, 10],
					&["algebra", "equations", "variables", "expressions"],
				),
				fallback_item(
					"fb-math-002",
					"Visual Geometry Learning",
					"An interactive geometry resource with visual demonstrations of shapes, angles, and transformations.",
					ContentType::Interactive,
					DifficultyLevel::Beginner,
					"https://www.geogebra.org/geometry",
					&[4, 5, 6, 7, 8],
					&["geometry", "shapes", "angles", "transformations"],
				),
			],
		);
		catalog.insert(
			"Science",
			vec![
				fallback_item(
					"fb-science-001",
					"Introduction to Scientific Method",
					"Learn the scientific method through interactive experiments and real-world examples.",
					ContentType::Lesson,
					DifficultyLevel::Beginner,
					"https://www.khanacademy.org/science/high-school-biology",
					&[5, 6, 7, 8, 9],
					&["scientific method", "experiments", "hypothesis", "research"],
				),
				fallback_item(
					"fb-science-002",
					"Earth's Systems and Cycles",
					"Explore Earth's major systems and cycles including the water cycle, carbon cycle, and weather patterns.",
					ContentType::Video,
					DifficultyLevel::Intermediate,
					"https://www.nationalgeographic.org/encyclopedia/earths-systems/",
					&[6, 7, 8, 9, 10],
					&["earth science", "water cycle", "weather", "climate"],
				),
			],
		);
		catalog.insert(
			"English",
			vec![
				fallback_item(
					"fb-english-001",
					"Reading Comprehension Strategies",
					"Learn effective reading comprehension strategies to better understand and analyze texts.",
					ContentType::Lesson,
					DifficultyLevel::Intermediate,
					"https://www.readingstrategies.org/comprehension",
					&[6, 7, 8, 9, 10],
					&["reading", "comprehension", "analysis", "literacy"],
				),
				fallback_item(
					"fb-english-002",
					"Essay Writing Fundamentals",
					"A comprehensive guide to writing effective essays with structure and clarity.",
					ContentType::Article,
					DifficultyLevel::Intermediate,
					"https://owl.purdue.edu/owl/general_writing/academic_writing/essay_writing/index.html",
					&[7, 8, 9, 10, 11],
					&["writing", "essays", "structure", "composition"],
				),
			],
		);
		catalog.insert(
			"History",
			vec![
				fallback_item(
					"fb-history-001",
					"Timeline of World History",
					"Interactive timeline of major events in world history with multimedia resources.",
					ContentType::Interactive,
					DifficultyLevel::Intermediate,
					"https://www.bbc.co.uk/history/interactive/timelines/",
					&[6, 7, 8, 9, 10],
					&["world history", "timeline", "civilization", "events"],
				),
				fallback_item(
					"fb-history-002",
					"Primary Source Analysis",
					"Learn techniques for analyzing and interpreting primary historical sources.",
					ContentType::Lesson,
					DifficultyLevel::Advanced,
					"https://www.loc.gov/programs/teachers/primary-source-analysis-tool/",
					&[8, 9, 10, 11, 12],
					&["primary sources", "historical analysis", "documents", "research"],
				),
			],
		);

		catalog
	}

	/// Registers the set for `subject`; items without a subject take it.
	pub fn insert(&mut self, subject: impl Into<String>, mut items: Vec<ContentItem>) {
		let subject = subject.into();

		for item in items.iter_mut().filter(|item| item.subject.is_empty()) {
			item.subject = subject.clone();
		}

		self.by_subject.insert(subject, items);
	}

	pub fn default_subject(&self) -> &str {
		&self.default_subject
	}

	pub fn subjects(&self) -> impl Iterator<Item = &str> {
		self.by_subject.keys().map(String::as_str)
	}

	pub fn covers(&self, subject: &str) -> bool {
		self.by_subject.contains_key(subject)
	}

	/// Subject whose set will be served for `subject`.
	pub fn resolve_subject<'a>(&'a self, subject: Option<&'a str>) -> &'a str {
		match subject {
			Some(subject) if self.by_subject.contains_key(subject) => subject,
			_ => &self.default_subject,
		}
	}

	/// Fallback items for `subject`, or for the default subject when it has none. Empty when
	/// neither is registered.
	pub fn items_for(&self, subject: Option<&str>) -> &[ContentItem] {
		self.by_subject.get(self.resolve_subject(subject)).map(Vec::as_slice).unwrap_or(&[])
	}
}
impl Default for FallbackCatalog {
	fn default() -> Self {
		Self::builtin(DEFAULT_FALLBACK_SUBJECT)
	}
}

#[allow(clippy::too_many_arguments)]
fn fallback_item(
	id: &str,
	title: &str,
	description: &str,
	content_type: ContentType,
	difficulty_level: DifficultyLevel,
	url: &str,
	grade_level: &[i32],
	keywords: &[&str],
) -> ContentItem {
	ContentItem {
		id: id.to_string(),
		title: title.to_string(),
		description: description.to_string(),
		content_type,
		subject: String::new(),
		topics: Vec::new(),
		difficulty_level,
		grade_level: grade_level.iter().copied().collect(),
		duration_minutes: None,
		keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
		url: url.to_string(),
		source: FALLBACK_CONTENT_SOURCE.to_string(),
		embedding: None,
	}
}
