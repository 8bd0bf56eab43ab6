use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_CONTENT_SOURCE: &str = "catalog";

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
	Article,
	Video,
	Interactive,
	Worksheet,
	Quiz,
	Lesson,
	Activity,
}
impl ContentType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Article => "article",
			Self::Video => "video",
			Self::Interactive => "interactive",
			Self::Worksheet => "worksheet",
			Self::Quiz => "quiz",
			Self::Lesson => "lesson",
			Self::Activity => "activity",
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
	Beginner,
	Intermediate,
	Advanced,
}
impl DifficultyLevel {
	pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Beginner => "beginner",
			Self::Intermediate => "intermediate",
			Self::Advanced => "advanced",
		}
	}
}

/// A read-only educational resource. Records are validated once, when they enter through a
/// content source.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ContentItem {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	pub content_type: ContentType,
	pub subject: String,
	#[serde(default)]
	pub topics: Vec<String>,
	pub difficulty_level: DifficultyLevel,
	/// Target grades of the resource.
	#[serde(default)]
	pub grade_level: BTreeSet<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub duration_minutes: Option<u32>,
	#[serde(default)]
	pub keywords: Vec<String>,
	pub url: String,
	#[serde(default = "default_source")]
	pub source: String,
	/// Items without an embedding never enter the vector index.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
}
impl ContentItem {
	pub fn validate(&self) -> Result<()> {
		for (label, value) in [("id", &self.id), ("title", &self.title), ("url", &self.url)] {
			if value.trim().is_empty() {
				return Err(Error::InvalidContent {
					message: format!("Content {label} must be non-empty."),
				});
			}
		}

		if let Some(embedding) = self.embedding.as_ref() {
			if embedding.is_empty() {
				return Err(Error::InvalidContent {
					message: format!("Content {} has an empty embedding.", self.id),
				});
			}
			if embedding.iter().any(|value| !value.is_finite()) {
				return Err(Error::InvalidContent {
					message: format!("Content {} has a non-finite embedding value.", self.id),
				});
			}
		}

		Ok(())
	}

	/// Text fed to the embedding provider when this item is indexed.
	pub fn embedding_text(&self) -> String {
		let mut parts = vec![format!("Title: {}", self.title), format!("Subject: {}", self.subject)];

		if !self.description.trim().is_empty() {
			parts.push(format!("Description: {}", self.description));
		}
		if !self.topics.is_empty() {
			parts.push(format!("Topics: {}", self.topics.join(", ")));
		}
		if !self.keywords.is_empty() {
			parts.push(format!("Keywords: {}", self.keywords.join(", ")));
		}

		parts.push(format!("Difficulty: {}", self.difficulty_level.as_str()));

		parts.join("\n")
	}

	pub fn has_embedding(&self) -> bool {
		self.embedding.as_ref().is_some_and(|embedding| !embedding.is_empty())
	}
}

fn default_source() -> String {
	DEFAULT_CONTENT_SOURCE.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item() -> ContentItem {
		serde_json::from_value(serde_json::json!({
			"id": "c-1",
			"title": "Fractions",
			"description": "Adding fractions with unlike denominators.",
			"content_type": "lesson",
			"subject": "Mathematics",
			"difficulty_level": "beginner",
			"grade_level": [5, 4, 5],
			"url": "https://example.org/fractions"
		}))
		.expect("Failed to parse content item.")
	}

	#[test]
	fn deserializes_with_defaults() {
		let item = item();

		assert_eq!(item.source, DEFAULT_CONTENT_SOURCE);
		assert_eq!(item.grade_level.iter().copied().collect::<Vec<_>>(), vec![4, 5]);
		assert!(item.topics.is_empty());
		assert!(!item.has_embedding());
	}

	#[test]
	fn rejects_blank_url() {
		let mut item = item();

		item.url = " ".to_string();

		let err = item.validate().expect_err("Expected validation error.");

		assert!(err.to_string().contains("Content url must be non-empty."));
	}

	#[test]
	fn rejects_non_finite_embedding() {
		let mut item = item();

		item.embedding = Some(vec![0.1, f32::NAN]);

		assert!(item.validate().is_err());
	}

	#[test]
	fn embedding_text_names_title_and_subject() {
		let text = item().embedding_text();

		assert!(text.starts_with("Title: Fractions\nSubject: Mathematics"));
		assert!(text.ends_with("Difficulty: beginner"));
	}
}
