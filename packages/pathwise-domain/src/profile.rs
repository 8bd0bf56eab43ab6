use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
	Visual,
	Auditory,
	ReadingWriting,
	Kinesthetic,
	#[default]
	Mixed,
}
impl LearningStyle {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Visual => "visual",
			Self::Auditory => "auditory",
			Self::ReadingWriting => "reading_writing",
			Self::Kinesthetic => "kinesthetic",
			Self::Mixed => "mixed",
		}
	}
}

/// Snapshot of a student taken for one retrieval or synthesis call.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StudentProfile {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default)]
	pub grade_level: Option<i32>,
	#[serde(default)]
	pub learning_style: LearningStyle,
	/// Ordered as entered; duplicates are kept.
	#[serde(default)]
	pub subjects_of_interest: Vec<String>,
	#[serde(default)]
	pub areas_for_improvement: Vec<String>,
}
impl StudentProfile {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: None,
			grade_level: None,
			learning_style: LearningStyle::default(),
			subjects_of_interest: Vec::new(),
			areas_for_improvement: Vec::new(),
		}
	}

	pub fn with_grade(mut self, grade_level: i32) -> Self {
		self.grade_level = Some(grade_level);

		self
	}

	pub fn with_style(mut self, learning_style: LearningStyle) -> Self {
		self.learning_style = learning_style;

		self
	}

	pub fn with_interests<I, S>(mut self, interests: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.subjects_of_interest = interests.into_iter().map(Into::into).collect();

		self
	}

	pub fn display_name(&self) -> &str {
		self.name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.id)
	}

	pub fn grade_label(&self) -> String {
		self.grade_level.map(|grade| grade.to_string()).unwrap_or_else(|| "unknown".to_string())
	}

	pub fn interests_label(&self) -> String {
		if self.subjects_of_interest.is_empty() {
			"general learning".to_string()
		} else {
			self.subjects_of_interest.join(", ")
		}
	}
}
