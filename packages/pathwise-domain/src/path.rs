use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ContentType;

/// School days scheduled in each path week.
pub const DAYS_PER_WEEK: u32 = 5;

/// A multi-week path: weekly themes and goals, each week split into school days.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LearningPath {
	pub id: String,
	pub student_id: String,
	pub subject: String,
	pub title: String,
	pub description: String,
	pub overall_goal: String,
	pub weeks: Vec<PathWeek>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl LearningPath {
	/// The path served when generation fails: generic texts and no weeks.
	pub fn new(student_id: impl Into<String>, subject: impl Into<String>, now: OffsetDateTime) -> Self {
		let subject = subject.into();

		Self {
			id: Uuid::new_v4().to_string(),
			student_id: student_id.into(),
			title: format!("{subject} Learning Path"),
			description: format!("A learning path for {subject}"),
			overall_goal: format!("Learn the fundamentals of {subject}"),
			subject,
			weeks: Vec::new(),
			created_at: now,
		}
	}

	pub fn activity_count(&self) -> usize {
		self.activities().count()
	}

	pub fn total_minutes(&self) -> u32 {
		self.activities().map(|activity| activity.duration_minutes).sum()
	}

	pub fn activities(&self) -> impl Iterator<Item = &PathActivity> {
		self.weeks.iter().flat_map(|week| week.days.iter()).flat_map(|day| day.activities.iter())
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PathWeek {
	/// 1-based.
	pub week_number: u32,
	pub theme: String,
	pub goal: String,
	pub days: Vec<PathDay>,
	#[serde(default)]
	pub skills: Vec<String>,
	#[serde(default)]
	pub assessment: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PathDay {
	/// 1-based within the week, at most [`DAYS_PER_WEEK`].
	pub day_number: u32,
	pub activities: Vec<PathActivity>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PathActivity {
	pub title: String,
	pub description: String,
	pub content_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<ContentType>,
	pub duration_minutes: u32,
}
