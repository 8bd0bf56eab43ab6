use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
	#[default]
	NotStarted,
	InProgress,
	Completed,
}
impl ActivityStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::NotStarted => "not_started",
			Self::InProgress => "in_progress",
			Self::Completed => "completed",
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LearningActivity {
	pub id: String,
	pub title: String,
	pub description: String,
	/// Always one of the candidate ids the plan was synthesized from, or `None`.
	pub content_id: Option<String>,
	pub content_url: Option<String>,
	pub duration_minutes: u32,
	/// 1-based display position.
	pub order: u32,
	/// 1-based plan day, never past the plan's duration.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub day: Option<u32>,
	pub status: ActivityStatus,
	#[serde(with = "time::serde::rfc3339::option")]
	pub completed_at: Option<OffsetDateTime>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub learning_benefit: Option<String>,
}
impl LearningActivity {
	pub fn new(title: impl Into<String>, description: impl Into<String>, order: u32) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			title: title.into(),
			description: description.into(),
			content_id: None,
			content_url: None,
			duration_minutes: 0,
			order,
			day: None,
			status: ActivityStatus::NotStarted,
			completed_at: None,
			learning_benefit: None,
		}
	}
}

/// Plan status and progress as derived from the activity list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlanProgress {
	pub progress_percentage: f64,
	pub status: ActivityStatus,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LearningPlan {
	pub id: String,
	pub student_id: String,
	pub title: String,
	pub description: String,
	pub subject: String,
	pub topics: Vec<String>,
	pub activities: Vec<LearningActivity>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub start_date: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub end_date: OffsetDateTime,
}
impl LearningPlan {
	pub fn new(
		student_id: impl Into<String>,
		subject: impl Into<String>,
		now: OffsetDateTime,
		duration_days: u32,
	) -> Self {
		let subject = subject.into();

		Self {
			id: Uuid::new_v4().to_string(),
			student_id: student_id.into(),
			title: format!("{subject} Learning Plan"),
			description: format!("A basic learning plan for {subject}"),
			topics: vec![subject.clone()],
			subject,
			activities: Vec::new(),
			created_at: now,
			updated_at: now,
			start_date: now,
			end_date: now + Duration::days(i64::from(duration_days)),
		}
	}

	pub fn completed_count(&self) -> usize {
		self.activities
			.iter()
			.filter(|activity| activity.status == ActivityStatus::Completed)
			.count()
	}

	pub fn progress_percentage(&self) -> f64 {
		let total = self.activities.len();

		if total == 0 {
			return 0.0;
		}

		self.completed_count() as f64 / total as f64 * 100.0
	}

	pub fn status(&self) -> ActivityStatus {
		let completed = self.completed_count();

		if completed == 0 {
			ActivityStatus::NotStarted
		} else if completed == self.activities.len() {
			ActivityStatus::Completed
		} else {
			ActivityStatus::InProgress
		}
	}

	pub fn progress(&self) -> PlanProgress {
		PlanProgress { progress_percentage: self.progress_percentage(), status: self.status() }
	}

	/// Moves one activity to `status`. Backward moves are accepted; callers own that policy.
	pub fn update_activity(
		&mut self,
		activity_id: &str,
		status: ActivityStatus,
		now: OffsetDateTime,
	) -> Result<PlanProgress> {
		let activity = self
			.activities
			.iter_mut()
			.find(|activity| activity.id == activity_id)
			.ok_or_else(|| Error::ActivityNotFound { activity_id: activity_id.to_string() })?;

		activity.status = status;
		activity.completed_at = match status {
			ActivityStatus::Completed => Some(now),
			_ => None,
		};
		self.updated_at = now;

		Ok(self.progress())
	}

	/// Serialized plan with the derived status and progress attached.
	pub fn snapshot(&self) -> Value {
		let mut value = serde_json::to_value(self).unwrap_or(Value::Null);

		if let Some(object) = value.as_object_mut() {
			object.insert("status".to_string(), Value::from(self.status().as_str()));
			object.insert("progress_percentage".to_string(), Value::from(self.progress_percentage()));
		}

		value
	}
}
