use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ActivityStatus, ContentItem, DifficultyLevel, LearningActivity, LearningPlan};

const DEFAULT_QUIZ_SCORE: f64 = 0.7;
const DEFAULT_WRITING_QUALITY: f64 = 70.0;
const EASIER_QUIZ_BELOW: f64 = 0.6;
const EASIER_WRITING_BELOW: f64 = 60.0;
const CHALLENGE_QUIZ_ABOVE: f64 = 0.85;
const CHALLENGE_WRITING_ABOVE: f64 = 80.0;
/// Challenge activities appended per adaptation.
pub const MAX_CHALLENGES: usize = 2;
pub const CHALLENGE_MINUTES: u32 = 30;

/// Assessment results a plan is adapted against.
///
/// `avg_quiz_score` is a 0-1 fraction and `writing_quality` a 0-100 score. A missing value
/// reads as the neutral default for its scale.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PerformanceMetrics {
	#[serde(default)]
	pub avg_quiz_score: Option<f64>,
	#[serde(default)]
	pub writing_quality: Option<f64>,
	#[serde(default)]
	pub areas_for_improvement: Vec<String>,
}
impl PerformanceMetrics {
	pub fn is_empty(&self) -> bool {
		self.avg_quiz_score.is_none()
			&& self.writing_quality.is_none()
			&& self.areas_for_improvement.is_empty()
	}

	/// Easier content for either weak score, a challenge only when both scores are strong.
	pub fn adjustment(&self) -> Option<Adjustment> {
		let quiz = self.avg_quiz_score.filter(|score| score.is_finite()).unwrap_or(DEFAULT_QUIZ_SCORE);
		let writing = self
			.writing_quality
			.filter(|score| score.is_finite())
			.unwrap_or(DEFAULT_WRITING_QUALITY);

		if quiz < EASIER_QUIZ_BELOW || writing < EASIER_WRITING_BELOW {
			Some(Adjustment::Easier)
		} else if quiz > CHALLENGE_QUIZ_ABOVE && writing > CHALLENGE_WRITING_ABOVE {
			Some(Adjustment::Challenge)
		} else {
			None
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
	Easier,
	Challenge,
}
impl Adjustment {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Easier => "easier",
			Self::Challenge => "challenge",
		}
	}

	/// Difficulty of the content this adjustment draws on.
	pub fn difficulty(self) -> DifficultyLevel {
		match self {
			Self::Easier => DifficultyLevel::Beginner,
			Self::Challenge => DifficultyLevel::Advanced,
		}
	}
}

/// Outcome of one adaptation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Adaptation {
	pub adjustment: Option<Adjustment>,
	/// Ids of the activities that were replaced or appended.
	pub changed: Vec<String>,
}
impl Adaptation {
	pub fn is_unchanged(&self) -> bool {
		self.changed.is_empty()
	}
}

/// Adjustment due for `plan`. Plans with no completed activity are never adjusted.
pub fn adjustment_for(plan: &LearningPlan, metrics: &PerformanceMetrics) -> Option<Adjustment> {
	if plan.completed_count() == 0 || metrics.is_empty() {
		return None;
	}

	metrics.adjustment()
}

/// Applies `adjustment` to `plan` using `candidates`, which must already be vetted for the
/// student. Only candidates at the adjustment's difficulty are used.
///
/// Easier: not-started activities are replaced, in plan order, by beginner items, one item
/// per activity. Order and duration carry over. Challenge: up to [`MAX_CHALLENGES`] advanced
/// items are appended after the last order.
pub fn apply_adjustment(
	plan: &mut LearningPlan,
	adjustment: Adjustment,
	candidates: &[ContentItem],
	now: OffsetDateTime,
) -> Vec<String> {
	let mut matching =
		candidates.iter().filter(|item| item.difficulty_level == adjustment.difficulty()).peekable();

	if matching.peek().is_none() {
		return Vec::new();
	}

	let mut changed = Vec::new();

	match adjustment {
		Adjustment::Easier => {
			let pending = plan
				.activities
				.iter_mut()
				.filter(|activity| activity.status == ActivityStatus::NotStarted);

			for activity in pending {
				let Some(item) = matching.next() else {
					break;
				};
				let mut easier = content_activity(
					item,
					format!("[EASIER] {}", item.title),
					format!(
						"This activity has been adjusted to help you build foundational skills: {}",
						item.description
					),
					activity.order,
				);

				easier.duration_minutes = activity.duration_minutes;
				easier.day = activity.day;

				changed.push(easier.id.clone());

				*activity = easier;
			}
		},
		Adjustment::Challenge => {
			let last_order = plan.activities.iter().map(|activity| activity.order).max().unwrap_or(0);

			for (offset, item) in (1..).zip(matching.take(MAX_CHALLENGES)) {
				let mut challenge = content_activity(
					item,
					format!("[CHALLENGE] {}", item.title),
					format!("This advanced activity will challenge your skills: {}", item.description),
					last_order.saturating_add(offset),
				);

				challenge.duration_minutes = CHALLENGE_MINUTES;

				changed.push(challenge.id.clone());
				plan.activities.push(challenge);
			}
		},
	}

	if !changed.is_empty() {
		plan.updated_at = now;
	}

	changed
}

fn content_activity(item: &ContentItem, title: String, description: String, order: u32) -> LearningActivity {
	let mut activity = LearningActivity::new(title, description, order);

	activity.content_id = Some(item.id.clone());
	activity.content_url = Some(item.url.clone());

	activity
}
