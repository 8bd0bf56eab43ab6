use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use pathwise_config::{LlmProviderConfig, Plan};
use pathwise_domain::{
	ContentItem, ContentType, LearningPath, PathActivity, PathDay, PathWeek, StudentProfile,
	path::DAYS_PER_WEEK,
};

use crate::{
	GenerationProvider, PlanParseError, Result,
	synthesizer::{self, positive_u32, reference_id, text_value},
};

/// Candidates offered to the generator for one path.
pub const MAX_PATH_CANDIDATES: usize = 15;

const PATH_SYSTEM_PROMPT: &str = "You are an educational planning assistant that designs multi-week learning paths. \
Output must be valid JSON only and must match the provided schema exactly. \
Give every week a theme, a goal, the skills it builds and how it is assessed. \
Schedule activities on school days only. \
Only reference content ids from the provided resources, or use null when an activity needs no resource.";

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedPath {
	#[serde(default)]
	pub title: Option<Value>,
	#[serde(default)]
	pub description: Option<Value>,
	#[serde(default)]
	pub overall_goal: Option<Value>,
	pub weeks: Vec<GeneratedWeek>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedWeek {
	#[serde(default)]
	pub theme: Option<Value>,
	#[serde(default)]
	pub goal: Option<Value>,
	#[serde(default)]
	pub days: Option<Vec<GeneratedDay>>,
	#[serde(default)]
	pub skills: Option<Value>,
	#[serde(default)]
	pub assessment: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedDay {
	#[serde(default)]
	pub day_number: Option<Value>,
	#[serde(default)]
	pub activities: Option<Vec<GeneratedPathActivity>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedPathActivity {
	#[serde(default)]
	pub title: Option<Value>,
	#[serde(default)]
	pub description: Option<Value>,
	#[serde(default)]
	pub content_id: Option<Value>,
	#[serde(default, rename = "type")]
	pub content_type: Option<Value>,
	#[serde(default)]
	pub duration_minutes: Option<Value>,
}

pub fn parse_generated_path(raw: Value) -> Result<GeneratedPath, PlanParseError> {
	let Some(object) = raw.as_object() else {
		return Err(PlanParseError::NotAnObject);
	};

	if !object.get("weeks").is_some_and(Value::is_array) {
		return Err(PlanParseError::MissingWeeks);
	}

	Ok(serde_json::from_value(raw)?)
}

/// Turns retrieved candidates into a week-by-week learning path.
pub struct PathSynthesizer<'a> {
	llm: &'a LlmProviderConfig,
	plan: &'a Plan,
	provider: &'a dyn GenerationProvider,
}
impl<'a> PathSynthesizer<'a> {
	pub fn new(llm: &'a LlmProviderConfig, plan: &'a Plan, provider: &'a dyn GenerationProvider) -> Self {
		Self { llm, plan, provider }
	}

	/// Never fails: generator errors and malformed output yield the default path for `subject`.
	pub async fn synthesize(
		&self,
		profile: &StudentProfile,
		subject: &str,
		candidates: &[ContentItem],
		weeks: u32,
	) -> LearningPath {
		let now = OffsetDateTime::now_utc();
		let candidates = &candidates[..candidates.len().min(MAX_PATH_CANDIDATES)];

		match self.try_synthesize(profile, subject, candidates, weeks, now).await {
			Ok(path) => path,
			Err(err) => {
				tracing::error!(
					student_id = %profile.id,
					subject,
					error = %err,
					"Path generation failed. Returning the default path."
				);

				LearningPath::new(profile.id.as_str(), subject, now)
			},
		}
	}

	async fn try_synthesize(
		&self,
		profile: &StudentProfile,
		subject: &str,
		candidates: &[ContentItem],
		weeks: u32,
		now: OffsetDateTime,
	) -> Result<LearningPath> {
		let messages = build_path_messages(profile, subject, candidates, weeks);
		let raw = self.provider.generate(self.llm, &messages).await?;
		let generated = parse_generated_path(raw)?;

		Ok(assemble_path(profile, subject, candidates, generated, weeks, now, self.plan))
	}
}

pub fn build_path_messages(
	profile: &StudentProfile,
	subject: &str,
	candidates: &[ContentItem],
	weeks: u32,
) -> Vec<Value> {
	let schema = serde_json::json!({
		"title": "string",
		"description": "string",
		"overall_goal": "string",
		"weeks": [
			{
				"week_number": "number",
				"theme": "string",
				"goal": "string",
				"days": [
					{
						"day_number": "number",
						"activities": [
							{
								"title": "string",
								"description": "string",
								"content_id": "string|null",
								"type": "string",
								"duration_minutes": "number"
							}
						]
					}
				],
				"skills": ["string"],
				"assessment": "string"
			}
		]
	});
	let resources = candidates.iter().map(synthesizer::candidate_value).collect::<Vec<_>>();
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema}\nSubject: {subject}\nPath length: {weeks} weeks of {DAYS_PER_WEEK} school days\nStudent profile as JSON:\n{}\nAvailable resources as JSON:\n{}",
		synthesizer::student_value(profile),
		Value::Array(resources)
	);

	vec![
		serde_json::json!({ "role": "system", "content": PATH_SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Validates generated output against the candidates.
///
/// Weeks past `weeks` and days past the school week are dropped, and weeks are renumbered by
/// position. Content ids outside the candidate set are nulled.
pub fn assemble_path(
	profile: &StudentProfile,
	subject: &str,
	candidates: &[ContentItem],
	generated: GeneratedPath,
	weeks: u32,
	now: OffsetDateTime,
	plan_cfg: &Plan,
) -> LearningPath {
	let mut path = LearningPath::new(profile.id.as_str(), subject, now);
	let by_id: HashMap<&str, &ContentItem> =
		candidates.iter().map(|item| (item.id.as_str(), item)).collect();

	if let Some(title) = generated.title.as_ref().and_then(text_value) {
		path.title = title;
	}
	if let Some(description) = generated.description.as_ref().and_then(text_value) {
		path.description = description;
	}
	if let Some(goal) = generated.overall_goal.as_ref().and_then(text_value) {
		path.overall_goal = goal;
	}

	path.weeks = (1..=weeks)
		.zip(generated.weeks)
		.map(|(week_number, week)| build_week(week_number, week, &by_id, plan_cfg))
		.collect();

	path
}

fn build_week(
	week_number: u32,
	generated: GeneratedWeek,
	by_id: &HashMap<&str, &ContentItem>,
	plan_cfg: &Plan,
) -> PathWeek {
	let mut days: Vec<PathDay> = (1..=DAYS_PER_WEEK)
		.zip(generated.days.unwrap_or_default())
		.map(|(position, day)| {
			let day_number = day
				.day_number
				.as_ref()
				.and_then(positive_u32)
				.filter(|number| *number <= DAYS_PER_WEEK)
				.unwrap_or(position);
			let activities = day
				.activities
				.unwrap_or_default()
				.into_iter()
				.zip(1_u32..)
				.map(|(activity, position)| build_activity(activity, position, by_id, plan_cfg))
				.collect();

			PathDay { day_number, activities }
		})
		.collect();

	days.sort_by_key(|day| day.day_number);

	let skills = match &generated.skills {
		Some(Value::Array(skills)) => skills.iter().filter_map(text_value).collect(),
		_ => Vec::new(),
	};

	PathWeek {
		week_number,
		theme: generated
			.theme
			.as_ref()
			.and_then(text_value)
			.unwrap_or_else(|| format!("Week {week_number}")),
		goal: generated.goal.as_ref().and_then(text_value).unwrap_or_default(),
		days,
		skills,
		assessment: generated.assessment.as_ref().and_then(text_value).unwrap_or_default(),
	}
}

fn build_activity(
	generated: GeneratedPathActivity,
	position: u32,
	by_id: &HashMap<&str, &ContentItem>,
	plan_cfg: &Plan,
) -> PathActivity {
	let item = generated.content_id.as_ref().and_then(reference_id).and_then(|content_id| {
		let item = by_id.get(content_id.as_str()).copied();

		if item.is_none() {
			tracing::debug!(content_id = %content_id, "Dropped dangling content reference.");
		}

		item
	});
	let duration = generated
		.duration_minutes
		.as_ref()
		.and_then(positive_u32)
		.or_else(|| item.and_then(|item| item.duration_minutes).filter(|minutes| *minutes > 0))
		.unwrap_or(plan_cfg.default_activity_minutes);

	PathActivity {
		title: generated
			.title
			.as_ref()
			.and_then(text_value)
			.unwrap_or_else(|| format!("Activity {position}")),
		description: generated.description.as_ref().and_then(text_value).unwrap_or_default(),
		content_id: item.map(|item| item.id.clone()),
		content_type: generated
			.content_type
			.as_ref()
			.and_then(content_type)
			.or_else(|| item.map(|item| item.content_type)),
		duration_minutes: duration,
	}
}

fn content_type(value: &Value) -> Option<ContentType> {
	let raw = text_value(value)?.to_lowercase();

	serde_json::from_value(Value::String(raw)).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_output_without_weeks() {
		assert!(matches!(
			parse_generated_path(serde_json::json!({ "title": "Path" })),
			Err(PlanParseError::MissingWeeks)
		));
		assert!(matches!(
			parse_generated_path(serde_json::json!([])),
			Err(PlanParseError::NotAnObject)
		));
	}

	#[test]
	fn activity_types_are_read_leniently() {
		assert_eq!(content_type(&serde_json::json!("Quiz")), Some(ContentType::Quiz));
		assert_eq!(content_type(&serde_json::json!("podcast")), None);
		assert_eq!(content_type(&serde_json::json!(null)), None);
	}

	#[test]
	fn prompt_states_path_length() {
		let messages = build_path_messages(&StudentProfile::new("s-1"), "History", &[], 3);
		let user = messages[1]["content"].as_str().expect("user prompt");

		assert!(user.contains("Subject: History"));
		assert!(user.contains("Path length: 3 weeks of 5 school days"));
	}
}
