use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use pathwise_config::{LlmProviderConfig, Plan};
use pathwise_domain::{ContentItem, LearningActivity, LearningPlan, StudentProfile};

use crate::{GenerationProvider, PlanParseError, Result};

const SYSTEM_PROMPT: &str = "You are an educational planning assistant that builds personalized learning plans. \
Output must be valid JSON only and must match the provided schema exactly. \
Build a coherent sequence that starts with foundational material and progresses to harder material. \
Only reference content ids from the provided resources, or use null when an activity needs no resource. \
Prefer each resource's own duration_minutes. \
Explain for every activity how it helps this student.";

/// Plan as returned by the generator, before validation.
///
/// Text fields are kept as raw values so a `null` or a stray number drops that one field
/// instead of the whole plan.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratedPlan {
	#[serde(default)]
	pub title: Option<Value>,
	#[serde(default)]
	pub description: Option<Value>,
	#[serde(default)]
	pub topics: Option<Value>,
	pub activities: Vec<GeneratedActivity>,
}

/// Loosely typed: models return ids and minutes as strings or numbers.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratedActivity {
	#[serde(default)]
	pub title: Option<Value>,
	#[serde(default)]
	pub description: Option<Value>,
	#[serde(default)]
	pub content_id: Option<Value>,
	#[serde(default)]
	pub content_url: Option<Value>,
	#[serde(default)]
	pub duration_minutes: Option<Value>,
	#[serde(default)]
	pub order: Option<Value>,
	#[serde(default)]
	pub day: Option<Value>,
	#[serde(default)]
	pub learning_benefit: Option<Value>,
}

pub fn parse_generated_plan(raw: Value) -> Result<GeneratedPlan, PlanParseError> {
	let Some(object) = raw.as_object() else {
		return Err(PlanParseError::NotAnObject);
	};

	if !object.get("activities").is_some_and(Value::is_array) {
		return Err(PlanParseError::MissingActivities);
	}

	Ok(serde_json::from_value(raw)?)
}

/// Turns retrieved candidates into an ordered learning plan through the generation backend.
pub struct PlanSynthesizer<'a> {
	llm: &'a LlmProviderConfig,
	plan: &'a Plan,
	provider: &'a dyn GenerationProvider,
}
impl<'a> PlanSynthesizer<'a> {
	pub fn new(llm: &'a LlmProviderConfig, plan: &'a Plan, provider: &'a dyn GenerationProvider) -> Self {
		Self { llm, plan, provider }
	}

	/// Never fails: generator errors and malformed output yield the default plan for `subject`.
	pub async fn synthesize(
		&self,
		profile: &StudentProfile,
		subject: &str,
		candidates: &[ContentItem],
	) -> LearningPlan {
		let now = OffsetDateTime::now_utc();

		match self.try_synthesize(profile, subject, candidates, now).await {
			Ok(plan) => plan,
			Err(err) => {
				tracing::error!(
					student_id = %profile.id,
					subject,
					error = %err,
					"Plan generation failed. Returning the default plan."
				);

				LearningPlan::new(profile.id.as_str(), subject, now, self.plan.duration_days)
			},
		}
	}

	async fn try_synthesize(
		&self,
		profile: &StudentProfile,
		subject: &str,
		candidates: &[ContentItem],
		now: OffsetDateTime,
	) -> Result<LearningPlan> {
		let messages = build_plan_messages(profile, subject, candidates, self.plan.duration_days);
		let raw = self.provider.generate(self.llm, &messages).await?;
		let generated = parse_generated_plan(raw)?;

		Ok(assemble_plan(profile, subject, candidates, generated, now, self.plan))
	}
}

pub fn build_plan_messages(
	profile: &StudentProfile,
	subject: &str,
	candidates: &[ContentItem],
	duration_days: u32,
) -> Vec<Value> {
	let schema = serde_json::json!({
		"title": "string",
		"description": "string",
		"topics": ["string"],
		"activities": [
			{
				"title": "string",
				"description": "string",
				"content_id": "string|null",
				"content_url": "string|null",
				"duration_minutes": "number",
				"order": "number",
				"learning_benefit": "string"
			}
		]
	});
	let student = student_value(profile);
	let resources = candidates.iter().map(candidate_value).collect::<Vec<_>>();
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema}\nSubject: {subject}\nPlan duration: {duration_days} days\nWhen set, day must be between 1 and {duration_days}.\nStudent profile as JSON:\n{student}\nAvailable resources as JSON:\n{}",
		Value::Array(resources)
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Validates generated output against the candidates and fills in what the generator left out.
///
/// Content ids outside the candidate set are nulled along with their url. Activity status is
/// never taken from the generator.
pub fn assemble_plan(
	profile: &StudentProfile,
	subject: &str,
	candidates: &[ContentItem],
	generated: GeneratedPlan,
	now: OffsetDateTime,
	plan_cfg: &Plan,
) -> LearningPlan {
	let mut plan = LearningPlan::new(profile.id.as_str(), subject, now, plan_cfg.duration_days);
	let by_id: HashMap<&str, &ContentItem> =
		candidates.iter().map(|item| (item.id.as_str(), item)).collect();

	if let Some(title) = generated.title.as_ref().and_then(text_value) {
		plan.title = title;
	}
	if let Some(description) = generated.description.as_ref().and_then(text_value) {
		plan.description = description;
	}

	let topics: Vec<String> = match &generated.topics {
		Some(Value::Array(topics)) => topics.iter().filter_map(text_value).collect(),
		_ => Vec::new(),
	};

	if !topics.is_empty() {
		plan.topics = topics;
	}

	plan.activities = generated
		.activities
		.into_iter()
		.enumerate()
		.map(|(index, activity)| {
			build_activity(activity, index + 1, subject, &by_id, plan_cfg)
		})
		.collect();

	plan
}

fn build_activity(
	generated: GeneratedActivity,
	position: usize,
	subject: &str,
	by_id: &HashMap<&str, &ContentItem>,
	plan_cfg: &Plan,
) -> LearningActivity {
	let position = u32::try_from(position).unwrap_or(u32::MAX);
	let order = generated.order.as_ref().and_then(positive_u32).unwrap_or(position);
	let title = generated
		.title
		.as_ref()
		.and_then(text_value)
		.unwrap_or_else(|| format!("Activity {position}"));
	let description = generated.description.as_ref().and_then(text_value).unwrap_or_default();
	let mut activity = LearningActivity::new(title, description, order);
	let mut duration = generated.duration_minutes.as_ref().and_then(positive_u32);

	activity.content_url = generated.content_url.as_ref().and_then(text_value);
	activity.day = generated
		.day
		.as_ref()
		.and_then(positive_u32)
		.filter(|day| *day <= plan_cfg.duration_days);

	if let Some(content_id) = generated.content_id.as_ref().and_then(reference_id) {
		match by_id.get(content_id.as_str()) {
			Some(item) => {
				if activity.content_url.is_none() {
					activity.content_url = Some(item.url.clone());
				}
				if duration.is_none() {
					duration = item.duration_minutes.filter(|minutes| *minutes > 0);
				}

				activity.content_id = Some(content_id);
			},
			None => {
				tracing::debug!(content_id = %content_id, "Dropped dangling content reference.");

				activity.content_url = None;
			},
		}
	}

	activity.duration_minutes = duration.unwrap_or(plan_cfg.default_activity_minutes);
	activity.learning_benefit = generated.learning_benefit.as_ref().and_then(text_value).or_else(|| {
		Some(format!(
			"This activity helps build skills in {subject} and supports the student's learning journey."
		))
	});

	activity
}

pub(crate) fn student_value(profile: &StudentProfile) -> Value {
	serde_json::json!({
		"name": profile.display_name(),
		"grade_level": profile.grade_label(),
		"learning_style": profile.learning_style.as_str(),
		"subjects_of_interest": profile.interests_label(),
		"areas_for_improvement": if profile.areas_for_improvement.is_empty() {
			"Not specified".to_string()
		} else {
			profile.areas_for_improvement.join(", ")
		},
	})
}

pub(crate) fn candidate_value(item: &ContentItem) -> Value {
	serde_json::json!({
		"id": item.id,
		"title": item.title,
		"content_type": item.content_type.as_str(),
		"difficulty_level": item.difficulty_level.as_str(),
		"subject": item.subject,
		"grade_level": item.grade_level,
		"keywords": item.keywords,
		"duration_minutes": item.duration_minutes,
		"description": item.description,
		"url": item.url,
	})
}

pub(crate) fn reference_id(value: &Value) -> Option<String> {
	match value {
		Value::String(raw) => non_blank(Some(raw.clone())),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

pub(crate) fn positive_u32(value: &Value) -> Option<u32> {
	let number = match value {
		Value::Number(number) => number.as_f64()?,
		Value::String(raw) => raw.trim().parse::<f64>().ok()?,
		_ => return None,
	};

	if !number.is_finite() || number < 1.0 || number > f64::from(u32::MAX) {
		return None;
	}

	Some(number.round() as u32)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Non-blank string content. Anything else, `null` included, reads as absent.
pub(crate) fn text_value(value: &Value) -> Option<String> {
	match value {
		Value::String(raw) => non_blank(Some(raw.clone())),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_output_without_activities() {
		let err = parse_generated_plan(serde_json::json!({ "title": "Plan" }))
			.expect_err("Expected parse error.");

		assert!(matches!(err, PlanParseError::MissingActivities));
		assert!(matches!(
			parse_generated_plan(serde_json::json!("plan")),
			Err(PlanParseError::NotAnObject)
		));
	}

	#[test]
	fn numeric_content_ids_compare_as_strings() {
		assert_eq!(reference_id(&serde_json::json!(42)), Some("42".to_string()));
		assert_eq!(reference_id(&serde_json::json!("  ")), None);
		assert_eq!(reference_id(&serde_json::json!(null)), None);
	}

	#[test]
	fn durations_and_orders_must_be_positive() {
		assert_eq!(positive_u32(&serde_json::json!(25)), Some(25));
		assert_eq!(positive_u32(&serde_json::json!("30")), Some(30));
		assert_eq!(positive_u32(&serde_json::json!(0)), None);
		assert_eq!(positive_u32(&serde_json::json!(-3)), None);
		assert_eq!(positive_u32(&serde_json::json!("soon")), None);
	}

	#[test]
	fn null_and_non_string_text_fields_are_dropped() {
		let generated = parse_generated_plan(serde_json::json!({
			"title": null,
			"topics": ["Fractions", null, 7, "  "],
			"activities": [
				{ "title": null, "description": null, "content_url": 12, "learning_benefit": false }
			]
		}))
		.expect("parse failed");
		let plan_cfg = Plan { duration_days: 14, default_activity_minutes: 20, path_weeks: 4 };
		let plan = assemble_plan(
			&StudentProfile::new("s-1"),
			"Mathematics",
			&[],
			generated,
			OffsetDateTime::UNIX_EPOCH,
			&plan_cfg,
		);
		let activity = &plan.activities[0];

		assert_eq!(plan.title, "Mathematics Learning Plan");
		assert_eq!(plan.topics, vec!["Fractions".to_string()]);
		assert_eq!(activity.title, "Activity 1");
		assert_eq!(activity.description, "");
		assert_eq!(activity.content_url, None);
		assert!(activity.learning_benefit.as_deref().is_some_and(|b| b.contains("Mathematics")));
	}

	#[test]
	fn days_outside_the_plan_are_dropped() {
		let generated = parse_generated_plan(serde_json::json!({
			"activities": [
				{ "title": "Warm up", "day": 1 },
				{ "title": "Review", "day": "14" },
				{ "title": "Late", "day": 15 },
				{ "title": "Early", "day": 0 }
			]
		}))
		.expect("parse failed");
		let plan_cfg = Plan { duration_days: 14, default_activity_minutes: 20, path_weeks: 4 };
		let plan = assemble_plan(
			&StudentProfile::new("s-1"),
			"Mathematics",
			&[],
			generated,
			OffsetDateTime::UNIX_EPOCH,
			&plan_cfg,
		);
		let days = plan.activities.iter().map(|activity| activity.day).collect::<Vec<_>>();

		assert_eq!(days, vec![Some(1), Some(14), None, None]);
	}

	#[test]
	fn prompt_carries_candidates_and_profile() {
		let profile = StudentProfile::new("s-1").with_grade(8);
		let messages = build_plan_messages(&profile, "Science", &[], 14);
		let user = messages[1]["content"].as_str().expect("user prompt");

		assert_eq!(messages.len(), 2);
		assert!(user.contains("Subject: Science"));
		assert!(user.contains("Plan duration: 14 days"));
		assert!(user.contains("\"grade_level\":\"8\""));
	}
}
