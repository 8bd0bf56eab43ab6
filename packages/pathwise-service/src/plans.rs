use time::OffsetDateTime;

use pathwise_config::MAX_PATH_WEEKS;
use pathwise_domain::{
	ActivityStatus, Adaptation, ContentItem, LearningPath, LearningPlan, PerformanceMetrics,
	PlanProgress, StudentProfile, adaptation,
};

use crate::{Error, PathwiseService, Result, path::MAX_PATH_CANDIDATES};

/// Candidates retrieved when adapting a plan.
pub const ADAPTATION_CANDIDATE_K: usize = 10;

impl PathwiseService {
	/// Retrieves content for `profile`. `k` defaults to `retrieval.default_k`.
	pub async fn recommend(
		&self,
		profile: &StudentProfile,
		subject: Option<&str>,
		k: Option<usize>,
	) -> Result<Vec<ContentItem>> {
		let k = k.unwrap_or(self.cfg.retrieval.default_k as usize);

		self.retriever().retrieve(profile, subject, k).await
	}

	/// Retrieves `retrieval.plan_candidate_k` candidates and synthesizes a plan from them.
	pub async fn create_plan(&self, profile: &StudentProfile, subject: &str) -> Result<LearningPlan> {
		let subject = required_subject(subject)?;
		let k = self.cfg.retrieval.plan_candidate_k as usize;
		let candidates = self.retriever().retrieve(profile, Some(subject), k).await?;

		tracing::info!(
			student_id = %profile.id,
			subject,
			candidates = candidates.len(),
			"Synthesizing learning plan."
		);

		Ok(self.synthesizer().synthesize(profile, subject, &candidates).await)
	}

	/// Multi-week path over up to 15 retrieved candidates. `weeks` defaults to `plan.path_weeks`.
	pub async fn create_learning_path(
		&self,
		profile: &StudentProfile,
		subject: &str,
		weeks: Option<u32>,
	) -> Result<LearningPath> {
		let subject = required_subject(subject)?;
		let weeks = weeks.unwrap_or(self.cfg.plan.path_weeks);

		if weeks == 0 || weeks > MAX_PATH_WEEKS {
			return Err(Error::InvalidRequest {
				message: format!("weeks must be between 1 and {MAX_PATH_WEEKS}."),
			});
		}

		let candidates =
			self.retriever().retrieve(profile, Some(subject), MAX_PATH_CANDIDATES).await?;

		tracing::info!(
			student_id = %profile.id,
			subject,
			weeks,
			candidates = candidates.len(),
			"Synthesizing learning path."
		);

		Ok(self.path_synthesizer().synthesize(profile, subject, &candidates, weeks).await)
	}

	/// Adjusts pending work in `plan` to the student's measured performance.
	///
	/// Replacement and challenge content comes only from a fresh retrieval for the plan's
	/// subject, so every new content id is a vetted candidate. Plans without completed
	/// activities, and metrics that call for no change, leave the plan untouched.
	pub async fn adapt_plan(
		&self,
		profile: &StudentProfile,
		plan: &mut LearningPlan,
		metrics: &PerformanceMetrics,
	) -> Result<Adaptation> {
		if profile.id != plan.student_id {
			return Err(Error::InvalidRequest {
				message: "plan does not belong to this student.".to_string(),
			});
		}

		let Some(adjustment) = adaptation::adjustment_for(plan, metrics) else {
			tracing::debug!(plan_id = %plan.id, "Plan needs no adaptation.");

			return Ok(Adaptation::default());
		};
		let candidates = self
			.retriever()
			.retrieve(profile, Some(plan.subject.as_str()), ADAPTATION_CANDIDATE_K)
			.await?;
		let changed =
			adaptation::apply_adjustment(plan, adjustment, &candidates, OffsetDateTime::now_utc());

		tracing::info!(
			plan_id = %plan.id,
			adjustment = adjustment.as_str(),
			changed = changed.len(),
			"Plan adapted to performance."
		);

		Ok(Adaptation { adjustment: Some(adjustment), changed })
	}

	pub fn update_activity(
		&self,
		plan: &mut LearningPlan,
		activity_id: &str,
		status: ActivityStatus,
	) -> Result<PlanProgress> {
		let progress = plan.update_activity(activity_id, status, OffsetDateTime::now_utc())?;

		tracing::info!(
			plan_id = %plan.id,
			activity_id,
			status = status.as_str(),
			progress = progress.progress_percentage,
			"Activity status updated."
		);

		Ok(progress)
	}
}

fn required_subject(subject: &str) -> Result<&str> {
	let subject = subject.trim();

	if subject.is_empty() {
		return Err(Error::InvalidRequest { message: "subject must be non-empty.".to_string() });
	}

	Ok(subject)
}
