use pathwise_domain::{
	FilterClause, FilterPredicate, StudentProfile,
	policy::{allowed_difficulties, grade_window},
};

/// Embedding input and metadata filter for one retrieval.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentQuery {
	pub text: String,
	pub filter: FilterPredicate,
}

/// Builds the semantic query and the conjunctive filter for `profile`.
///
/// A blank subject counts as no subject. An unknown grade adds neither the grade window nor
/// the difficulty band.
pub fn build_query(profile: &StudentProfile, subject: Option<&str>) -> ContentQuery {
	let subject = subject.map(str::trim).filter(|subject| !subject.is_empty());
	let mut text = format!(
		"Educational content for a student in grade {} with a {} learning style. Interested in {}.",
		profile.grade_label(),
		profile.learning_style.as_str(),
		profile.interests_label()
	);
	let mut filter = FilterPredicate::new();

	if let Some(subject) = subject {
		text.push_str(&format!(" Looking specifically for {subject} content."));

		filter = filter.and(FilterClause::SubjectEq(subject.to_string()));
	}
	if let Some(grade) = profile.grade_level {
		filter = filter
			.and(FilterClause::GradeAny(grade_window(grade)))
			.and(FilterClause::DifficultyIn(allowed_difficulties(Some(grade))));
	}

	ContentQuery { text, filter }
}

#[cfg(test)]
mod tests {
	use super::*;
	use pathwise_domain::LearningStyle;

	#[test]
	fn text_names_grade_style_interests_and_subject() {
		let profile = StudentProfile::new("s-1")
			.with_grade(5)
			.with_style(LearningStyle::Visual)
			.with_interests(["Science", "Art"]);
		let query = build_query(&profile, Some("Science"));

		assert_eq!(
			query.text,
			"Educational content for a student in grade 5 with a visual learning style. \
Interested in Science, Art. Looking specifically for Science content."
		);
	}

	#[test]
	fn unknown_grade_has_no_grade_or_difficulty_clause() {
		let query = build_query(&StudentProfile::new("s-2"), Some("History"));

		assert!(query.text.contains("grade unknown"));
		assert!(query.text.contains("Interested in general learning."));
		assert_eq!(query.filter.clauses(), &[FilterClause::SubjectEq("History".to_string())]);
	}

	#[test]
	fn blank_subject_is_ignored() {
		let query = build_query(&StudentProfile::new("s-3"), Some("  "));

		assert!(query.filter.is_empty());
		assert!(!query.text.contains("Looking specifically"));
	}
}
