use std::collections::BTreeSet;

use serde_json::Value;

use crate::content::{ContentItem, DifficultyLevel};

#[derive(Clone, Debug, PartialEq)]
pub enum FilterClause {
	SubjectEq(String),
	/// Matches when any of the item's grades is in the set.
	GradeAny(BTreeSet<i32>),
	DifficultyIn(BTreeSet<DifficultyLevel>),
}
impl FilterClause {
	pub fn matches(&self, item: &ContentItem) -> bool {
		match self {
			Self::SubjectEq(subject) => item.subject == *subject,
			Self::GradeAny(grades) => item.grade_level.iter().any(|grade| grades.contains(grade)),
			Self::DifficultyIn(levels) => levels.contains(&item.difficulty_level),
		}
	}

	pub fn to_value(&self) -> Value {
		match self {
			Self::SubjectEq(subject) => serde_json::json!({ "subject": { "eq": subject } }),
			Self::GradeAny(grades) => serde_json::json!({ "grade_level": { "any_in": grades } }),
			Self::DifficultyIn(levels) => serde_json::json!({
				"difficulty_level": {
					"in": levels.iter().map(|level| level.as_str()).collect::<Vec<_>>()
				}
			}),
		}
	}
}

/// A conjunction of metadata clauses. An empty predicate matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterPredicate {
	clauses: Vec<FilterClause>,
}
impl FilterPredicate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn and(mut self, clause: FilterClause) -> Self {
		self.clauses.push(clause);

		self
	}

	pub fn clauses(&self) -> &[FilterClause] {
		&self.clauses
	}

	pub fn is_empty(&self) -> bool {
		self.clauses.is_empty()
	}

	pub fn matches(&self, item: &ContentItem) -> bool {
		self.clauses.iter().all(|clause| clause.matches(item))
	}

	pub fn subject(&self) -> Option<&str> {
		self.clauses.iter().find_map(|clause| match clause {
			FilterClause::SubjectEq(subject) => Some(subject.as_str()),
			_ => None,
		})
	}

	pub fn grades(&self) -> Option<&BTreeSet<i32>> {
		self.clauses.iter().find_map(|clause| match clause {
			FilterClause::GradeAny(grades) => Some(grades),
			_ => None,
		})
	}

	pub fn difficulties(&self) -> Option<&BTreeSet<DifficultyLevel>> {
		self.clauses.iter().find_map(|clause| match clause {
			FilterClause::DifficultyIn(levels) => Some(levels),
			_ => None,
		})
	}

	pub fn to_value(&self) -> Value {
		serde_json::json!({
			"all": self.clauses.iter().map(FilterClause::to_value).collect::<Vec<_>>(),
		})
	}
}
