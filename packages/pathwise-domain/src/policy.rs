use std::collections::BTreeSet;

use crate::content::DifficultyLevel;

const ELEMENTARY_MAX_GRADE: i32 = 6;
const MIDDLE_MAX_GRADE: i32 = 9;

/// Difficulty levels a student of the given grade may be served.
///
/// Grades up to 6 get beginner and intermediate material, 7 through 9 intermediate only, and 10
/// and above intermediate and advanced. An unknown grade is unconstrained.
pub fn allowed_difficulties(grade_level: Option<i32>) -> BTreeSet<DifficultyLevel> {
	use DifficultyLevel::{Advanced, Beginner, Intermediate};

	let levels: &[DifficultyLevel] = match grade_level {
		None => &DifficultyLevel::ALL,
		Some(grade) if grade <= ELEMENTARY_MAX_GRADE => &[Beginner, Intermediate],
		Some(grade) if grade <= MIDDLE_MAX_GRADE => &[Intermediate],
		Some(_) => &[Intermediate, Advanced],
	};

	levels.iter().copied().collect()
}

/// The symmetric grade window searched around a student's grade.
///
/// Out-of-range neighbours are kept as is; they simply match nothing.
pub fn grade_window(grade_level: i32) -> BTreeSet<i32> {
	[grade_level - 1, grade_level, grade_level + 1].into_iter().collect()
}
