pub mod adaptation;
pub mod content;
pub mod fallback;
pub mod filter;
pub mod path;
pub mod plan;
pub mod policy;
pub mod profile;
pub mod similarity;

mod error;

pub use adaptation::{Adaptation, Adjustment, PerformanceMetrics};
pub use content::{ContentItem, ContentType, DifficultyLevel};
pub use error::{Error, Result};
pub use fallback::FallbackCatalog;
pub use filter::{FilterClause, FilterPredicate};
pub use path::{LearningPath, PathActivity, PathDay, PathWeek};
pub use plan::{ActivityStatus, LearningActivity, LearningPlan, PlanProgress};
pub use profile::{LearningStyle, StudentProfile};
