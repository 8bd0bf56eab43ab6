pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Embedding failure: {message}")]
	EmbeddingFailure { message: String },
	#[error("Vector index unavailable: {message}")]
	IndexUnavailable { message: String },
	#[error("Generation output malformed: {message}")]
	GenerationMalformed { message: String },
	#[error("Activity not found: {activity_id}")]
	ActivityNotFound { activity_id: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<pathwise_providers::Error> for Error {
	fn from(err: pathwise_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<pathwise_storage::Error> for Error {
	fn from(err: pathwise_storage::Error) -> Self {
		match err {
			pathwise_storage::Error::IndexUnavailable(message) => Self::IndexUnavailable { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<pathwise_domain::Error> for Error {
	fn from(err: pathwise_domain::Error) -> Self {
		match err {
			pathwise_domain::Error::ActivityNotFound { activity_id } =>
				Self::ActivityNotFound { activity_id },
			pathwise_domain::Error::InvalidContent { message } => Self::InvalidRequest { message },
		}
	}
}

impl From<PlanParseError> for Error {
	fn from(err: PlanParseError) -> Self {
		Self::GenerationMalformed { message: err.to_string() }
	}
}

/// Why generator output could not be read as a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanParseError {
	#[error("Generator output must be a JSON object.")]
	NotAnObject,
	#[error("Generator output is missing an activities array.")]
	MissingActivities,
	#[error("Generator output is missing a weeks array.")]
	MissingWeeks,
	#[error("Generator output has an unexpected shape: {0}")]
	Shape(#[from] serde_json::Error),
}
