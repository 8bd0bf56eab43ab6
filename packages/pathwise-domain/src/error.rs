pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Activity not found: {activity_id}")]
	ActivityNotFound { activity_id: String },
	#[error("Invalid content record: {message}")]
	InvalidContent { message: String },
}
