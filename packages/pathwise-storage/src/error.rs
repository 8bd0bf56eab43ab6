#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid catalog: {0}")]
	Catalog(String),
	#[error("Content source error: {0}")]
	ContentSource(String),
	#[error("Vector index unavailable: {0}")]
	IndexUnavailable(String),
}
