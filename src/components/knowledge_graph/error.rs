/// Failures of the glue around the layout engine. The engine itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	#[error("no browser window available")]
	NoWindow,
	#[error("canvas 2d context unavailable: {0}")]
	Canvas(String),
	#[error("invalid entry payload: {0}")]
	Payload(#[from] serde_json::Error),
	#[error("response has no `data.entries` field")]
	MissingEntries,
}

pub type Result<T> = std::result::Result<T, GraphError>;
