//! Error type shared by the model, persistence and import/export paths.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong outside the layout loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A save was attempted with a blank title.
	#[error("Please enter a title for your configuration")]
	EmptyTitle,

	/// Imported or stored text is not a valid configuration.
	#[error("Invalid configuration file: {0}")]
	InvalidConfig(#[source] serde_json::Error),

	/// A configuration could not be turned into JSON.
	#[error("Could not serialize configuration: {0}")]
	Serialize(#[source] serde_json::Error),

	/// Browser storage is missing or refused the write.
	#[error("Storage unavailable: {0}")]
	Storage(String),

	/// No saved configuration carries the requested id.
	#[error("No saved configuration with id {0}")]
	NotFound(String),
}
