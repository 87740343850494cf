pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	/// The request outlived its deadline or its caller went away.
	#[error("Request canceled.")]
	Canceled,
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index data error: {message}")]
	IndexData { message: String },
	/// The set algebra produced a result it can never produce. Indicates a bug, not bad data.
	#[error("Invariant violated: {message}")]
	InvariantViolation { message: String },
	#[error("Failed to encode response: {message}")]
	Encode { message: String },
}
impl Error {
	pub(crate) fn invariant(message: impl Into<String>) -> Self {
		let message = message.into();

		tracing::error!(%message, "Resolution invariant violated.");

		Self::InvariantViolation { message }
	}
}

impl From<ckit_storage::Error> for Error {
	fn from(err: ckit_storage::Error) -> Self {
		match err {
			ckit_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			ckit_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<ckit_index::Error> for Error {
	fn from(err: ckit_index::Error) -> Self {
		match err {
			ckit_index::Error::NotFound { id } =>
				Self::NotFound { message: format!("No index data for {id:?}.") },
			other => Self::IndexData { message: other.to_string() },
		}
	}
}

impl From<crate::fetch::FetchError> for Error {
	fn from(err: crate::fetch::FetchError) -> Self {
		Self::IndexData { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Encode { message: err.to_string() }
	}
}
