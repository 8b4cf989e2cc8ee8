//! Error types shared by every entity module.
//!
//! Absence is never an error here: lookups return `Ok(None)` and deletes
//! return `Ok(false)`. `Error::Create` is the refused-creation signal, and
//! anything else the store reports passes through as `Error::Database`.

use thiserror::Error;
use tracing::warn;

/// Why a record could not be created.
#[derive(Debug, Error)]
pub enum CreateError {
	/// The store refused the row (duplicate unique key, dangling reference,
	/// failed check).
	#[error("constraint violated: {0}")]
	Constraint(String),
	/// A value does not fit its column.
	#[error("`{field}` is longer than {max} characters")]
	Data { field: String, max: usize },
	/// A value is missing or malformed.
	#[error("invalid `{field}`: {reason}")]
	Validation { field: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("creation failed: {0}")]
	Create(#[from] CreateError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl Error {
	/// True for every flavour of refused creation.
	pub fn is_creation_failure(&self) -> bool {
		matches!(self, Error::Create(_))
	}

	pub fn as_create(&self) -> Option<&CreateError> {
		match self {
			Error::Create(err) => Some(err),
			Error::Database(_) => None,
		}
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Sorts an insert failure into a refused creation or a plain store error.
pub(crate) fn on_insert(entity: &'static str, err: sqlx::Error) -> Error {
	let refused = err.as_database_error().is_some_and(|db| {
		db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation()
	});
	if !refused {
		return Error::Database(err);
	}
	let message = err
		.as_database_error()
		.map(|db| db.message().to_string())
		.unwrap_or_default();
	warn!(entity, %message, "store refused insert");
	Error::Create(CreateError::Constraint(message))
}

/// Logs a refused creation before handing it back.
pub(crate) fn refused(entity: &'static str, err: CreateError) -> Error {
	warn!(entity, error = %err, "create rejected");
	Error::Create(err)
}
