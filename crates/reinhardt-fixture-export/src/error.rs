//! Error types for fixture export.
//!
//! Only a handful of conditions abort an export. Everything else is reported
//! through [`WarningLog`](crate::warning::WarningLog) alongside the snapshot.

use thiserror::Error;

use crate::object::Identity;

/// Errors that can occur while exporting a fixture.
#[derive(Debug, Error)]
pub enum ExportError {
	/// An object offered to the exporter has no durable identity.
	#[error("Object must be persisted before it can be exported: {type_key}.{identity}")]
	NotPersisted {
		/// Type of the offending object.
		type_key: String,
		/// Identity the object claimed to have.
		identity: Identity,
	},

	/// A reverse relationship has no matching forward relationship on the far side.
	#[error("Schema error: {type_key}::{relationship}: {message}")]
	SchemaError {
		/// Type declaring the relationship.
		type_key: String,
		/// Relationship name.
		relationship: String,
		/// Explanation of what is missing.
		message: String,
	},

	/// Error serializing a snapshot.
	#[error("Serialization error: {0}")]
	SerializationError(String),

	/// Export settings could not be read or parsed.
	#[error("Settings error: {0}")]
	SettingsError(String),

	/// Requested output format is not compiled in.
	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// Internal bookkeeping was found in an impossible state.
	#[error("Invariant violation: {0}")]
	InvariantViolation(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// JSON serialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML serialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),
}

impl ExportError {
	/// Builds a [`ExportError::SchemaError`].
	pub fn schema(
		type_key: impl Into<String>,
		relationship: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self::SchemaError {
			type_key: type_key.into(),
			relationship: relationship.into(),
			message: message.into(),
		}
	}

	/// Returns true for errors that abort a traversal.
	pub fn is_fatal_traversal_error(&self) -> bool {
		matches!(self, Self::NotPersisted { .. } | Self::SchemaError { .. })
	}
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
