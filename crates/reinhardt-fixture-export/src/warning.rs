//! Non-fatal export diagnostics.
//!
//! Anything the exporter skips or cannot place cleanly is reported here rather
//! than aborting. Warnings are kept as rendered text, in first-seen order and
//! without duplicates.

use indexmap::IndexSet;
use thiserror::Error;
use tracing::warn;

use crate::object::{Identity, ObjectRef};

/// One reason the snapshot may be incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportWarning {
	/// Many-to-many relationship without a join type.
	#[error(
		"many_many relationships without a \"through\" are not supported. No yml generated for relationship: {type_key}::{relationship}()"
	)]
	UnsupportedRelationship {
		/// Declaring type.
		type_key: String,
		/// Relationship name.
		relationship: String,
	},

	/// Object could not be loaded inside a locale scope.
	#[error(
		"DataObject Localisation could not be found for Class: {type_key} | ID: {identity} | Locale {locale}"
	)]
	LocalizationLookup {
		/// Type of the object being localized.
		type_key: String,
		/// Identity of the object being localized.
		identity: Identity,
		/// Locale code.
		locale: String,
	},

	/// Type ended up with no exportable records.
	#[error("Type {type_key} has no populated records and was left out of the fixture")]
	EmptyGroup {
		/// Type of the group.
		type_key: String,
	},

	/// Record carries no fields.
	#[error("Record {type_key}.{identity} has no fields and was left out of the fixture")]
	EmptyRecord {
		/// Type of the record.
		type_key: String,
		/// Identity of the record.
		identity: String,
	},

	/// Sorter could not place a type because of a dependency cycle.
	#[error("{0}")]
	Cycle(String),

	/// A looping relationship was removed before sorting.
	#[error(
		"Removed looping relationship {from} -> {to}; {removed} reference(s) to {to} dropped from {from}"
	)]
	CycleBroken {
		/// Referring type.
		from: String,
		/// Referenced type.
		to: String,
		/// Number of reference tokens scrubbed.
		removed: usize,
	},

	/// A relationship pointed at an object the store could not load.
	#[error("Unable to resolve {type_key}::{relationship} to {target}; relationship skipped")]
	UnresolvedRelation {
		/// Declaring type.
		type_key: String,
		/// Relationship name.
		relationship: String,
		/// Target that was looked up.
		target: String,
	},

	/// A relationship pointed at an object without durable storage.
	#[error("Related object {target} of {type_key}::{relationship} is not persisted; relationship skipped")]
	NotPersistedRelation {
		/// Declaring type.
		type_key: String,
		/// Relationship name.
		relationship: String,
		/// Target that was found.
		target: ObjectRef,
	},

	/// A depth limit of zero was configured.
	#[error("max_depth of 0 disables the depth limit; the whole reachable graph is exported")]
	UnlimitedDepth,
}

/// Ordered, deduplicated collection of warnings.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
	entries: IndexSet<String>,
}

impl WarningLog {
	/// Creates an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a warning. Returns false if the same text was already recorded.
	pub fn push(&mut self, warning: ExportWarning) -> bool {
		let text = warning.to_string();
		if self.entries.contains(&text) {
			return false;
		}
		warn!("{}", text);
		self.entries.insert(text)
	}

	/// Returns true if a warning with exactly this text was recorded.
	pub fn contains(&self, text: &str) -> bool {
		self.entries.contains(text)
	}

	/// Iterates over the warnings in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(String::as_str)
	}

	/// Returns the warnings as owned strings.
	pub fn to_vec(&self) -> Vec<String> {
		self.entries.iter().cloned().collect()
	}

	/// Returns the number of distinct warnings.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
