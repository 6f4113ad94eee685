use indexmap::IndexMap;
use serde::Serialize;

use super::FixtureValue;
use crate::object::Identity;

/// Fields of one exported record.
pub type FixtureFields = IndexMap<String, FixtureValue>;

/// Records of one exported type.
pub type FixtureRows = IndexMap<Identity, FixtureFields>;

/// An exported fixture: `type → identity → field → value`, in dependency order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FixtureSnapshot {
	groups: IndexMap<String, FixtureRows>,
}

impl FixtureSnapshot {
	/// Creates an empty snapshot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a group. A type that is already present keeps its position and
	/// gets the new rows.
	pub fn insert_group(&mut self, type_key: impl Into<String>, rows: FixtureRows) {
		self.groups.insert(type_key.into(), rows);
	}

	/// Returns the exported types in output order.
	pub fn type_keys(&self) -> impl Iterator<Item = &str> {
		self.groups.keys().map(String::as_str)
	}

	/// Returns the position of `type_key` in the output order.
	pub fn position(&self, type_key: &str) -> Option<usize> {
		self.groups.get_index_of(type_key)
	}

	/// Returns the rows of one type.
	pub fn group(&self, type_key: &str) -> Option<&FixtureRows> {
		self.groups.get(type_key)
	}

	/// Returns the fields of one record.
	pub fn record(&self, type_key: &str, identity: &Identity) -> Option<&FixtureFields> {
		self.group(type_key)?.get(identity)
	}

	/// Returns one field of one record.
	pub fn field(&self, type_key: &str, identity: &Identity, field: &str) -> Option<&FixtureValue> {
		self.record(type_key, identity)?.get(field)
	}

	/// Iterates over `(type, rows)` in output order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FixtureRows)> {
		self.groups
			.iter()
			.map(|(type_key, rows)| (type_key.as_str(), rows))
	}

	/// Returns the number of exported types.
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	/// Returns true if nothing was exported.
	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// Returns the number of exported records.
	pub fn record_count(&self) -> usize {
		self.groups.values().map(IndexMap::len).sum()
	}
}
