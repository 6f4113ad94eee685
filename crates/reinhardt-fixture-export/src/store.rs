//! Record store: every discovered entity, grouped by type.
//!
//! The store holds no graph logic. It is a two-level ordered map
//! (`type → identity → record`) that the exporter fills while traversing and
//! reads back when building a snapshot. Insertion order is preserved at both
//! levels so output is deterministic.

mod group;
mod record;

use indexmap::IndexMap;

use crate::object::Identity;

pub use group::Group;
pub use record::Record;

/// All groups known to one export session.
#[derive(Debug, Default)]
pub struct RecordStore {
	groups: IndexMap<String, Group>,
}

impl RecordStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the group for `type_key`, creating it if needed.
	pub fn get_or_create_group(&mut self, type_key: &str) -> &mut Group {
		self.groups
			.entry(type_key.to_string())
			.or_insert_with(|| Group::new(type_key))
	}

	/// Returns the record for `type_key` / `identity`, creating the group and
	/// record if needed.
	pub fn get_or_create_record(&mut self, type_key: &str, identity: &Identity) -> &mut Record {
		self.get_or_create_group(type_key)
			.get_or_create_record(identity)
	}

	/// Returns the group for `type_key`, if one exists.
	pub fn group(&self, type_key: &str) -> Option<&Group> {
		self.groups.get(type_key)
	}

	/// Returns the group for `type_key` mutably, if one exists.
	pub fn group_mut(&mut self, type_key: &str) -> Option<&mut Group> {
		self.groups.get_mut(type_key)
	}

	/// Returns the record for `type_key` / `identity`, if one exists.
	pub fn record(&self, type_key: &str, identity: &Identity) -> Option<&Record> {
		self.group(type_key)?.record(identity)
	}

	/// Returns true if the record exists and still awaits processing.
	pub fn is_new(&self, type_key: &str, identity: &Identity) -> bool {
		self.record(type_key, identity)
			.map(Record::is_new)
			.unwrap_or(true)
	}

	/// Iterates over the groups in creation order.
	pub fn groups(&self) -> impl Iterator<Item = &Group> {
		self.groups.values()
	}

	/// Returns the type keys in creation order.
	pub fn type_keys(&self) -> impl Iterator<Item = &str> {
		self.groups.keys().map(String::as_str)
	}

	/// Returns the number of groups.
	pub fn group_count(&self) -> usize {
		self.groups.len()
	}

	/// Returns the number of records across all groups.
	pub fn record_count(&self) -> usize {
		self.groups.values().map(Group::len).sum()
	}

	/// Returns the number of records that carry at least one field.
	pub fn populated_record_count(&self) -> usize {
		self.groups
			.values()
			.map(|group| group.populated_records().count())
			.sum()
	}
}
