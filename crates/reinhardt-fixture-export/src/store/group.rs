use indexmap::IndexMap;

use super::Record;
use crate::object::Identity;

/// All records of one type, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
	type_key: String,
	records: IndexMap<Identity, Record>,
}

impl Group {
	/// Creates an empty group.
	pub fn new(type_key: impl Into<String>) -> Self {
		Self {
			type_key: type_key.into(),
			records: IndexMap::new(),
		}
	}

	/// Returns the type this group holds.
	pub fn type_key(&self) -> &str {
		&self.type_key
	}

	/// Returns the record for `identity`, creating it if needed.
	pub fn get_or_create_record(&mut self, identity: &Identity) -> &mut Record {
		self.records
			.entry(identity.clone())
			.or_insert_with(|| Record::new(identity.clone()))
	}

	/// Returns the record for `identity`, if one exists.
	pub fn record(&self, identity: &Identity) -> Option<&Record> {
		self.records.get(identity)
	}

	/// Iterates over the records in discovery order.
	pub fn records(&self) -> impl Iterator<Item = &Record> {
		self.records.values()
	}

	/// Iterates mutably over the records in discovery order.
	pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
		self.records.values_mut()
	}

	/// Iterates over the records that carry at least one field.
	pub fn populated_records(&self) -> impl Iterator<Item = &Record> {
		self.records.values().filter(|record| record.is_populated())
	}

	/// Returns true if any record carries a field.
	pub fn has_populated_records(&self) -> bool {
		self.records.values().any(Record::is_populated)
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns true if the group holds no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
