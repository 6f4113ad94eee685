use indexmap::IndexMap;

use crate::fixtures::FixtureValue;
use crate::object::Identity;

/// One discovered entity: its identity and the fields exported so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	identity: Identity,
	fields: IndexMap<String, FixtureValue>,
	processed: bool,
}

impl Record {
	/// Creates an empty, unprocessed record.
	pub fn new(identity: Identity) -> Self {
		Self {
			identity,
			fields: IndexMap::new(),
			processed: false,
		}
	}

	/// Returns the record identity.
	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	/// Sets a field value, replacing any previous value for that field.
	pub fn add_field_value(&mut self, name: impl Into<String>, value: impl Into<FixtureValue>) {
		self.fields.insert(name.into(), value.into());
	}

	/// Returns one field value.
	pub fn field(&self, name: &str) -> Option<&FixtureValue> {
		self.fields.get(name)
	}

	/// Returns all field values in insertion order.
	pub fn fields(&self) -> &IndexMap<String, FixtureValue> {
		&self.fields
	}

	/// Removes a field, keeping the order of the remaining ones.
	pub fn remove_field(&mut self, name: &str) -> Option<FixtureValue> {
		self.fields.shift_remove(name)
	}

	/// Drops every reference to `type_key` from this record.
	///
	/// Single references are removed with their field. Lists lose only the
	/// matching tokens and are removed once empty. Returns the number of
	/// tokens dropped.
	pub fn scrub_references_to(&mut self, type_key: &str) -> usize {
		let mut dropped = 0;
		self.fields.retain(|_, value| match value {
			FixtureValue::Scalar(_) => true,
			FixtureValue::Reference(reference) => {
				if reference.targets(type_key) {
					dropped += 1;
					false
				} else {
					true
				}
			}
			FixtureValue::References(references) => {
				let before = references.len();
				references.retain(|reference| !reference.targets(type_key));
				dropped += before - references.len();
				before == references.len() || !references.is_empty()
			}
		});
		dropped
	}

	/// Returns true while the record awaits processing.
	pub fn is_new(&self) -> bool {
		!self.processed && self.fields.is_empty()
	}

	/// Marks the record as processed.
	pub fn mark_processed(&mut self) {
		self.processed = true;
	}

	/// Returns true if the record has been processed.
	pub fn is_processed(&self) -> bool {
		self.processed
	}

	/// Returns true if the record carries at least one field.
	pub fn is_populated(&self) -> bool {
		!self.fields.is_empty()
	}
}
