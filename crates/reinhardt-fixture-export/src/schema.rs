//! Per-type relationship schema, resolved once and cached.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::object::{ManyToManyTarget, ObjectStore, OneToOneRelations};

/// Everything the exporter needs to know about one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
	/// Type this schema describes.
	pub type_key: String,
	/// Scalar fields, in declaration order.
	pub fields: Vec<String>,
	/// Foreign-key relationships and polymorphic type hints.
	pub one_to_one: OneToOneRelations,
	/// Reverse relationships: name to (possibly qualified) target type.
	pub one_to_many: IndexMap<String, String>,
	/// Many-to-many relationships.
	pub many_to_many: IndexMap<String, ManyToManyTarget>,
	/// Per-locale tables and the fields each one stores.
	pub localized_tables: IndexMap<String, Vec<String>>,
	/// Relationships the type asks to leave out.
	pub excluded_relationships: Vec<String>,
}

impl TypeSchema {
	/// Queries `store` for the schema of `type_key`.
	pub fn resolve<S: ObjectStore>(store: &S, type_key: &str) -> Self {
		Self {
			type_key: type_key.to_string(),
			fields: store.fields(type_key),
			one_to_one: store.one_to_one_relationships(type_key),
			one_to_many: store.one_to_many_relationships(type_key),
			many_to_many: store.many_to_many_relationships(type_key),
			localized_tables: store.localized_field_tables(type_key),
			excluded_relationships: store.excluded_relationships(type_key),
		}
	}

	/// Returns true if any reverse relationship targets a type whose name
	/// starts with `prefix`.
	///
	/// A join type that also shows up as a reverse relationship is exported
	/// through that relationship instead.
	pub fn has_one_to_many_target_starting_with(&self, prefix: &str) -> bool {
		self.one_to_many
			.values()
			.any(|target| target.starts_with(prefix))
	}

	/// Returns true if the type declares localized tables.
	pub fn is_localized(&self) -> bool {
		!self.localized_tables.is_empty()
	}
}

/// Cache of resolved schemas and type exclusion flags.
#[derive(Debug, Default)]
pub struct SchemaCache {
	schemas: HashMap<String, Arc<TypeSchema>>,
	excluded: HashMap<String, bool>,
}

impl SchemaCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the schema for `type_key`, resolving it on first use.
	pub fn get_or_resolve<S: ObjectStore>(&mut self, store: &S, type_key: &str) -> Arc<TypeSchema> {
		if let Some(schema) = self.schemas.get(type_key) {
			return Arc::clone(schema);
		}
		let schema = Arc::new(TypeSchema::resolve(store, type_key));
		self.schemas
			.insert(type_key.to_string(), Arc::clone(&schema));
		schema
	}

	/// Returns true if the store excludes `type_key` from relationship tracking.
	pub fn is_type_excluded<S: ObjectStore>(&mut self, store: &S, type_key: &str) -> bool {
		if let Some(excluded) = self.excluded.get(type_key) {
			return *excluded;
		}
		let excluded = store.is_excluded(type_key);
		self.excluded.insert(type_key.to_string(), excluded);
		excluded
	}

	/// Returns the number of resolved schemas.
	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	/// Returns true if nothing was resolved yet.
	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}
}
