//! In-memory [`ObjectStore`].
//!
//! `MemoryStore` holds model definitions and stored objects in ordered maps and
//! answers every capability query the exporter makes. It backs the crate's
//! tests and is handy for tooling that assembles object graphs by hand.
//!
//! ## Example
//!
//! ```
//! use reinhardt_fixture_export::memory::{MemoryStore, ModelDefinition, StoredObject};
//! use reinhardt_fixture_export::object::{ObjectRef, ObjectStore};
//!
//! let mut store = MemoryStore::new();
//! store.define_model(ModelDefinition::new("Image").field("Name"));
//! store.define_model(ModelDefinition::new("Page").field("Title").has_one("Hero", "Image"));
//! store.insert(StoredObject::new("Image", 3).with_value("Name", "hero.png"));
//! store.insert(StoredObject::new("Page", 1).with_value("Title", "Home").with_value("HeroID", 3));
//!
//! assert!(store.exists(&ObjectRef::new("Page", 1)));
//! assert_eq!(store.fields("Page"), vec!["Title"]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{ExportError, ExportResult};
use crate::object::{
	Identity, ManyToManyTarget, ObjectRef, ObjectStore, OneToOneRelations, PublicationStage,
	StoredValue,
};

/// Declaration of one model type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDefinition {
	type_key: String,
	parent: Option<String>,
	fields: Vec<String>,
	one_to_one: OneToOneRelations,
	one_to_many: IndexMap<String, String>,
	many_to_many: IndexMap<String, ManyToManyTarget>,
	localized_tables: IndexMap<String, Vec<String>>,
	excluded: bool,
	excluded_relationships: Vec<String>,
}

impl ModelDefinition {
	/// Starts a definition for `type_key`.
	pub fn new(type_key: impl Into<String>) -> Self {
		Self {
			type_key: type_key.into(),
			..Self::default()
		}
	}

	/// Returns the declared type.
	pub fn type_key(&self) -> &str {
		&self.type_key
	}

	/// Inherits declarations from `parent`. Objects of this type can be
	/// fetched through the parent type.
	pub fn extends(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	/// Declares a scalar field.
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.fields.push(name.into());
		self
	}

	/// Declares a foreign-key relationship stored in `{name}ID`.
	pub fn has_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.one_to_one.relations.insert(name.into(), target.into());
		self
	}

	/// Declares a foreign-key relationship whose concrete target type is
	/// stored in `{name}Class`.
	pub fn has_one_polymorphic(mut self, name: impl Into<String>, base: impl Into<String>) -> Self {
		let name = name.into();
		self.one_to_one
			.type_hints
			.insert(format!("{}ID", name), format!("{}Class", name));
		self.one_to_one.relations.insert(name, base.into());
		self
	}

	/// Declares a reverse relationship. `target` may be qualified as
	/// `Type.relation`.
	pub fn has_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.one_to_many.insert(name.into(), target.into());
		self
	}

	/// Declares a many-to-many relationship the store enumerates directly.
	pub fn many_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.many_to_many
			.insert(name.into(), ManyToManyTarget::direct(target));
		self
	}

	/// Declares the far side of a many-to-many relationship owned by `target`.
	pub fn belongs_many_many(
		mut self,
		name: impl Into<String>,
		target: impl Into<String>,
		via: impl Into<String>,
	) -> Self {
		self.many_to_many
			.insert(name.into(), ManyToManyTarget::qualified(target, via));
		self
	}

	/// Declares a many-to-many relationship mediated by `join_type`.
	pub fn many_many_through(
		mut self,
		name: impl Into<String>,
		join_type: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		self.many_to_many
			.insert(name.into(), ManyToManyTarget::through(join_type, target));
		self
	}

	/// Declares a many-to-many relationship without a join type.
	pub fn many_many_unmediated(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.many_to_many
			.insert(name.into(), ManyToManyTarget::unsupported(target));
		self
	}

	/// Declares a per-locale table holding `fields`.
	pub fn localized_table<I, F>(mut self, table: impl Into<String>, fields: I) -> Self
	where
		I: IntoIterator<Item = F>,
		F: Into<String>,
	{
		self.localized_tables
			.insert(table.into(), fields.into_iter().map(Into::into).collect());
		self
	}

	/// Opts the type out of relationship tracking.
	pub fn excluded(mut self) -> Self {
		self.excluded = true;
		self
	}

	/// Leaves one relationship of this type out of fixtures.
	pub fn excluded_relationship(mut self, name: impl Into<String>) -> Self {
		self.excluded_relationships.push(name.into());
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LocalizedValues {
	values: IndexMap<String, Value>,
	published: bool,
}

/// One stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
	type_key: String,
	identity: Identity,
	values: IndexMap<String, Value>,
	overrides: IndexMap<String, Value>,
	related: IndexMap<String, Vec<ObjectRef>>,
	localizations: IndexMap<String, LocalizedValues>,
	persisted: bool,
}

impl StoredObject {
	/// Creates a persisted object with no values.
	pub fn new(type_key: impl Into<String>, identity: impl Into<Identity>) -> Self {
		Self {
			type_key: type_key.into(),
			identity: identity.into(),
			values: IndexMap::new(),
			overrides: IndexMap::new(),
			related: IndexMap::new(),
			localizations: IndexMap::new(),
			persisted: true,
		}
	}

	/// Returns a handle to this object.
	pub fn object_ref(&self) -> ObjectRef {
		ObjectRef::new(self.type_key.clone(), self.identity.clone())
	}

	/// Sets a column value.
	pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(field.into(), value.into());
		self
	}

	/// Sets a computed value that takes precedence over the column value.
	pub fn with_override(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.overrides.insert(field.into(), value.into());
		self
	}

	/// Sets the objects on the far side of a multi-valued relationship.
	pub fn with_related<I>(mut self, relation: impl Into<String>, objects: I) -> Self
	where
		I: IntoIterator<Item = ObjectRef>,
	{
		self.related
			.insert(relation.into(), objects.into_iter().collect());
		self
	}

	/// Adds published per-locale values.
	pub fn with_localization<I, K, V>(self, code: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		self.localize(code.into(), values, true)
	}

	/// Adds per-locale values that exist only in the draft stage.
	pub fn with_draft_localization<I, K, V>(self, code: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		self.localize(code.into(), values, false)
	}

	fn localize<I, K, V>(mut self, code: String, values: I, published: bool) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		let entry = self.localizations.entry(code).or_default();
		entry.published |= published;
		for (field, value) in values {
			entry.values.insert(field.into(), value.into());
		}
		self
	}

	/// Marks the object as never saved.
	pub fn unsaved(mut self) -> Self {
		self.persisted = false;
		self
	}
}

/// Restores the previous locale when a scope ends, including on unwind.
struct LocaleScopeGuard<'a> {
	stack: &'a Mutex<Vec<String>>,
}

impl Drop for LocaleScopeGuard<'_> {
	fn drop(&mut self) {
		self.stack.lock().pop();
	}
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
	models: IndexMap<String, ModelDefinition>,
	objects: IndexMap<(String, Identity), StoredObject>,
	locale_registry_type: Option<String>,
	locale_stack: Mutex<Vec<String>>,
	locale_lookups: AtomicUsize,
	schema_lookups: AtomicUsize,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a model definition.
	pub fn define_model(&mut self, model: ModelDefinition) -> &mut Self {
		self.models.insert(model.type_key.clone(), model);
		self
	}

	/// Adds or replaces an object. Returns its handle.
	pub fn insert(&mut self, object: StoredObject) -> ObjectRef {
		let handle = object.object_ref();
		self.objects
			.insert((object.type_key.clone(), object.identity.clone()), object);
		handle
	}

	/// Declares the type whose objects are the locale definitions.
	pub fn set_locale_registry_type(&mut self, type_key: impl Into<String>) -> &mut Self {
		self.locale_registry_type = Some(type_key.into());
		self
	}

	/// Returns the locale of the innermost active scope.
	pub fn current_locale(&self) -> Option<String> {
		self.locale_stack.lock().last().cloned()
	}

	/// Number of `locale_codes_for` calls answered so far.
	pub fn locale_lookups(&self) -> usize {
		self.locale_lookups.load(Ordering::Relaxed)
	}

	/// Number of one-to-one schema queries answered so far.
	pub fn schema_lookups(&self) -> usize {
		self.schema_lookups.load(Ordering::Relaxed)
	}

	/// Returns the model and its ancestors, root first.
	fn lineage(&self, type_key: &str) -> Vec<&ModelDefinition> {
		let mut chain = Vec::new();
		let mut seen = IndexSet::new();
		let mut current = self.models.get(type_key);
		while let Some(model) = current {
			if !seen.insert(model.type_key.as_str()) {
				break;
			}
			chain.push(model);
			current = model
				.parent
				.as_deref()
				.and_then(|parent| self.models.get(parent));
		}
		chain.reverse();
		chain
	}

	fn is_a(&self, type_key: &str, ancestor: &str) -> bool {
		self.lineage(type_key)
			.iter()
			.any(|model| model.type_key == ancestor)
	}

	fn object(&self, object: &ObjectRef) -> Option<&StoredObject> {
		self.objects
			.get(&(object.type_key.clone(), object.identity.clone()))
	}

	fn find(&self, type_key: &str, identity: &Identity) -> Option<&StoredObject> {
		if let Some(found) = self.objects.get(&(type_key.to_string(), identity.clone())) {
			return Some(found);
		}
		self.objects.values().find(|candidate| {
			&candidate.identity == identity && self.is_a(&candidate.type_key, type_key)
		})
	}

	fn localized_value(&self, stored: &StoredObject, field: &str) -> Option<Value> {
		let code = self.current_locale()?;
		stored
			.localizations
			.get(&code)
			.and_then(|localized| localized.values.get(field))
			.cloned()
	}

	fn raw_value(&self, stored: &StoredObject, field: &str) -> Option<Value> {
		if let Some(value) = stored.overrides.get(field) {
			return Some(value.clone());
		}
		self.localized_value(stored, field)
			.or_else(|| stored.values.get(field).cloned())
	}

	fn resolve_one_to_one(&self, stored: &StoredObject, relation: &str) -> Option<ObjectRef> {
		let relations = self.one_to_one_relationships_of(&stored.type_key);
		let declared = relations.relations.get(relation)?;
		let key_field = self.foreign_key_field(relation);
		let target_type = relations
			.type_hints
			.get(&key_field)
			.and_then(|hint| self.raw_value(stored, hint))
			.and_then(|value| value.as_str().map(str::to_string))
			.filter(|name| !name.is_empty())
			.unwrap_or_else(|| declared.clone());
		let key = StoredValue::Scalar(self.raw_value(stored, &key_field)?).as_foreign_key()?;
		self.fetch(&target_type, &Identity::Int(key))
	}

	fn one_to_one_relationships_of(&self, type_key: &str) -> OneToOneRelations {
		let mut merged = OneToOneRelations::new();
		for model in self.lineage(type_key) {
			merged.relations.extend(
				model
					.one_to_one
					.relations
					.iter()
					.map(|(name, target)| (name.clone(), target.clone())),
			);
			merged.type_hints.extend(
				model
					.one_to_one
					.type_hints
					.iter()
					.map(|(field, hint)| (field.clone(), hint.clone())),
			);
		}
		merged
	}
}

impl ObjectStore for MemoryStore {
	fn exists(&self, object: &ObjectRef) -> bool {
		self.object(object).is_some_and(|stored| stored.persisted)
	}

	fn fetch(&self, type_key: &str, identity: &Identity) -> Option<ObjectRef> {
		let stored = self.find(type_key, identity)?;
		if let Some(code) = self.current_locale()
			&& !self.localized_field_tables(&stored.type_key).is_empty()
			&& !stored.localizations.contains_key(&code)
		{
			return None;
		}
		Some(stored.object_ref())
	}

	fn fields(&self, type_key: &str) -> Vec<String> {
		let mut fields = IndexSet::new();
		for model in self.lineage(type_key) {
			fields.extend(model.fields.iter().cloned());
		}
		fields.into_iter().collect()
	}

	fn resolved_field_value(&self, object: &ObjectRef, field: &str) -> Option<StoredValue> {
		let stored = self.object(object)?;
		if let Some(value) = self.raw_value(stored, field) {
			return Some(StoredValue::Scalar(value));
		}
		if let Some(target) = self.resolve_one_to_one(stored, field) {
			return Some(StoredValue::Object(target));
		}
		stored
			.related
			.get(field)
			.map(|objects| StoredValue::Objects(objects.clone()))
	}

	fn one_to_one_relationships(&self, type_key: &str) -> OneToOneRelations {
		self.schema_lookups.fetch_add(1, Ordering::Relaxed);
		self.one_to_one_relationships_of(type_key)
	}

	fn one_to_many_relationships(&self, type_key: &str) -> IndexMap<String, String> {
		let mut merged = IndexMap::new();
		for model in self.lineage(type_key) {
			merged.extend(
				model
					.one_to_many
					.iter()
					.map(|(name, target)| (name.clone(), target.clone())),
			);
		}
		merged
	}

	fn verify_reverse_one_to_one(&self, type_key: &str, relation: &str) -> ExportResult<()> {
		let declared = self.one_to_many_relationships(type_key);
		let target = declared.get(relation).ok_or_else(|| {
			ExportError::schema(type_key, relation, "relationship is not declared")
		})?;
		let (target_type, via) = match target.rsplit_once('.') {
			Some((target_type, via)) => (target_type, Some(via)),
			None => (target.as_str(), None),
		};
		let far_side = self.one_to_one_relationships_of(target_type);

		let matched = match via {
			Some(via) => far_side.relations.contains_key(via),
			None => far_side
				.relations
				.values()
				.any(|pointed| self.is_a(type_key, pointed)),
		};
		if matched {
			Ok(())
		} else {
			Err(ExportError::schema(
				type_key,
				relation,
				format!("no has_one on {} points back to {}", target_type, type_key),
			))
		}
	}

	fn many_to_many_relationships(&self, type_key: &str) -> IndexMap<String, ManyToManyTarget> {
		let mut merged = IndexMap::new();
		for model in self.lineage(type_key) {
			merged.extend(
				model
					.many_to_many
					.iter()
					.map(|(name, target)| (name.clone(), target.clone())),
			);
		}
		merged
	}

	fn related_objects(&self, object: &ObjectRef, relation: &str) -> Vec<ObjectRef> {
		self.object(object)
			.and_then(|stored| stored.related.get(relation))
			.cloned()
			.unwrap_or_default()
	}

	fn is_excluded(&self, type_key: &str) -> bool {
		self.lineage(type_key).iter().any(|model| model.excluded)
	}

	fn excluded_relationships(&self, type_key: &str) -> Vec<String> {
		self.lineage(type_key)
			.iter()
			.flat_map(|model| model.excluded_relationships.iter().cloned())
			.collect()
	}

	fn is_localizable(&self, object: &ObjectRef) -> bool {
		!self.localized_field_tables(&object.type_key).is_empty()
	}

	fn locale_codes_for(&self, object: &ObjectRef, stage: PublicationStage) -> Vec<String> {
		self.locale_lookups.fetch_add(1, Ordering::Relaxed);
		let Some(stored) = self.object(object) else {
			return Vec::new();
		};
		stored
			.localizations
			.iter()
			.filter(|(_, localized)| stage == PublicationStage::Draft || localized.published)
			.map(|(code, _)| code.clone())
			.collect()
	}

	fn with_locale_scope<R, F>(&self, code: &str, scope: F) -> R
	where
		F: FnOnce(&Self) -> R,
	{
		self.locale_stack.lock().push(code.to_string());
		let _guard = LocaleScopeGuard {
			stack: &self.locale_stack,
		};
		scope(self)
	}

	fn localized_field_tables(&self, type_key: &str) -> IndexMap<String, Vec<String>> {
		let mut merged = IndexMap::new();
		for model in self.lineage(type_key) {
			merged.extend(
				model
					.localized_tables
					.iter()
					.map(|(table, fields)| (table.clone(), fields.clone())),
			);
		}
		merged
	}

	fn locale_registry_objects(&self) -> Vec<ObjectRef> {
		let Some(registry) = self.locale_registry_type.as_deref() else {
			return Vec::new();
		};
		self.objects
			.values()
			.filter(|stored| stored.type_key == registry && stored.persisted)
			.map(StoredObject::object_ref)
			.collect()
	}
}
