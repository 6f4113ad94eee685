//! Locale code lookup caching.
//!
//! Looking up which locales have a variant of an object is a query against the
//! store's per-locale tables. The exporter asks once per object and stage and
//! keeps the answer in a [`LocaleCodeCache`] it owns, so nothing is shared
//! between export sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Identity, ObjectRef, ObjectStore};

/// Publication stage whose locale variants are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStage {
	/// Working copy (default).
	#[default]
	Draft,
	/// Published copy.
	Live,
}

impl std::fmt::Display for PublicationStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Draft => write!(f, "Stage"),
			Self::Live => write!(f, "Live"),
		}
	}
}

type CacheKey = (String, Identity, PublicationStage);

/// Cache of locale codes keyed by type, identity and stage.
#[derive(Debug, Default)]
pub struct LocaleCodeCache {
	entries: HashMap<CacheKey, Vec<String>>,
}

impl LocaleCodeCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the locale codes for `object`, asking the store on a miss.
	pub fn codes_for<S: ObjectStore>(
		&mut self,
		store: &S,
		object: &ObjectRef,
		stage: PublicationStage,
	) -> Vec<String> {
		self.entries
			.entry((object.type_key.clone(), object.identity.clone(), stage))
			.or_insert_with(|| store.locale_codes_for(object, stage))
			.clone()
	}

	/// Drops the cached codes for one object at one stage.
	///
	/// Returns true if an entry was removed.
	pub fn invalidate(&mut self, object: &ObjectRef, stage: PublicationStage) -> bool {
		self.entries
			.remove(&(object.type_key.clone(), object.identity.clone(), stage))
			.is_some()
	}

	/// Drops the cached codes for one object at every stage.
	pub fn invalidate_object(&mut self, object: &ObjectRef) {
		self.entries
			.retain(|(type_key, identity, _), _| {
				type_key != &object.type_key || identity != &object.identity
			});
	}

	/// Drops every cached entry.
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Returns the number of cached entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::{MemoryStore, ModelDefinition, StoredObject};
	use rstest::rstest;

	fn localized_store() -> MemoryStore {
		let mut store = MemoryStore::new();
		store.define_model(
			ModelDefinition::new("Page")
				.field("Title")
				.localized_table("Page", ["Title"]),
		);
		store.insert(
			StoredObject::new("Page", 1)
				.with_value("Title", "Home")
				.with_localization("en_NZ", [("Title", "Kia ora")])
				.with_localization("de_DE", [("Title", "Hallo")]),
		);
		store
	}

	#[rstest]
	fn test_codes_are_cached() {
		let store = localized_store();
		let page = ObjectRef::new("Page", 1);
		let mut cache = LocaleCodeCache::new();

		let first = cache.codes_for(&store, &page, PublicationStage::Draft);
		let second = cache.codes_for(&store, &page, PublicationStage::Draft);

		assert_eq!(first, vec!["en_NZ".to_string(), "de_DE".to_string()]);
		assert_eq!(first, second);
		assert_eq!(store.locale_lookups(), 1);
		assert_eq!(cache.len(), 1);
	}

	#[rstest]
	fn test_stages_are_cached_separately() {
		let store = localized_store();
		let page = ObjectRef::new("Page", 1);
		let mut cache = LocaleCodeCache::new();

		cache.codes_for(&store, &page, PublicationStage::Draft);
		cache.codes_for(&store, &page, PublicationStage::Live);

		assert_eq!(store.locale_lookups(), 2);
		assert_eq!(cache.len(), 2);
	}

	#[rstest]
	fn test_invalidate_forces_reload() {
		let store = localized_store();
		let page = ObjectRef::new("Page", 1);
		let mut cache = LocaleCodeCache::new();

		cache.codes_for(&store, &page, PublicationStage::Draft);
		assert!(cache.invalidate(&page, PublicationStage::Draft));
		assert!(!cache.invalidate(&page, PublicationStage::Draft));
		cache.codes_for(&store, &page, PublicationStage::Draft);

		assert_eq!(store.locale_lookups(), 2);
	}

	#[rstest]
	fn test_invalidate_object_and_clear() {
		let store = localized_store();
		let page = ObjectRef::new("Page", 1);
		let mut cache = LocaleCodeCache::new();

		cache.codes_for(&store, &page, PublicationStage::Draft);
		cache.codes_for(&store, &page, PublicationStage::Live);
		cache.invalidate_object(&page);
		assert!(cache.is_empty());

		cache.codes_for(&store, &page, PublicationStage::Draft);
		cache.clear();
		assert!(cache.is_empty());
	}
}
