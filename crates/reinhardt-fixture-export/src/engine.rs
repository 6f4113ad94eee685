//! Traversal engine.
//!
//! [`FixtureExporter`] walks the object graph breadth first from the roots it is
//! given. Each object is processed once: its scalar fields are copied, its
//! relationships are turned into forward references, and related objects are
//! queued for processing. [`finalize`](FixtureExporter::finalize) then orders
//! the collected types by dependency and builds a [`FixtureSnapshot`].
//!
//! ## Example
//!
//! ```
//! use reinhardt_fixture_export::prelude::*;
//!
//! let mut store = MemoryStore::new();
//! store.define_model(ModelDefinition::new("Image").field("Name"));
//! store.define_model(ModelDefinition::new("Page").field("Title").has_one("Hero", "Image"));
//! store.insert(StoredObject::new("Image", 3).with_value("Name", "hero.png"));
//! let page = store.insert(
//!     StoredObject::new("Page", 1).with_value("Title", "Home").with_value("HeroID", 3),
//! );
//!
//! let mut exporter = FixtureExporter::new(&store, ExportSettings::default());
//! exporter.add_root(page).unwrap();
//! let snapshot = exporter.finalize().unwrap();
//!
//! let order: Vec<_> = snapshot.type_keys().collect();
//! assert_eq!(order, vec!["Image", "Page"]);
//! ```

mod localized;
mod relations;

pub use localized::{LOCALE_FIELD, RECORD_ID_FIELD};

use std::collections::{HashMap, VecDeque};

use crate::error::{ExportError, ExportResult};
use crate::fixtures::{FixtureRows, FixtureSnapshot, SnapshotSerializer};
use crate::graph::DependencyGraph;
use crate::object::{LocaleCodeCache, ObjectRef, ObjectStore, StoredValue};
use crate::schema::{SchemaCache, TypeSchema};
use crate::settings::ExportSettings;
use crate::sorter::KahnSorter;
use crate::store::RecordStore;
use crate::warning::{ExportWarning, WarningLog};

/// One queued object and its distance from the nearest root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkItem {
	object: ObjectRef,
	depth: usize,
}

/// Exports the object graph reachable from a set of roots.
pub struct FixtureExporter<'s, S: ObjectStore> {
	store: &'s S,
	settings: ExportSettings,
	max_depth: Option<usize>,
	worklist: VecDeque<WorkItem>,
	queued_depth: HashMap<ObjectRef, usize>,
	records: RecordStore,
	graph: DependencyGraph,
	schemas: SchemaCache,
	locale_codes: LocaleCodeCache,
	warnings: WarningLog,
}

impl<'s, S: ObjectStore> FixtureExporter<'s, S> {
	/// Creates an exporter reading from `store`.
	pub fn new(store: &'s S, settings: ExportSettings) -> Self {
		let mut warnings = WarningLog::new();
		let max_depth = match settings.max_depth {
			Some(0) => {
				warnings.push(ExportWarning::UnlimitedDepth);
				None
			}
			other => other,
		};

		Self {
			store,
			settings,
			max_depth,
			worklist: VecDeque::new(),
			queued_depth: HashMap::new(),
			records: RecordStore::new(),
			graph: DependencyGraph::new(),
			schemas: SchemaCache::new(),
			locale_codes: LocaleCodeCache::new(),
			warnings,
		}
	}

	/// Queues a root object.
	///
	/// Adding an object that was already exported is a no-op. An object still
	/// pending at a greater depth is moved up to depth 0.
	///
	/// # Errors
	///
	/// Returns [`ExportError::NotPersisted`] if the object has no durable storage.
	pub fn add_root(&mut self, object: ObjectRef) -> ExportResult<&mut Self> {
		if !self.store.exists(&object) {
			return Err(ExportError::NotPersisted {
				type_key: object.type_key,
				identity: object.identity,
			});
		}
		tracing::debug!("Adding root {}", object);
		self.enqueue(object, 0);
		Ok(self)
	}

	/// Processes the next queued object.
	///
	/// Returns `false` once the worklist is empty.
	///
	/// # Errors
	///
	/// Returns [`ExportError::SchemaError`] when a reverse relationship has no
	/// matching forward relationship.
	pub fn drain(&mut self) -> ExportResult<bool> {
		let Some(item) = self.worklist.pop_front() else {
			return Ok(false);
		};
		let depth = self
			.queued_depth
			.remove(&item.object)
			.unwrap_or(item.depth);
		if self
			.records
			.is_new(&item.object.type_key, &item.object.identity)
		{
			self.process(&item.object, depth)?;
		}
		Ok(true)
	}

	/// Processes queued objects until none are left.
	pub fn drain_all(&mut self) -> ExportResult<()> {
		while self.drain()? {}
		Ok(())
	}

	/// Builds the snapshot for everything reached so far.
	///
	/// Drains the worklist, adds the store's locale definitions, optionally
	/// breaks cycles, then orders the types by dependency. Can be called again
	/// after adding more roots.
	pub fn finalize(&mut self) -> ExportResult<FixtureSnapshot> {
		self.drain_all()?;

		let mut registry_type = None;
		for locale in self.store.locale_registry_objects() {
			registry_type.get_or_insert_with(|| locale.type_key.clone());
			self.add_root(locale)?;
		}
		self.drain_all()?;

		if self.settings.break_cycles {
			self.break_cycles();
		}

		let outcome = KahnSorter::new(self.graph.ordered_edges()).sort();
		for diagnostic in &outcome.diagnostics {
			self.warnings
				.push(ExportWarning::Cycle(diagnostic.to_string()));
		}

		let mut order = outcome.order;
		for type_key in self.records.type_keys() {
			if !order.iter().any(|ordered| ordered == type_key) {
				order.push(type_key.to_string());
			}
		}
		if let Some(registry_type) = registry_type {
			order.retain(|type_key| type_key != &registry_type);
			order.insert(0, registry_type);
		}

		let snapshot = self.build_snapshot(&order)?;
		tracing::info!(
			"Exported {} records across {} types with {} warnings",
			snapshot.record_count(),
			snapshot.len(),
			self.warnings.len()
		);
		Ok(snapshot)
	}

	/// Returns the warnings recorded so far, in first-seen order.
	pub fn warnings(&self) -> Vec<String> {
		self.warnings.to_vec()
	}

	/// Returns the warning log.
	pub fn warning_log(&self) -> &WarningLog {
		&self.warnings
	}

	/// Returns the collected records.
	pub fn record_store(&self) -> &RecordStore {
		&self.records
	}

	/// Returns the dependency graph.
	pub fn dependency_graph(&self) -> &DependencyGraph {
		&self.graph
	}

	/// Returns the number of queued objects.
	pub fn pending(&self) -> usize {
		self.worklist.len()
	}

	/// Returns the effective depth limit.
	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}

	/// Returns the settings this exporter runs with.
	pub fn settings(&self) -> &ExportSettings {
		&self.settings
	}

	/// Drops the cached locale codes of `object`, so the store is asked again
	/// the next time the object is processed.
	pub fn invalidate_locale_codes(&mut self, object: &ObjectRef) {
		self.locale_codes.invalidate_object(object);
	}

	/// Drops every cached locale code.
	pub fn clear_locale_codes(&mut self) {
		self.locale_codes.clear();
	}

	/// Returns the locale code cache.
	pub fn locale_code_cache(&self) -> &LocaleCodeCache {
		&self.locale_codes
	}

	/// Returns a serializer for the configured output format.
	pub fn serializer(&self) -> SnapshotSerializer {
		SnapshotSerializer::from_settings(&self.settings)
	}

	/// Forward-declares the record and queues the object unless it was
	/// already processed. A pending object keeps the smallest depth it was
	/// queued at.
	fn enqueue(&mut self, object: ObjectRef, depth: usize) {
		let record = self
			.records
			.get_or_create_record(&object.type_key, &object.identity);
		if !record.is_new() {
			return;
		}
		match self.queued_depth.get_mut(&object) {
			Some(queued) => *queued = (*queued).min(depth),
			None => {
				self.queued_depth.insert(object.clone(), depth);
				self.worklist.push_back(WorkItem { object, depth });
			}
		}
	}

	fn process(&mut self, object: &ObjectRef, depth: usize) -> ExportResult<()> {
		let schema = self.schemas.get_or_resolve(self.store, &object.type_key);
		let exclusions: Vec<String> = schema
			.excluded_relationships
			.iter()
			.chain(self.settings.excluded_relationships_for(&object.type_key))
			.cloned()
			.collect();
		self.graph.register_type(&object.type_key, exclusions);
		self.records
			.get_or_create_record(&object.type_key, &object.identity)
			.mark_processed();
		tracing::debug!("Processing {} at depth {}", object, depth);

		self.export_scalar_fields(object, &schema);

		let expand = self.expands_relationships(depth);
		if expand {
			self.export_one_to_one(object, &schema, depth);
			self.export_one_to_many(object, &schema, depth)?;
			self.export_many_to_many(object, &schema, depth);
		}

		if self.store.is_localizable(object) {
			self.export_localizations(object, &schema, depth, expand);
		}
		Ok(())
	}

	fn export_scalar_fields(&mut self, object: &ObjectRef, schema: &TypeSchema) {
		for field in &schema.fields {
			if let Some(StoredValue::Scalar(value)) = self.store.resolved_field_value(object, field) {
				self.records
					.get_or_create_record(&object.type_key, &object.identity)
					.add_field_value(field.as_str(), value);
			}
		}
	}

	/// Relationships of an object at `depth` are followed only below the limit.
	fn expands_relationships(&self, depth: usize) -> bool {
		self.max_depth.is_none_or(|max| depth < max)
	}

	fn is_target_excluded(&mut self, type_key: &str) -> bool {
		self.settings.is_type_excluded(type_key) || self.schemas.is_type_excluded(self.store, type_key)
	}

	fn break_cycles(&mut self) {
		for (from, to) in self.graph.find_looping_edges() {
			self.graph.remove_edge(&from, &to);
			let removed = self
				.records
				.group_mut(&from)
				.map(|group| {
					group
						.records_mut()
						.map(|record| record.scrub_references_to(&to))
						.sum::<usize>()
				})
				.unwrap_or(0);
			self.warnings
				.push(ExportWarning::CycleBroken { from, to, removed });
		}
	}

	/// Every ordered type was either processed or queued, so it has a group.
	fn build_snapshot(&mut self, order: &[String]) -> ExportResult<FixtureSnapshot> {
		let mut snapshot = FixtureSnapshot::new();
		for type_key in order {
			let Some(group) = self.records.group(type_key) else {
				return Err(ExportError::InvariantViolation(format!(
					"type {} is in the dependency graph but has no records",
					type_key
				)));
			};
			if !group.has_populated_records() {
				self.warnings.push(ExportWarning::EmptyGroup {
					type_key: type_key.clone(),
				});
				continue;
			}

			let mut rows = FixtureRows::new();
			for record in group.records() {
				if !record.is_populated() {
					self.warnings.push(ExportWarning::EmptyRecord {
						type_key: type_key.clone(),
						identity: record.identity().to_string(),
					});
					continue;
				}
				rows.insert(record.identity().clone(), record.fields().clone());
			}
			snapshot.insert_group(type_key.as_str(), rows);
		}
		Ok(snapshot)
	}
}
