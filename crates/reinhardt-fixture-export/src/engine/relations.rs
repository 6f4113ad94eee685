//! Relationship expansion for one processed object.

use super::FixtureExporter;
use crate::error::ExportResult;
use crate::fixtures::ForwardRef;
use crate::object::{Identity, ManyToManyTarget, ObjectRef, ObjectStore, StoredValue};
use crate::schema::TypeSchema;
use crate::warning::ExportWarning;

/// Splits a reverse relationship target of the form `Type.relation`.
fn target_type_of(target: &str) -> &str {
	target
		.rsplit_once('.')
		.map(|(type_key, _)| type_key)
		.unwrap_or(target)
}

impl<S: ObjectStore> FixtureExporter<'_, S> {
	/// Emits a forward reference for each resolvable foreign key and queues
	/// the target.
	pub(super) fn export_one_to_one(&mut self, object: &ObjectRef, schema: &TypeSchema, depth: usize) {
		for (relation, declared) in &schema.one_to_one.relations {
			if self
				.graph
				.is_relationship_excluded(&object.type_key, relation)
			{
				continue;
			}

			let key_field = self.store.foreign_key_field(relation);
			let target_type = match schema.one_to_one.type_hints.get(&key_field) {
				Some(hint_field) => {
					let hinted = self.store.resolved_field_value(object, hint_field);
					match hinted.as_ref().and_then(StoredValue::as_type_name) {
						Some(name) => name.to_string(),
						None => continue,
					}
				}
				None => declared.clone(),
			};
			if self.is_target_excluded(&target_type) {
				continue;
			}

			let Some(key) = self
				.store
				.resolved_field_value(object, &key_field)
				.and_then(|value| value.as_foreign_key())
			else {
				continue;
			};

			let Some(target) = self.store.fetch(&target_type, &Identity::Int(key)) else {
				self.warnings.push(ExportWarning::UnresolvedRelation {
					type_key: object.type_key.clone(),
					relationship: relation.clone(),
					target: format!("{}.{}", target_type, key),
				});
				continue;
			};
			if !self.store.exists(&target) {
				self.warnings.push(ExportWarning::NotPersistedRelation {
					type_key: object.type_key.clone(),
					relationship: relation.clone(),
					target,
				});
				continue;
			}

			self.records
				.get_or_create_record(&object.type_key, &object.identity)
				.add_field_value(key_field, ForwardRef::to(&target));
			self.graph.add_edge(&object.type_key, &target.type_key);
			self.enqueue(target, depth + 1);
		}
	}

	/// Queues the objects on the far side of reverse relationships. The far
	/// side's foreign key supplies the reference once it is processed.
	pub(super) fn export_one_to_many(
		&mut self,
		object: &ObjectRef,
		schema: &TypeSchema,
		depth: usize,
	) -> ExportResult<()> {
		for (relation, target) in &schema.one_to_many {
			self.store
				.verify_reverse_one_to_one(&object.type_key, relation)?;
			if self
				.graph
				.is_relationship_excluded(&object.type_key, relation)
			{
				continue;
			}
			if self.is_target_excluded(target_type_of(target)) {
				continue;
			}

			for related in self.store.related_objects(object, relation) {
				if !self.store.exists(&related) {
					self.warnings.push(ExportWarning::NotPersistedRelation {
						type_key: object.type_key.clone(),
						relationship: relation.clone(),
						target: related,
					});
					continue;
				}
				self.enqueue(related, depth + 1);
			}
		}
		Ok(())
	}

	pub(super) fn export_many_to_many(&mut self, object: &ObjectRef, schema: &TypeSchema, depth: usize) {
		for (relation, target) in &schema.many_to_many {
			if self
				.graph
				.is_relationship_excluded(&object.type_key, relation)
				|| self.is_target_excluded(target.target_type())
			{
				continue;
			}

			match target {
				ManyToManyTarget::Direct { target_type, via } => {
					let own_key = format!("{}.{}", object.type_key, relation);
					if !self.graph.is_many_to_many_represented(&own_key) {
						if self.is_represented_from_far_side(
							&object.type_key,
							target_type,
							via.as_deref(),
						) {
							// The far side's own lists carry the link.
							tracing::debug!("Many-to-many {} already represented", own_key);
							self.export_related_list(object, relation, depth, false);
							continue;
						}
						self.graph
							.mark_many_to_many_represented(&own_key, target_type);
					}
					self.export_related_list(object, relation, depth, true);
				}
				ManyToManyTarget::Through {
					join_type,
					target_type,
				} => {
					let claimed_elsewhere = self
						.graph
						.many_to_many_counterpart(join_type)
						.is_some_and(|counterpart| counterpart != target_type);
					if schema.has_one_to_many_target_starting_with(join_type) {
						tracing::debug!(
							"Many-to-many {}::{} through {} covered by a reverse relationship",
							object.type_key,
							relation,
							join_type
						);
						continue;
					}
					if claimed_elsewhere {
						tracing::debug!(
							"Many-to-many {}::{} through {} already represented",
							object.type_key,
							relation,
							join_type
						);
						self.export_related_list(object, relation, depth, false);
						continue;
					}
					self.graph
						.mark_many_to_many_represented(join_type, target_type);
					self.export_related_list(object, relation, depth, true);
				}
				ManyToManyTarget::Unsupported { .. } => {
					self.warnings
						.push(ExportWarning::UnsupportedRelationship {
							type_key: object.type_key.clone(),
							relationship: relation.clone(),
						});
				}
			}
		}
	}

	/// Returns true if the other end of a direct many-to-many relationship
	/// already emits it.
	fn is_represented_from_far_side(
		&self,
		type_key: &str,
		target_type: &str,
		via: Option<&str>,
	) -> bool {
		if let Some(via) = via {
			return self
				.graph
				.is_many_to_many_represented(&format!("{}.{}", target_type, via));
		}
		// A self-referencing relationship has no distinguishable far side.
		target_type != type_key
			&& self
				.graph
				.is_many_to_many_represented_towards(target_type, type_key)
	}

	/// Queues the persisted objects of a multi-valued relationship.
	///
	/// With `emit` set, also writes a token list for them. Nothing is written
	/// when none could be queued.
	fn export_related_list(&mut self, object: &ObjectRef, relation: &str, depth: usize, emit: bool) {
		let mut tokens = Vec::new();
		for related in self.store.related_objects(object, relation) {
			if !self.store.exists(&related) {
				self.warnings.push(ExportWarning::NotPersistedRelation {
					type_key: object.type_key.clone(),
					relationship: relation.to_string(),
					target: related,
				});
				continue;
			}
			if emit {
				tokens.push(ForwardRef::to(&related));
				self.graph.add_edge(&object.type_key, &related.type_key);
			}
			self.enqueue(related, depth + 1);
		}

		if !tokens.is_empty() {
			self.records
				.get_or_create_record(&object.type_key, &object.identity)
				.add_field_value(relation, tokens);
		}
	}
}
