//! Per-locale sub-records.
//!
//! A localizable object gets one extra record per locale and per localized
//! table. Its type is `{table}_{suffix}`, its identity `{id}{locale}`, and it
//! points back at the base record through `RecordID`.

use serde_json::Value;

use super::FixtureExporter;
use crate::fixtures::ForwardRef;
use crate::object::{Identity, ObjectRef, ObjectStore, StoredValue};
use crate::schema::TypeSchema;
use crate::warning::ExportWarning;

/// Field on a per-locale record referencing its base record.
pub const RECORD_ID_FIELD: &str = "RecordID";

/// Field on a per-locale record holding the locale code.
pub const LOCALE_FIELD: &str = "Locale";

impl<S: ObjectStore> FixtureExporter<'_, S> {
	pub(super) fn export_localizations(
		&mut self,
		object: &ObjectRef,
		schema: &TypeSchema,
		depth: usize,
		expand: bool,
	) {
		let codes = self
			.locale_codes
			.codes_for(self.store, object, self.settings.stage);
		if codes.is_empty() || schema.localized_tables.is_empty() {
			return;
		}

		let store = self.store;
		// Related objects are queued only after the locale scope has ended.
		let mut discovered: Vec<ObjectRef> = Vec::new();

		for code in &codes {
			store.with_locale_scope(code, |scoped| {
				let Some(localized) = scoped.fetch(&object.type_key, &object.identity) else {
					self.warnings.push(ExportWarning::LocalizationLookup {
						type_key: object.type_key.clone(),
						identity: object.identity.clone(),
						locale: code.clone(),
					});
					return;
				};

				let identity = Identity::Str(format!("{}{}", object.identity, code));
				for (table, fields) in &schema.localized_tables {
					let type_key = self.settings.localized_type_key(table);
					self.graph.register_type(&type_key, Vec::<String>::new());
					self.graph.add_edge(&type_key, &object.type_key);

					let record = self.records.get_or_create_record(&type_key, &identity);
					record.mark_processed();
					record.add_field_value(RECORD_ID_FIELD, ForwardRef::to(object));
					record.add_field_value(LOCALE_FIELD, Value::String(code.clone()));

					for field in fields {
						let source = field
							.strip_suffix("ID")
							.filter(|relation| !relation.is_empty())
							.unwrap_or(field.as_str());
						let value = scoped
							.resolved_field_value(&localized, source)
							.or_else(|| {
								(source != field.as_str())
									.then(|| scoped.resolved_field_value(&localized, field))
									.flatten()
							});
						match value {
							Some(StoredValue::Object(target)) => {
								if !expand
									|| self.settings.is_type_excluded(&target.type_key)
									|| scoped.is_excluded(&target.type_key)
								{
									continue;
								}
								if !scoped.exists(&target) {
									self.warnings.push(ExportWarning::NotPersistedRelation {
										type_key: type_key.clone(),
										relationship: source.to_string(),
										target,
									});
									continue;
								}
								self.records
									.get_or_create_record(&type_key, &identity)
									.add_field_value(field.as_str(), ForwardRef::to(&target));
								self.graph.add_edge(&type_key, &target.type_key);
								discovered.push(target);
							}
							Some(StoredValue::Objects(targets)) => {
								if expand {
									discovered.extend(targets.into_iter().filter(|t| scoped.exists(t)));
								}
							}
							Some(StoredValue::Scalar(value)) => {
								self.records
									.get_or_create_record(&type_key, &identity)
									.add_field_value(field.as_str(), value);
							}
							None => {}
						}
					}
				}
			});
		}

		tracing::debug!(
			"Exported {} locale(s) of {}, {} related object(s) discovered",
			codes.len(),
			object,
			discovered.len()
		);
		for related in discovered {
			self.enqueue(related, depth + 1);
		}
	}
}
