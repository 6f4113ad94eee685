//! Per-locale export tests
//!
//! Tests the sub-records written for each locale variant of an object, the
//! publication stage filter, and the warning raised when a variant cannot be
//! loaded.

mod helpers;

use helpers::catalog::localized_store;
use indexmap::IndexMap;
use reinhardt_fixture_export::engine::{LOCALE_FIELD, RECORD_ID_FIELD};
use reinhardt_fixture_export::prelude::*;
use rstest::rstest;
use serde_json::json;

fn locale_key(code: &str) -> Identity {
	Identity::Str(format!("1{}", code))
}

fn scalar(value: serde_json::Value) -> FixtureValue {
	FixtureValue::Scalar(value)
}

fn reference(type_key: &str, identity: i64) -> FixtureValue {
	FixtureValue::Reference(ForwardRef::new(type_key, identity))
}

/// Test: Each locale variant becomes a record pointing back at its base record
#[rstest]
fn test_locale_records_are_exported() {
	// Arrange
	let store = localized_store();
	let mut exporter = FixtureExporter::new(&store, ExportSettings::default());

	// Act
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();
	let snapshot = exporter.finalize().unwrap();

	// Assert
	let rows = snapshot.group("Page_Localised").unwrap();
	assert_eq!(
		rows.keys().cloned().collect::<Vec<_>>(),
		vec![locale_key("en_NZ"), locale_key("de_DE"), locale_key("fr_FR")]
	);

	let german = &rows[&locale_key("de_DE")];
	assert_eq!(german.get(RECORD_ID_FIELD), Some(&reference("Page", 1)));
	assert_eq!(german.get(LOCALE_FIELD), Some(&scalar(json!("de_DE"))));
	assert_eq!(german.get("Title"), Some(&scalar(json!("Startseite"))));
	assert_eq!(german.get("HeroID"), Some(&reference("Image", 4)));

	// Fields a locale does not translate fall back to the base record
	let english = &rows[&locale_key("en_NZ")];
	assert_eq!(english.get("Title"), Some(&scalar(json!("Home"))));
	assert_eq!(english.get("HeroID"), Some(&reference("Image", 3)));
	assert!(exporter.warnings().is_empty());
}

/// Test: Objects referenced only from a locale variant are exported too
#[rstest]
fn test_locale_references_are_followed() {
	let store = localized_store();
	let mut exporter = FixtureExporter::new(&store, ExportSettings::default());
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();

	let snapshot = exporter.finalize().unwrap();

	assert_eq!(
		snapshot.field("Image", &Identity::Int(4), "Name"),
		Some(&scalar(json!("held.png")))
	);
	assert_eq!(
		snapshot.type_keys().collect::<Vec<_>>(),
		vec!["Locale", "Image", "Page", "Page_Localised"]
	);
}

/// Test: A locale variant pointing at an unsaved object drops the reference with a warning
#[rstest]
fn test_unsaved_locale_reference_is_reported() {
	// Arrange
	let mut store = localized_store();
	store.insert(
		StoredObject::new("Image", 4)
			.with_value("Name", "held.png")
			.unsaved(),
	);
	let mut exporter = FixtureExporter::new(&store, ExportSettings::default());

	// Act
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();
	let snapshot = exporter.finalize().unwrap();

	// Assert
	let german = snapshot
		.record("Page_Localised", &locale_key("de_DE"))
		.unwrap();
	assert_eq!(german.get("Title"), Some(&scalar(json!("Startseite"))));
	assert_eq!(german.get("HeroID"), None);
	assert!(snapshot.record("Image", &Identity::Int(4)).is_none());
	assert_eq!(
		exporter.warnings(),
		vec!["Related object Image.4 of Page_Localised::Hero is not persisted; relationship skipped"]
	);
}

/// Test: The live stage leaves out draft-only variants
#[rstest]
#[case::draft(PublicationStage::Draft, 3)]
#[case::live(PublicationStage::Live, 2)]
fn test_stage_filters_variants(#[case] stage: PublicationStage, #[case] expected: usize) {
	let store = localized_store();
	let settings = ExportSettings::new().with_stage(stage);
	let mut exporter = FixtureExporter::new(&store, settings);
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();

	let snapshot = exporter.finalize().unwrap();

	assert_eq!(
		snapshot.group("Page_Localised").map(|rows| rows.len()),
		Some(expected)
	);
}

/// Test: The per-locale type suffix is configurable
#[rstest]
fn test_custom_table_suffix() {
	let store = localized_store();
	let settings = ExportSettings::new().with_localized_table_suffix("Translation");
	let mut exporter = FixtureExporter::new(&store, settings);
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();

	let snapshot = exporter.finalize().unwrap();

	assert!(snapshot.group("Page_Localised").is_none());
	assert_eq!(
		snapshot.group("Page_Translation").map(|rows| rows.len()),
		Some(3)
	);
}

/// Test: Variants at the depth limit keep their fields but not their references
#[rstest]
fn test_depth_limit_applies_to_locale_references() {
	// Arrange
	let mut store = localized_store();
	store.define_model(
		ModelDefinition::new("Link")
			.field("Label")
			.has_one("Target", "Page"),
	);
	let link = store.insert(
		StoredObject::new("Link", 1)
			.with_value("Label", "Home")
			.with_value("TargetID", 1),
	);
	let settings = ExportSettings::new().with_max_depth(1);
	let mut exporter = FixtureExporter::new(&store, settings);

	// Act
	exporter.add_root(link).unwrap();
	let snapshot = exporter.finalize().unwrap();

	// Assert
	let german = snapshot.record("Page_Localised", &locale_key("de_DE")).unwrap();
	assert_eq!(german.get("Title"), Some(&scalar(json!("Startseite"))));
	assert_eq!(german.get("HeroID"), None);
	assert!(snapshot.group("Image").is_none());
}

/// Store that hides one locale variant, as if its row had been deleted.
struct MissingVariantStore {
	inner: MemoryStore,
	missing: &'static str,
}

impl ObjectStore for MissingVariantStore {
	fn exists(&self, object: &ObjectRef) -> bool {
		self.inner.exists(object)
	}

	fn fetch(&self, type_key: &str, identity: &Identity) -> Option<ObjectRef> {
		if type_key == "Page" && self.inner.current_locale().as_deref() == Some(self.missing) {
			return None;
		}
		self.inner.fetch(type_key, identity)
	}

	fn fields(&self, type_key: &str) -> Vec<String> {
		self.inner.fields(type_key)
	}

	fn resolved_field_value(&self, object: &ObjectRef, field: &str) -> Option<StoredValue> {
		self.inner.resolved_field_value(object, field)
	}

	fn one_to_one_relationships(&self, type_key: &str) -> OneToOneRelations {
		self.inner.one_to_one_relationships(type_key)
	}

	fn one_to_many_relationships(&self, type_key: &str) -> IndexMap<String, String> {
		self.inner.one_to_many_relationships(type_key)
	}

	fn verify_reverse_one_to_one(&self, type_key: &str, relation: &str) -> ExportResult<()> {
		self.inner.verify_reverse_one_to_one(type_key, relation)
	}

	fn many_to_many_relationships(&self, type_key: &str) -> IndexMap<String, ManyToManyTarget> {
		self.inner.many_to_many_relationships(type_key)
	}

	fn related_objects(&self, object: &ObjectRef, relation: &str) -> Vec<ObjectRef> {
		self.inner.related_objects(object, relation)
	}

	fn is_excluded(&self, type_key: &str) -> bool {
		self.inner.is_excluded(type_key)
	}

	fn is_localizable(&self, object: &ObjectRef) -> bool {
		self.inner.is_localizable(object)
	}

	fn locale_codes_for(&self, object: &ObjectRef, stage: PublicationStage) -> Vec<String> {
		self.inner.locale_codes_for(object, stage)
	}

	fn with_locale_scope<R, F>(&self, code: &str, scope: F) -> R
	where
		F: FnOnce(&Self) -> R,
	{
		self.inner.with_locale_scope(code, |_| scope(self))
	}

	fn localized_field_tables(&self, type_key: &str) -> IndexMap<String, Vec<String>> {
		self.inner.localized_field_tables(type_key)
	}
}

/// Test: A variant that cannot be loaded is skipped with a warning
#[rstest]
fn test_missing_variant_warns() {
	// Arrange
	let store = MissingVariantStore {
		inner: localized_store(),
		missing: "de_DE",
	};
	let mut exporter = FixtureExporter::new(&store, ExportSettings::default());

	// Act
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();
	let snapshot = exporter.finalize().unwrap();

	// Assert
	let rows = snapshot.group("Page_Localised").unwrap();
	assert_eq!(
		rows.keys().cloned().collect::<Vec<_>>(),
		vec![locale_key("en_NZ"), locale_key("fr_FR")]
	);
	assert!(snapshot.record("Image", &Identity::Int(4)).is_none());
	assert_eq!(
		exporter.warnings(),
		vec!["DataObject Localisation could not be found for Class: Page | ID: 1 | Locale de_DE"]
	);
	assert_eq!(store.inner.current_locale(), None);
}

/// Test: Locale codes are looked up once per object
#[rstest]
fn test_locale_lookup_is_cached() {
	let store = localized_store();
	let mut exporter = FixtureExporter::new(&store, ExportSettings::default());
	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();
	exporter.finalize().unwrap();

	exporter.add_root(ObjectRef::new("Page", 1)).unwrap();
	exporter.finalize().unwrap();

	assert_eq!(store.locale_lookups(), 1);
}
