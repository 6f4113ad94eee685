//! Prebuilt object graphs.
//!
//! Each builder returns a [`MemoryStore`] holding a small, self-contained
//! object graph. Identities are fixed so tests can assert on exact tokens.

use reinhardt_fixture_export::memory::{MemoryStore, ModelDefinition, StoredObject};
use reinhardt_fixture_export::object::ObjectRef;
use serde_json::json;

/// A small site: pages with a parent, a hero image, an owner, content blocks
/// and tags.
///
/// - `Page 1` "Home" owns blocks 11 and 12, is tagged 1 and 2
/// - `Page 2` "About" is a child of page 1
/// - `Image 3` is the hero of both pages
/// - `Member 9` owns page 1
pub fn site_store() -> MemoryStore {
	let mut store = MemoryStore::new();
	store
		.define_model(ModelDefinition::new("Image").field("Name"))
		.define_model(ModelDefinition::new("Member").field("FirstName"))
		.define_model(
			ModelDefinition::new("Page")
				.field("Title")
				.has_one("Parent", "Page")
				.has_one("Hero", "Image")
				.has_one("Owner", "Member")
				.has_many("Blocks", "Block.Page")
				.many_many("Tags", "Tag"),
		)
		.define_model(
			ModelDefinition::new("Block")
				.field("Content")
				.has_one("Page", "Page"),
		)
		.define_model(
			ModelDefinition::new("Tag")
				.field("Name")
				.belongs_many_many("Pages", "Page", "Tags"),
		);

	store.insert(StoredObject::new("Image", 3).with_value("Name", "hero.png"));
	store.insert(StoredObject::new("Member", 9).with_value("FirstName", "Ada"));
	store.insert(
		StoredObject::new("Page", 1)
			.with_value("Title", "Home")
			.with_value("HeroID", 3)
			.with_value("OwnerID", 9)
			.with_related(
				"Blocks",
				[ObjectRef::new("Block", 11), ObjectRef::new("Block", 12)],
			)
			.with_related("Tags", [ObjectRef::new("Tag", 1), ObjectRef::new("Tag", 2)]),
	);
	store.insert(
		StoredObject::new("Page", 2)
			.with_value("Title", "About")
			.with_value("ParentID", 1)
			.with_value("HeroID", 3),
	);
	store.insert(
		StoredObject::new("Block", 11)
			.with_value("Content", "Intro")
			.with_value("PageID", 1),
	);
	store.insert(
		StoredObject::new("Block", 12)
			.with_value("Content", "Outro")
			.with_value("PageID", 1),
	);
	store.insert(
		StoredObject::new("Tag", 1)
			.with_value("Name", "news")
			.with_related("Pages", [ObjectRef::new("Page", 1)]),
	);
	store.insert(
		StoredObject::new("Tag", 2)
			.with_value("Name", "events")
			.with_related("Pages", [ObjectRef::new("Page", 1)]),
	);
	store
}

/// Butter made from milk and salt, milk coming from a cow.
pub fn dairy_store() -> MemoryStore {
	let mut store = MemoryStore::new();
	store
		.define_model(ModelDefinition::new("Cow").field("Name"))
		.define_model(ModelDefinition::new("Salt").field("Grain"))
		.define_model(
			ModelDefinition::new("Milk")
				.field("FatContent")
				.has_one("Cow", "Cow"),
		)
		.define_model(
			ModelDefinition::new("Butter")
				.field("Brand")
				.has_one("Milk", "Milk")
				.has_one("Salt", "Salt"),
		);

	store.insert(StoredObject::new("Cow", 1).with_value("Name", "Daisy"));
	store.insert(StoredObject::new("Salt", 1).with_value("Grain", "flaky"));
	store.insert(
		StoredObject::new("Milk", 1)
			.with_value("FatContent", 3.5)
			.with_value("CowID", 1),
	);
	store.insert(
		StoredObject::new("Butter", 1)
			.with_value("Brand", "Golden")
			.with_value("MilkID", 1)
			.with_value("SaltID", 1),
	);
	store
}

/// Two types referencing each other: an author's favourite book is their own.
pub fn library_store() -> MemoryStore {
	let mut store = MemoryStore::new();
	store
		.define_model(
			ModelDefinition::new("Author")
				.field("Name")
				.has_one("FavouriteBook", "Book"),
		)
		.define_model(
			ModelDefinition::new("Book")
				.field("Title")
				.has_one("Writer", "Author"),
		);

	store.insert(
		StoredObject::new("Author", 1)
			.with_value("Name", "Le Guin")
			.with_value("FavouriteBookID", 1),
	);
	store.insert(
		StoredObject::new("Book", 1)
			.with_value("Title", "The Dispossessed")
			.with_value("WriterID", 1),
	);
	store
}

/// Localized pages with a locale registry.
///
/// - `Locale 1` is `en_NZ`, `Locale 2` is `de_DE`
/// - `Page 1` has published `en_NZ` and `de_DE` variants and a draft-only
///   `fr_FR` variant; the German variant points at its own hero image
pub fn localized_store() -> MemoryStore {
	let mut store = MemoryStore::new();
	store
		.define_model(ModelDefinition::new("Locale").field("Locale").field("Title"))
		.define_model(ModelDefinition::new("Image").field("Name"))
		.define_model(
			ModelDefinition::new("Page")
				.field("Title")
				.has_one("Hero", "Image")
				.localized_table("Page", ["Title", "HeroID"]),
		)
		.set_locale_registry_type("Locale");

	store.insert(
		StoredObject::new("Locale", 1)
			.with_value("Locale", "en_NZ")
			.with_value("Title", "English (NZ)"),
	);
	store.insert(
		StoredObject::new("Locale", 2)
			.with_value("Locale", "de_DE")
			.with_value("Title", "Deutsch"),
	);
	store.insert(StoredObject::new("Image", 3).with_value("Name", "hero.png"));
	store.insert(StoredObject::new("Image", 4).with_value("Name", "held.png"));
	store.insert(
		StoredObject::new("Page", 1)
			.with_value("Title", "Home")
			.with_value("HeroID", 3)
			.with_localization("en_NZ", [("Title", json!("Home"))])
			.with_localization(
				"de_DE",
				[("Title", json!("Startseite")), ("HeroID", json!(4))],
			)
			.with_draft_localization("fr_FR", [("Title", json!("Accueil"))]),
	);
	store
}
