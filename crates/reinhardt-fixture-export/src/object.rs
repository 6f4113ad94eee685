//! Object store capability interface.
//!
//! The exporter never talks to a database directly. Everything it needs to
//! know about persisted objects and their relationships goes through the
//! [`ObjectStore`] trait, which an ORM adapter (or the bundled
//! [`MemoryStore`](crate::memory::MemoryStore)) implements.

pub mod locale;

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::ExportResult;

pub use locale::{LocaleCodeCache, PublicationStage};

/// Primary key of a record, unique within its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identity {
	/// Integer primary key.
	Int(i64),
	/// String primary key (also used for synthetic locale record keys).
	Str(String),
}

impl Identity {
	/// Parses a textual identity, preferring the integer form.
	///
	/// # Example
	///
	/// ```
	/// # use reinhardt_fixture_export::object::Identity;
	/// assert_eq!(Identity::parse("12"), Identity::Int(12));
	/// assert_eq!(Identity::parse("12en_NZ"), Identity::Str("12en_NZ".to_string()));
	/// ```
	pub fn parse(raw: &str) -> Self {
		raw.parse::<i64>()
			.map(Self::Int)
			.unwrap_or_else(|_| Self::Str(raw.to_string()))
	}

	/// Returns the integer key, if this is one.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::Str(_) => None,
		}
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{}", value),
			Self::Str(value) => f.write_str(value),
		}
	}
}

impl Serialize for Identity {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Int(value) => serializer.serialize_i64(*value),
			Self::Str(value) => serializer.serialize_str(value),
		}
	}
}

impl From<i64> for Identity {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Identity {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<&str> for Identity {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for Identity {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

/// Handle to one persisted object: its concrete type and identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
	/// Concrete type of the object.
	pub type_key: String,
	/// Identity of the object within its type.
	pub identity: Identity,
}

impl ObjectRef {
	/// Creates a new object handle.
	pub fn new(type_key: impl Into<String>, identity: impl Into<Identity>) -> Self {
		Self {
			type_key: type_key.into(),
			identity: identity.into(),
		}
	}
}

impl fmt::Display for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.type_key, self.identity)
	}
}

/// A field value as resolved by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
	/// Plain column value.
	Scalar(serde_json::Value),
	/// A single related object.
	Object(ObjectRef),
	/// A list of related objects.
	Objects(Vec<ObjectRef>),
}

impl StoredValue {
	/// Interprets the value as a foreign key.
	///
	/// Null, zero, negative and non-numeric values all mean "no relationship".
	/// Numeric strings are accepted.
	pub fn as_foreign_key(&self) -> Option<i64> {
		let key = match self {
			Self::Scalar(serde_json::Value::Number(number)) => number.as_i64()?,
			Self::Scalar(serde_json::Value::String(raw)) => raw.trim().parse::<i64>().ok()?,
			_ => return None,
		};
		(key > 0).then_some(key)
	}

	/// Interprets the value as a non-empty string.
	pub fn as_type_name(&self) -> Option<&str> {
		match self {
			Self::Scalar(serde_json::Value::String(raw)) if !raw.is_empty() => Some(raw),
			_ => None,
		}
	}
}

/// One-to-one (foreign key) relationships declared by a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneToOneRelations {
	/// Relationship name to declared target type.
	pub relations: IndexMap<String, String>,
	/// Polymorphic overrides: foreign-key field name to the field holding the
	/// concrete target type name.
	pub type_hints: IndexMap<String, String>,
}

impl OneToOneRelations {
	/// Creates an empty relation set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a relationship to a fixed target type.
	pub fn with_relation(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.relations.insert(name.into(), target.into());
		self
	}

	/// Declares that the concrete target type for `foreign_key_field` is
	/// stored in `hint_field`.
	pub fn with_type_hint(
		mut self,
		foreign_key_field: impl Into<String>,
		hint_field: impl Into<String>,
	) -> Self {
		self.type_hints
			.insert(foreign_key_field.into(), hint_field.into());
		self
	}

	/// Returns true if no relationships are declared.
	pub fn is_empty(&self) -> bool {
		self.relations.is_empty()
	}
}

/// Target of a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManyToManyTarget {
	/// Relationship the store can enumerate directly.
	///
	/// `via` names the relationship on the target side when the declaration is
	/// qualified (`Target.via`).
	Direct {
		/// Target type.
		target_type: String,
		/// Relationship name on the target type, if qualified.
		via: Option<String>,
	},
	/// Relationship mediated by a join type.
	Through {
		/// Join type holding one row per link.
		join_type: String,
		/// Type at the far end of the join.
		target_type: String,
	},
	/// Relationship without a join entity and no deterministic identity
	/// representation.
	Unsupported {
		/// Target type.
		target_type: String,
	},
}

impl ManyToManyTarget {
	/// Unqualified direct relationship.
	pub fn direct(target_type: impl Into<String>) -> Self {
		Self::Direct {
			target_type: target_type.into(),
			via: None,
		}
	}

	/// Direct relationship qualified with the far side's relationship name.
	pub fn qualified(target_type: impl Into<String>, via: impl Into<String>) -> Self {
		Self::Direct {
			target_type: target_type.into(),
			via: Some(via.into()),
		}
	}

	/// Relationship mediated by `join_type`.
	pub fn through(join_type: impl Into<String>, target_type: impl Into<String>) -> Self {
		Self::Through {
			join_type: join_type.into(),
			target_type: target_type.into(),
		}
	}

	/// Relationship that cannot be represented in a fixture.
	pub fn unsupported(target_type: impl Into<String>) -> Self {
		Self::Unsupported {
			target_type: target_type.into(),
		}
	}

	/// Returns the type at the far end of the relationship.
	pub fn target_type(&self) -> &str {
		match self {
			Self::Direct { target_type, .. }
			| Self::Through { target_type, .. }
			| Self::Unsupported { target_type } => target_type,
		}
	}
}

/// Read-only capability interface onto the persisted object store.
///
/// Relationship maps are queried once per type and cached by the exporter,
/// so implementations may compute them on demand.
pub trait ObjectStore {
	/// Returns true if the object is backed by durable storage.
	fn exists(&self, object: &ObjectRef) -> bool;

	/// Loads an object by type and identity, honoring the active locale scope.
	///
	/// The returned handle carries the object's concrete type, which may be a
	/// subtype of `type_key`.
	fn fetch(&self, type_key: &str, identity: &Identity) -> Option<ObjectRef>;

	/// Returns the exported scalar field names of a type, in declaration order.
	fn fields(&self, type_key: &str) -> Vec<String>;

	/// Resolves a field value, applying any store-side computed override.
	fn resolved_field_value(&self, object: &ObjectRef, field: &str) -> Option<StoredValue>;

	/// Returns the one-to-one relationships declared by a type.
	fn one_to_one_relationships(&self, type_key: &str) -> OneToOneRelations;

	/// Name of the generated foreign-key field for a one-to-one relationship.
	fn foreign_key_field(&self, relation: &str) -> String {
		format!("{}ID", relation)
	}

	/// Returns reverse one-to-many relationships: name to target type.
	///
	/// The target may be qualified with the far side's relation (`Type.field`).
	fn one_to_many_relationships(&self, type_key: &str) -> IndexMap<String, String>;

	/// Checks that a one-to-many relationship has a matching one-to-one on the far side.
	///
	/// # Errors
	///
	/// Returns [`ExportError::SchemaError`](crate::error::ExportError::SchemaError)
	/// when no matching relationship exists.
	fn verify_reverse_one_to_one(&self, type_key: &str, relation: &str) -> ExportResult<()>;

	/// Returns the many-to-many relationships declared by a type.
	fn many_to_many_relationships(&self, type_key: &str) -> IndexMap<String, ManyToManyTarget>;

	/// Returns the objects on the far side of a multi-valued relationship.
	fn related_objects(&self, object: &ObjectRef, relation: &str) -> Vec<ObjectRef>;

	/// Returns true if a type opted out of relationship tracking entirely.
	fn is_excluded(&self, type_key: &str) -> bool;

	/// Returns relationship names a type asks to leave out of fixtures.
	fn excluded_relationships(&self, _type_key: &str) -> Vec<String> {
		Vec::new()
	}

	/// Returns true if the object has per-locale variants.
	fn is_localizable(&self, object: &ObjectRef) -> bool;

	/// Returns the locale codes that have a variant of this object.
	fn locale_codes_for(&self, object: &ObjectRef, stage: PublicationStage) -> Vec<String>;

	/// Runs `scope` with `code` as the ambient locale, restoring the previous
	/// locale afterwards.
	fn with_locale_scope<R, F>(&self, code: &str, scope: F) -> R
	where
		F: FnOnce(&Self) -> R;

	/// Returns per-locale tables of a type and the fields each one stores.
	fn localized_field_tables(&self, type_key: &str) -> IndexMap<String, Vec<String>>;

	/// Returns the locale definitions every localized fixture depends on.
	fn locale_registry_objects(&self) -> Vec<ObjectRef> {
		Vec::new()
	}
}
