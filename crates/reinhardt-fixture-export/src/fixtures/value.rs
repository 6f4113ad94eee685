//! Field values as they appear in an exported fixture.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::object::{Identity, ObjectRef};

/// Prefix marking a forward reference in fixture output.
pub const REFERENCE_PREFIX: &str = "=>";

/// Forward-reference token, rendered as `=>TypeKey.Identity`.
///
/// The replay side resolves these against the identities it creates, so the
/// text form must be reproduced exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForwardRef {
	/// Referenced type.
	pub type_key: String,
	/// Referenced identity.
	pub identity: Identity,
}

impl ForwardRef {
	/// Creates a reference to `type_key` / `identity`.
	pub fn new(type_key: impl Into<String>, identity: impl Into<Identity>) -> Self {
		Self {
			type_key: type_key.into(),
			identity: identity.into(),
		}
	}

	/// Creates a reference to an object.
	pub fn to(object: &ObjectRef) -> Self {
		Self {
			type_key: object.type_key.clone(),
			identity: object.identity.clone(),
		}
	}

	/// Returns true if the reference points at `type_key`.
	pub fn targets(&self, type_key: &str) -> bool {
		self.type_key == type_key
	}
}

impl fmt::Display for ForwardRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}.{}", REFERENCE_PREFIX, self.type_key, self.identity)
	}
}

/// Error returned when a string is not a forward-reference token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid forward reference: {0:?}")]
pub struct InvalidForwardRef(pub String);

impl FromStr for ForwardRef {
	type Err = InvalidForwardRef;

	/// Parses `=>Type.Identity`. The identity is everything after the last
	/// dot, so dotted type keys (`app.Model`) survive.
	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let body = raw
			.strip_prefix(REFERENCE_PREFIX)
			.ok_or_else(|| InvalidForwardRef(raw.to_string()))?;
		match body.rsplit_once('.') {
			Some((type_key, identity)) if !type_key.is_empty() && !identity.is_empty() => {
				Ok(Self::new(type_key, Identity::parse(identity)))
			}
			_ => Err(InvalidForwardRef(raw.to_string())),
		}
	}
}

impl Serialize for ForwardRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// One exported field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FixtureValue {
	/// Plain column value.
	Scalar(serde_json::Value),
	/// Single-valued relationship.
	Reference(ForwardRef),
	/// Multi-valued relationship.
	References(Vec<ForwardRef>),
}

impl FixtureValue {
	/// Returns the reference, if this is a single-valued relationship.
	pub fn as_reference(&self) -> Option<&ForwardRef> {
		match self {
			Self::Reference(reference) => Some(reference),
			_ => None,
		}
	}

	/// Returns the references, if this is a multi-valued relationship.
	pub fn as_references(&self) -> Option<&[ForwardRef]> {
		match self {
			Self::References(references) => Some(references),
			_ => None,
		}
	}

	/// Returns the scalar, if this is a plain column value.
	pub fn as_scalar(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Scalar(value) => Some(value),
			_ => None,
		}
	}

	/// Returns true if any reference in this value points at `type_key`.
	pub fn references_type(&self, type_key: &str) -> bool {
		match self {
			Self::Scalar(_) => false,
			Self::Reference(reference) => reference.targets(type_key),
			Self::References(references) => references.iter().any(|r| r.targets(type_key)),
		}
	}
}

impl From<serde_json::Value> for FixtureValue {
	fn from(value: serde_json::Value) -> Self {
		Self::Scalar(value)
	}
}

impl From<ForwardRef> for FixtureValue {
	fn from(reference: ForwardRef) -> Self {
		Self::Reference(reference)
	}
}

impl From<Vec<ForwardRef>> for FixtureValue {
	fn from(references: Vec<ForwardRef>) -> Self {
		Self::References(references)
	}
}
