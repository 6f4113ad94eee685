//! Export settings.
//!
//! Settings can be built in code with the `with_*` methods or read from a TOML
//! document. Every key is optional:
//!
//! ```toml
//! max_depth = 2
//! excluded_types = ["Member"]
//! stage = "live"
//! localized_table_suffix = "Localised"
//! break_cycles = false
//! format = "json"
//!
//! [excluded_relationships]
//! Page = ["Versions", "Owner"]
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::fixtures::FixtureFormat;
use crate::object::PublicationStage;

/// Suffix appended to per-locale table names to form their record type.
pub const DEFAULT_LOCALIZED_TABLE_SUFFIX: &str = "Localised";

/// Options controlling one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
	/// Maximum relationship depth below the roots. `None` means no limit and
	/// `Some(0)` is treated the same way.
	pub max_depth: Option<usize>,

	/// Target types never followed through a relationship.
	pub excluded_types: Vec<String>,

	/// Relationship names to skip, per declaring type. Merged with what the
	/// store declares.
	pub excluded_relationships: IndexMap<String, Vec<String>>,

	/// Publication stage whose locale variants are exported.
	pub stage: PublicationStage,

	/// Suffix for per-locale record types (`{table}_{suffix}`).
	pub localized_table_suffix: String,

	/// Remove looping edges and the fields behind them before sorting. On by
	/// default; when off, cycles are only reported by the sorter.
	pub break_cycles: bool,

	/// Output format.
	pub format: FixtureFormat,
}

impl Default for ExportSettings {
	fn default() -> Self {
		Self {
			max_depth: None,
			excluded_types: Vec::new(),
			excluded_relationships: IndexMap::new(),
			stage: PublicationStage::Draft,
			localized_table_suffix: DEFAULT_LOCALIZED_TABLE_SUFFIX.to_string(),
			break_cycles: true,
			format: FixtureFormat::default(),
		}
	}
}

impl ExportSettings {
	/// Creates default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from a TOML document.
	///
	/// # Errors
	///
	/// Returns [`ExportError::SettingsError`] if the document is malformed or
	/// fails validation.
	pub fn from_toml_str(raw: &str) -> ExportResult<Self> {
		let settings: Self =
			toml::from_str(raw).map_err(|e| ExportError::SettingsError(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads settings from a TOML file.
	pub fn from_file(path: &Path) -> ExportResult<Self> {
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Checks values that deserialization cannot.
	pub fn validate(&self) -> ExportResult<()> {
		if self.localized_table_suffix.trim().is_empty() {
			return Err(ExportError::SettingsError(
				"localized_table_suffix must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Sets the maximum depth.
	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = Some(depth);
		self
	}

	/// Adds a type that is never followed.
	pub fn with_excluded_type(mut self, type_key: impl Into<String>) -> Self {
		self.excluded_types.push(type_key.into());
		self
	}

	/// Adds a relationship to skip on `type_key`.
	pub fn with_excluded_relationship(
		mut self,
		type_key: impl Into<String>,
		relationship: impl Into<String>,
	) -> Self {
		self.excluded_relationships
			.entry(type_key.into())
			.or_default()
			.push(relationship.into());
		self
	}

	/// Sets the publication stage.
	pub fn with_stage(mut self, stage: PublicationStage) -> Self {
		self.stage = stage;
		self
	}

	/// Sets the per-locale record type suffix.
	pub fn with_localized_table_suffix(mut self, suffix: impl Into<String>) -> Self {
		self.localized_table_suffix = suffix.into();
		self
	}

	/// Enables or disables cycle breaking.
	pub fn with_break_cycles(mut self, enabled: bool) -> Self {
		self.break_cycles = enabled;
		self
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Returns true if `type_key` must never be followed.
	pub fn is_type_excluded(&self, type_key: &str) -> bool {
		self.excluded_types.iter().any(|excluded| excluded == type_key)
	}

	/// Returns the configured relationship exclusions for `type_key`.
	pub fn excluded_relationships_for(&self, type_key: &str) -> &[String] {
		self.excluded_relationships
			.get(type_key)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Returns the record type used for a per-locale table.
	pub fn localized_type_key(&self, table: &str) -> String {
		format!("{}_{}", table, self.localized_table_suffix)
	}
}
