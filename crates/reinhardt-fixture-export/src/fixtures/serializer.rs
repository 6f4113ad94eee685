//! Rendering snapshots as fixture files.

use std::path::Path;

use tracing::debug;

use super::{FixtureFormat, FixtureSnapshot};
use crate::error::{ExportError, ExportResult};
use crate::settings::ExportSettings;

/// Renders a [`FixtureSnapshot`] as YAML or JSON.
#[derive(Debug, Clone)]
pub struct SnapshotSerializer {
	/// Output format.
	format: FixtureFormat,

	/// Pretty-print JSON output.
	pretty: bool,
}

impl SnapshotSerializer {
	/// Creates a serializer with default settings (YAML).
	pub fn new() -> Self {
		Self {
			format: FixtureFormat::default(),
			pretty: true,
		}
	}

	/// Creates a serializer for the format implied by `path`, falling back to
	/// the default format.
	pub fn for_path(path: &Path) -> Self {
		Self::new().with_format(FixtureFormat::from_path(path).unwrap_or_default())
	}

	/// Creates a serializer for the format chosen in `settings`.
	pub fn from_settings(settings: &ExportSettings) -> Self {
		Self::new().with_format(settings.format)
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Sets whether JSON output is pretty-printed. YAML ignores this.
	pub fn with_pretty(mut self, pretty: bool) -> Self {
		self.pretty = pretty;
		self
	}

	/// Serializes a snapshot to a string.
	pub fn serialize(&self, snapshot: &FixtureSnapshot) -> ExportResult<String> {
		match self.format {
			FixtureFormat::Json => self.serialize_json(snapshot),
			FixtureFormat::Yaml => self.serialize_yaml(snapshot),
		}
	}

	fn serialize_json(&self, snapshot: &FixtureSnapshot) -> ExportResult<String> {
		if self.pretty {
			serde_json::to_string_pretty(snapshot)
				.map_err(|e| ExportError::SerializationError(e.to_string()))
		} else {
			serde_json::to_string(snapshot)
				.map_err(|e| ExportError::SerializationError(e.to_string()))
		}
	}

	#[cfg(feature = "yaml")]
	fn serialize_yaml(&self, snapshot: &FixtureSnapshot) -> ExportResult<String> {
		serde_yaml::to_string(snapshot).map_err(|e| ExportError::SerializationError(e.to_string()))
	}

	#[cfg(not(feature = "yaml"))]
	fn serialize_yaml(&self, _snapshot: &FixtureSnapshot) -> ExportResult<String> {
		Err(ExportError::UnsupportedFormat(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	/// Writes a serialized snapshot to `path`.
	pub fn write_to_file(&self, snapshot: &FixtureSnapshot, path: &Path) -> ExportResult<()> {
		let content = self.serialize(snapshot)?;
		std::fs::write(path, content)?;
		debug!(
			"Wrote {} fixture with {} records to {}",
			self.format,
			snapshot.record_count(),
			path.display()
		);
		Ok(())
	}

	/// Returns the configured output format.
	pub fn format(&self) -> FixtureFormat {
		self.format
	}
}

impl Default for SnapshotSerializer {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::{FixtureRows, FixtureValue, ForwardRef};
	use crate::object::Identity;
	use indexmap::IndexMap;
	use rstest::{fixture, rstest};
	use serde_json::json;
	use tempfile::tempdir;

	#[fixture]
	fn snapshot() -> FixtureSnapshot {
		let mut fields = IndexMap::new();
		fields.insert("Title".to_string(), FixtureValue::Scalar(json!("Home")));
		fields.insert(
			"Tags".to_string(),
			FixtureValue::References(vec![ForwardRef::new("Tag", 1), ForwardRef::new("Tag", 2)]),
		);
		let mut snapshot = FixtureSnapshot::new();
		snapshot.insert_group("Page", FixtureRows::from([(Identity::Int(1), fields)]));
		snapshot
	}

	#[rstest]
	fn test_serialize_json_pretty(snapshot: FixtureSnapshot) {
		let serializer = SnapshotSerializer::new().with_format(FixtureFormat::Json);

		let output = serializer.serialize(&snapshot).unwrap();

		assert!(output.contains("\"Title\": \"Home\""));
		assert!(output.contains("\"=>Tag.1\""));
		assert!(output.contains('\n'));
	}

	#[rstest]
	fn test_serialize_json_compact(snapshot: FixtureSnapshot) {
		let serializer = SnapshotSerializer::new()
			.with_format(FixtureFormat::Json)
			.with_pretty(false);

		let output = serializer.serialize(&snapshot).unwrap();

		assert_eq!(
			output,
			r#"{"Page":{"1":{"Title":"Home","Tags":["=>Tag.1","=>Tag.2"]}}}"#
		);
	}

	#[cfg(feature = "yaml")]
	#[rstest]
	fn test_serialize_yaml(snapshot: FixtureSnapshot) {
		let serializer = SnapshotSerializer::new();

		let output = serializer.serialize(&snapshot).unwrap();
		let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();

		assert_eq!(parsed["Page"][1]["Title"], serde_yaml::Value::from("Home"));
		assert_eq!(parsed["Page"][1]["Tags"][0], serde_yaml::Value::from("=>Tag.1"));
	}

	#[rstest]
	fn test_write_to_file(snapshot: FixtureSnapshot) {
		let dir = tempdir().unwrap();
		let path = dir.path().join("site.json");
		let serializer = SnapshotSerializer::for_path(&path);

		serializer.write_to_file(&snapshot, &path).unwrap();

		let content = std::fs::read_to_string(&path).unwrap();
		assert_eq!(serializer.format(), FixtureFormat::Json);
		assert!(content.contains("=>Tag.2"));
	}

	#[rstest]
	#[case(FixtureFormat::Json)]
	#[case(FixtureFormat::Yaml)]
	fn test_from_settings_uses_configured_format(#[case] format: FixtureFormat) {
		let settings = ExportSettings::new().with_format(format);

		let serializer = SnapshotSerializer::from_settings(&settings);

		assert_eq!(serializer.format(), format);
	}

	#[rstest]
	fn test_for_path_falls_back_to_default() {
		let serializer = SnapshotSerializer::for_path(Path::new("fixture"));
		assert_eq!(serializer.format(), FixtureFormat::Yaml);
	}
}
