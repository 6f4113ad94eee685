//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use reinhardt_fixture_export::prelude::*;
//!
//! let store = MemoryStore::new();
//! let exporter = FixtureExporter::new(&store, ExportSettings::default());
//! assert_eq!(exporter.pending(), 0);
//! ```

pub use crate::engine::FixtureExporter;
pub use crate::error::{ExportError, ExportResult};
pub use crate::fixtures::{
	FixtureFormat, FixtureSnapshot, FixtureValue, ForwardRef, SnapshotSerializer,
};
pub use crate::memory::{MemoryStore, ModelDefinition, StoredObject};
pub use crate::object::{
	Identity, ManyToManyTarget, ObjectRef, ObjectStore, OneToOneRelations, PublicationStage,
	StoredValue,
};
pub use crate::settings::ExportSettings;
pub use crate::warning::ExportWarning;
