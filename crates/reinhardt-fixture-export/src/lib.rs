//! Fixture export for the Reinhardt framework.
//!
//! This crate snapshots a graph of persisted objects into a fixture that can be
//! replayed into a fresh store:
//!
//! - **Traversal**: starting from root objects, follow one-to-one, one-to-many,
//!   many-to-many and per-locale relationships, processing every reachable
//!   object once
//! - **References**: relationship fields become `=>Type.Identity` tokens
//! - **Ordering**: output types are sorted so referenced types come first,
//!   with cycles reported (and optionally broken) rather than fatal
//!
//! # Features
//!
//! - `yaml` - YAML output (enabled by default)
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_fixture_export::prelude::*;
//!
//! let mut store = MemoryStore::new();
//! store.define_model(ModelDefinition::new("Folder").field("Name"));
//! store.define_model(
//!     ModelDefinition::new("File").field("Name").has_one("Parent", "Folder"),
//! );
//! store.insert(StoredObject::new("Folder", 1).with_value("Name", "Uploads"));
//! let file = store.insert(
//!     StoredObject::new("File", 7).with_value("Name", "logo.png").with_value("ParentID", 1),
//! );
//!
//! let mut exporter = FixtureExporter::new(&store, ExportSettings::default());
//! exporter.add_root(file)?;
//! let snapshot = exporter.finalize()?;
//!
//! let output = SnapshotSerializer::new()
//!     .with_format(FixtureFormat::Json)
//!     .serialize(&snapshot)?;
//! assert!(output.contains("=>Folder.1"));
//! # Ok::<(), ExportError>(())
//! ```
//!
//! # Architecture
//!
//! - [`ObjectStore`](object::ObjectStore) - Capability interface onto the persisted objects
//! - [`FixtureExporter`](engine::FixtureExporter) - Worklist traversal and finalization
//! - [`RecordStore`](store::RecordStore) - Collected records, grouped by type
//! - [`DependencyGraph`](graph::DependencyGraph) - Type edges and de-duplication registries
//! - [`KahnSorter`](sorter::KahnSorter) - Cycle-tolerant dependency ordering
//! - [`SnapshotSerializer`](fixtures::SnapshotSerializer) - YAML/JSON rendering

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod engine;
pub mod error;
pub mod fixtures;
pub mod graph;
pub mod memory;
pub mod object;
pub mod prelude;
pub mod schema;
pub mod settings;
pub mod sorter;
pub mod store;
pub mod warning;

// Re-export commonly used types at crate root
pub use engine::FixtureExporter;
pub use error::{ExportError, ExportResult};
pub use fixtures::{FixtureFormat, FixtureSnapshot, FixtureValue, ForwardRef, SnapshotSerializer};
pub use object::{Identity, ObjectRef, ObjectStore};
pub use settings::ExportSettings;
