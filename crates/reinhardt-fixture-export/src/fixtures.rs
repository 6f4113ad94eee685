//! Fixture output: values, snapshots and serialization.

mod format;
mod serializer;
mod snapshot;
mod value;

pub use format::FixtureFormat;
pub use serializer::SnapshotSerializer;
pub use snapshot::{FixtureFields, FixtureRows, FixtureSnapshot};
pub use value::{FixtureValue, ForwardRef, InvalidForwardRef, REFERENCE_PREFIX};
