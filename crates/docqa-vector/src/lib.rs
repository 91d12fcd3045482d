//! In-memory similarity index and the immutable snapshot that serves queries.
//!
//! An [`IndexSnapshot`] bundles the chunk table, the fitted term-weighting
//! model and the [`FlatIndex`] built from it. Snapshots are never mutated;
//! a rebuild produces a new one that replaces the old wholesale.
pub mod flat;
pub mod snapshot;
pub mod store;

pub use flat::FlatIndex;
pub use snapshot::IndexSnapshot;
pub use store::{load_snapshot, save_snapshot, SNAPSHOT_FORMAT_VERSION};
