//! GeoIP lookup using MaxMind GeoLite2 databases.
//!
//! This module owns the opened databases (`ReferenceStore`), the dataset
//! capability they are read through (`DatasetHandle`/`DatasetOpener`), and
//! the fixed list of files and URLs they are refreshed from.

mod handle;
mod store;
mod types;

// Re-export public API
pub use handle::{DatasetHandle, DatasetMetadata, DatasetOpener, MmdbHandle, MmdbOpener};
pub use store::{HandleSet, ReferenceStore, ReloadReport};
pub use types::{
    DatasetKind, DatasetSource, LocationRecord, LookupOutcome, OrgRecord, ReferenceRecord,
    DATASET_SOURCES,
};
