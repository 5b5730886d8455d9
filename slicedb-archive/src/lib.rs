//! The archive container (§6 "Archive (container format)"): a ZIP file
//! holding the manifest, per-segment row streams, optional DDL sections, and
//! optional sequence sidecar values.

pub mod manifest;
pub mod reader;
pub mod writer;

pub use manifest::{Manifest, SchemaSectionsManifest, SegmentManifestEntry, SequenceManifestEntry, TableManifestEntry};
pub use reader::ArchiveReader;
pub use writer::{ArchiveWriter, Section};
