//! In-memory [`MetadataIndex`](shutter_index::MetadataIndex) backend.

mod index;

pub use index::MemoryMetadataIndex;
