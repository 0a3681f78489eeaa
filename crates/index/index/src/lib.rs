pub mod error;
pub mod index;
pub mod testing;

pub use error::IndexError;
pub use index::MetadataIndex;
