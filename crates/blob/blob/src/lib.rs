pub mod error;
pub mod store;
pub mod testing;

pub use error::BlobError;
pub use store::{BlobStore, BlobStream};
