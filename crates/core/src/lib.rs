pub mod asset;
pub mod id;

pub use asset::{Asset, AssetPage};
pub use id::{IdAllocator, UuidAllocator, is_valid_id};
