use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Metadata record for a stored asset.
///
/// The raw bytes live in a blob store under the same `id`. A record is never
/// mutated after creation; it is only deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Asset {
    /// Opaque unique identifier.
    #[cfg_attr(
        feature = "openapi",
        schema(example = "0190f3c2-7d1e-7a4b-9c55-2f4e8a1b3c9d")
    )]
    pub id: String,
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
    /// Client-supplied filename, stored verbatim.
    #[cfg_attr(feature = "openapi", schema(example = "capture-1700000000000.jpg"))]
    pub filename: String,
    /// MIME content type of the stored bytes.
    #[cfg_attr(feature = "openapi", schema(example = "image/jpeg"))]
    pub mime: String,
    /// Size of the stored bytes.
    #[cfg_attr(feature = "openapi", schema(example = 48_213))]
    pub size: u64,
}

impl Asset {
    /// Create a record stamped with the current time.
    ///
    /// The timestamp is truncated to microseconds so it survives a round trip
    /// through backends with microsecond precision unchanged.
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        mime: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now().trunc_subsecs(6),
            filename: filename.into(),
            mime: mime.into(),
            size,
        }
    }
}

/// One page of a newest-first asset listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssetPage {
    /// Records in this page.
    pub items: Vec<Asset>,
    /// Total number of records at the time of the listing.
    #[cfg_attr(feature = "openapi", schema(example = 42))]
    pub total: u64,
}
