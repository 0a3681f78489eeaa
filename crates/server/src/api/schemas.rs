use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use shutter_service::MetricsSnapshot;

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    #[schema(example = "asset not found: 0190f3c2-6d2b-7c1e-9a34-1f2e3d4c5b9d")]
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `true` when the index answered.
    #[schema(example = true)]
    pub ok: bool,
    /// Number of stored assets.
    #[schema(example = 42)]
    pub assets: u64,
}

/// Asset service outcome counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    /// Assets created.
    #[schema(example = 120)]
    pub created: u64,
    /// Assets deleted.
    #[schema(example = 12)]
    pub deleted: u64,
    /// Lookups or deletes for unknown ids.
    #[schema(example = 3)]
    pub not_found: u64,
    /// Uploads rejected for size or content type.
    #[schema(example = 1)]
    pub rejected: u64,
    /// Blobs removed to undo a failed create.
    #[schema(example = 0)]
    pub rollbacks: u64,
    /// Operations that ended with metadata and bytes out of step.
    #[schema(example = 0)]
    pub inconsistencies: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snap: MetricsSnapshot) -> Self {
        Self {
            created: snap.created,
            deleted: snap.deleted,
            not_found: snap.not_found,
            rejected: snap.rejected,
            rollbacks: snap.rollbacks,
            inconsistencies: snap.inconsistencies,
        }
    }
}

/// Response after deleting an asset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    /// Id of the deleted asset.
    #[schema(example = "0190f3c2-6d2b-7c1e-9a34-1f2e3d4c5b9d")]
    pub deleted: String,
}

/// Multipart upload form.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to store. Its filename and content type are recorded.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Query parameters for listing assets.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page size. Defaults to 20 and is capped by the server's maximum.
    pub limit: Option<usize>,
    /// Number of assets to skip.
    pub offset: Option<usize>,
}
