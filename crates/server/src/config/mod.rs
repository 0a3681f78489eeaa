mod server;
mod storage;
mod telemetry;


pub use server::*;
pub use storage::*;
pub use telemetry::*;

use serde::Deserialize;
use shutter_service::ServiceConfig;

/// Top-level configuration for the Shutter server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct ShutterConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob store backend configuration.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Metadata index backend configuration.
    #[serde(default)]
    pub index: IndexConfig,
    /// Upload limits and listing defaults.
    #[serde(default)]
    pub assets: ServiceConfig,
    /// Static frontend configuration.
    #[serde(default)]
    pub ui: UiConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
