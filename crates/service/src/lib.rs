pub mod builder;
pub mod config;
pub mod error;
pub mod locks;
pub mod metrics;
pub mod service;

pub use builder::AssetServiceBuilder;
pub use config::ServiceConfig;
pub use error::AssetError;
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use service::{AssetContent, AssetService};
