use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::{info, warn};

use shutter_server::api::AppState;
use shutter_server::config::ShutterConfig;

/// Shutter asset store HTTP server.
#[derive(Parser, Debug)]
#[command(name = "shutter-server", about = "Standalone HTTP server for Shutter")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "shutter.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prepare the configured stores (directories, database tables), then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_exists = Path::new(&cli.config).exists();
    let config: ShutterConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    if let Some(Commands::Migrate) = cli.command {
        shutter_server::telemetry::init_fmt();
        return run_migrate(&config).await;
    }

    let telemetry_guard = shutter_server::telemetry::init(&config.telemetry);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let service = shutter_server::store_factory::build_service(&config).await?;
    info!(
        max_upload_bytes = service.config().max_upload_bytes,
        allowed_mime_types = ?service.config().allowed_mime_types,
        "asset service ready"
    );

    let state = AppState {
        service: Arc::new(service),
        ui_path: Some(config.ui.dist_path.clone()),
        ui_enabled: config.ui.enabled,
    };
    let app = shutter_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "shutter-server listening");

    let stop = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let stop = Arc::clone(&stop);
        async move { stop.notified().await }
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut server => result??,
        () = shutdown_signal() => {
            stop.notify_one();
            let timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
            match tokio::time::timeout(timeout, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!(
                        timeout_secs = config.server.shutdown_timeout_seconds,
                        "shutdown timeout exceeded, dropping in-flight requests"
                    );
                    server.abort();
                }
            }
        }
    }

    telemetry_guard.shutdown();

    info!("shutter-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: open every configured store once and exit.
async fn run_migrate(config: &ShutterConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.blob.backend, "preparing blob store...");
    let _blobs = shutter_server::store_factory::create_blob_store(&config.blob).await?;

    info!(backend = %config.index.backend, "running index migrations...");
    let _index = shutter_server::store_factory::create_index(&config.index).await?;

    info!("all migrations complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
