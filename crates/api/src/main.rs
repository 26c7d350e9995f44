use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terranova_api::config::ServerConfig;
use terranova_api::reply;
use terranova_api::router::build_app_router;
use terranova_api::runtime::DashboardRuntime;
use terranova_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Upload directory ---
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");
    tracing::info!(path = %config.upload_dir.display(), "Upload directory ready");

    // --- App state ---
    let generator = reply::generator_from_config(&config);
    let (state, writer) =
        AppState::build(config.clone(), generator).expect("Invalid dashboard configuration");

    // --- Background tasks ---
    let runtime = DashboardRuntime::start(&state, writer);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = listen_addr(&config);
    tracing::info!(%addr, "TerraNova API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Background tasks outlive the listener; stop them last.
    runtime.stop().await;
    tracing::info!("Shutdown complete");
}

/// Console logging filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "terranova_api=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn listen_addr(config: &ServerConfig) -> SocketAddr {
    let ip: IpAddr = config
        .host
        .parse()
        .unwrap_or_else(|e| panic!("Invalid HOST '{}': {e}", config.host));
    SocketAddr::new(ip, config.port)
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!(signal = "SIGINT", "Shutting down");
        }
        () = terminate => {
            tracing::info!(signal = "SIGTERM", "Shutting down");
        }
    }
}
