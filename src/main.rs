use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doorman::auth;
use doorman::config::Config;
use doorman::AppState;

// How often the expired-session sweeper runs
const PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Parser, Debug)]
#[command(name = "doorman")]
#[command(author, version, about = "A small members-area web app with session login and admin roles", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "doorman.toml", env = "DOORMAN_CONFIG")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override listening port
    #[arg(short, long, env = "DOORMAN_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Doorman v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database; the listener is not bound until this completes,
    // so no request ever sees a half-ready store.
    let db = doorman::db::init(&config.database.data_dir, &config.database.file).await?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Ensure the configured admin account exists
    match (&config.auth.admin_email, &config.auth.admin_password) {
        (Some(email), Some(password)) => {
            let hash = auth::hash_password(password, config.auth.password_cost)?;
            state
                .users
                .ensure_admin(&config.auth.admin_name, email, &hash)
                .await?;
        }
        (None, None) => {}
        _ => tracing::warn!(
            "Both auth.admin_email and auth.admin_password must be set to create the bootstrap admin"
        ),
    }

    // Sweep expired sessions in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired sessions", n),
                Err(e) => tracing::error!("Session purge failed: {}", e),
            }
        }
    });

    let app = doorman::ui::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
