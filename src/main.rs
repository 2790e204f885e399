//! Account Ledger API
//!
//! HTTP front end for account statements and balance-changing transactions.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `8080`)
//! - `STORAGE_MODE`: `postgres` (default) | `in_memory`
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`: `PostgreSQL` connection
//! - `DB_SSLMODE`: libpq ssl mode (default: `disable`)
//! - `DB_POOL_SIZE`: maximum pool connections (default: `10`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)
//! - `RUST_LOG`: Logging filter (default: `account_ledger_api=info,tower_http=info`)

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_ledger_api::api::{AppState, create_router};
use account_ledger_api::infrastructure::{AppConfig, StoreFactory};

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_ledger_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = config.worker_threads {
        builder.worker_threads(threads);
        tracing::info!(threads, "Tokio worker_threads set");
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(%error, "Failed to create tokio runtime");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main(config));
}

async fn async_main(config: AppConfig) {
    tracing::info!(
        storage_mode = ?config.storage_mode,
        address = %config.bind_address(),
        "Starting Account Ledger API"
    );

    let factory = StoreFactory::new(config.storage_mode, config.database.clone());
    let store = match factory.create().await {
        Ok(store) => {
            tracing::info!("Account store initialized");
            store
        }
        Err(error) => {
            tracing::error!("Failed to initialize account store: {}", error);
            std::process::exit(1);
        }
    };

    let application = create_router(AppState::new(Arc::clone(&store)))
        .layer(TraceLayer::new_for_http());

    let address = config.bind_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %address, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let served = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;

    if let Err(error) = served {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
///
/// A handler that cannot be installed never completes, so the other signal
/// still shuts the server down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
