use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flighthub_api::{app, AppState};
use flighthub_booking::{spawn_expiry_sweeper, ServiceSettings};
use flighthub_store::{Config, DbClient, Storage, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flighthub_api=debug,flighthub_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    config.validate().context("Invalid config")?;
    tracing::info!("Starting FlightHub API on port {}", config.server.port);

    let storage = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Storage::memory()
        }
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .context("storage.backend = \"postgres\" requires a [database] section")?;
            let db = DbClient::new(db_config)
                .await
                .context("Failed to connect to Postgres")?;
            if db_config.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            if db_config.seed_flights {
                db.seed_flights_if_empty()
                    .await
                    .context("Failed to seed flights")?;
            }
            Storage::postgres(&db)
        }
    };

    let state = AppState::new(
        &storage,
        ServiceSettings {
            deadline: config.payments.deadline,
            verify_totals: config.pricing.verify_totals,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = match config.payments.sweep_interval_seconds {
        0 => None,
        secs => Some(spawn_expiry_sweeper(
            state.services.pending.clone(),
            Duration::from_secs(secs),
            shutdown_rx,
        )),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
