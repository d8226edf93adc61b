pub(crate) mod controllers;
pub(crate) mod core;
pub(crate) mod routes;
pub(crate) mod store;
pub(crate) mod types;
pub(crate) mod utils;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::config::{Args, StoreKind};
use crate::core::error::ConfigError as Error;
use crate::core::state::{AppState, Settings};
use crate::store::Store;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;

pub use crate::core::error::ConfigError;

/// How long canceled requests get to write their responses.
const CANCEL_FLUSH: Duration = Duration::from_secs(1);

pub async fn run() -> Result<(), Error> {
    let config = Args::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings {
        secret: config.secret.clone(),
        token_ttl: Duration::from_secs(config.token_ttl),
        request_timeout: Duration::from_secs(config.request_timeout),
        bcrypt_cost: config.bcrypt_cost,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let canceled = shutdown_rx.clone();

    let state = match config.store {
        StoreKind::Postgres => {
            let store = PgStore::connect(&config.database_url(), config.database_max_connections)
                .await?;
            AppState::new(Arc::new(store), settings, shutdown_rx)?
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, nothing will be persisted");
            AppState::new(Arc::new(MemoryStore::new()), settings, shutdown_rx)?
        }
    };

    let store = state.store.clone();
    let app = routes::router::routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(Error::IO)?;

    tracing::info!("listening on port {}", config.port);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(
        shutdown_tx,
        Duration::from_secs(config.shutdown_grace),
    ))
    .into_future();

    tokio::select! {
        result = server => result.map_err(Error::IO)?,
        () = drain_deadline(canceled, CANCEL_FLUSH) => {
            tracing::warn!("connections still open after cancellation, closing anyway");
        }
    }

    close_store(store).await;

    Ok(())
}

/// Resolves on ctrl-c. In-flight requests get `grace` to finish before their
/// store calls are canceled.
async fn shutdown_signal(shutdown: watch::Sender<bool>, grace: Duration) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down, draining for up to {:?}", grace);

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("grace period elapsed, canceling in-flight requests");
        let _ = shutdown.send(true);
    });
}

/// Resolves `flush` after in-flight store calls have been canceled.
async fn drain_deadline(mut canceled: watch::Receiver<bool>, flush: Duration) {
    let sent = canceled.wait_for(|canceled| *canceled).await.is_ok();
    if !sent {
        std::future::pending::<()>().await;
    }

    tokio::time::sleep(flush).await;
}

async fn close_store(store: Arc<dyn Store>) {
    store.close().await;
    tracing::info!("store closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLUSH: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_drain_deadline_waits_for_cancellation() {
        let (tx, rx) = watch::channel(false);

        let early = drain_deadline(rx.clone(), FLUSH);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), early)
                .await
                .is_err()
        );

        tx.send(true).unwrap();
        let late = drain_deadline(rx, FLUSH);
        assert!(tokio::time::timeout(Duration::from_secs(1), late).await.is_ok());
    }

    #[tokio::test]
    async fn test_drain_deadline_without_signal_never_fires() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let result = tokio::time::timeout(Duration::from_millis(50), drain_deadline(rx, FLUSH)).await;

        assert!(result.is_err());
    }
}
