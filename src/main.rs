use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use inventory::app::{AppServices, router};
use inventory::core::config::{Config, StoreBackend};
use inventory::core::db::{
    DbConfig, InMemoryStore, ProductRepository, ProductStore, UserRepository, UserStore, connect,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: backend={:?}, database={}, secret_key={}",
        config.store_backend,
        config.database_name,
        config.has_secret_key()
    );

    let (users, products): (Arc<dyn UserStore>, Arc<dyn ProductStore>) =
        match config.store_backend {
            StoreBackend::MongoDb => {
                let database = connect(&DbConfig::from_config(&config))
                    .await
                    .context("failed to connect to MongoDB")?;

                let user_repo = UserRepository::new(&database);
                user_repo
                    .ensure_indexes()
                    .await
                    .context("failed to create user indexes")?;

                let users: Arc<dyn UserStore> = Arc::new(user_repo);
                let products: Arc<dyn ProductStore> = Arc::new(ProductRepository::new(&database));
                (users, products)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on exit");
                let store = InMemoryStore::new();
                let users: Arc<dyn UserStore> = Arc::new(store.clone());
                let products: Arc<dyn ProductStore> = Arc::new(store);
                (users, products)
            }
        };

    let app = router(AppServices::from_config(&config, users, products));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
