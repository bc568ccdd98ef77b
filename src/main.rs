//! Car Rental Service
//!
//! REST API for vehicle listings, bookings and reviews.
//! Reads configuration from TOML (~/.config/car-rental/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use car_rental::config::ConfigError;
use car_rental::domain::RepositoryProvider;
use car_rental::shared::ShutdownCoordinator;
use car_rental::{
    create_api_router, default_config_path, init_database, AppConfig, InMemoryStore,
    SeaOrmRepositoryProvider,
};

fn init_logging(cfg: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if cfg.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Configuration ──────────────────────────────────────────
    let config_path = std::env::var("CAR_RENTAL_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let loaded: Result<AppConfig, ConfigError> = AppConfig::load(&config_path);
    let (app_cfg, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    let app_cfg = app_cfg.with_env_overrides();

    init_logging(&app_cfg);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    info!("Starting car rental service...");

    // Must be installed before the first metrics call
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()?;
    info!("Prometheus metrics recorder installed");

    // ── Store ──────────────────────────────────────────────────
    let mut db = None;
    let repos: Arc<dyn RepositoryProvider> = if app_cfg.uses_memory_store() {
        warn!("Using the in-memory store; data is lost on exit");
        Arc::new(InMemoryStore::new())
    } else {
        let conn = match init_database(&app_cfg.database_config()).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                return Err(e.into());
            }
        };
        db = Some(conn.clone());
        Arc::new(SeaOrmRepositoryProvider::new(conn))
    };

    let rules = app_cfg.booking_rules();
    info!(
        max_booking_days = rules.max_booking_days,
        retry_attempts = rules.retry.max_attempts,
        "Booking rules configured"
    );

    // ── Shutdown ───────────────────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── HTTP ───────────────────────────────────────────────────
    let router = create_api_router(
        repos,
        app_cfg.jwt_config(),
        rules,
        Some(prometheus_handle),
    );

    let addr = app_cfg.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    let api_shutdown = shutdown_signal.clone();
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        })
        .await;
    if let Err(e) = served {
        error!("REST API server error: {}", e);
    }

    // ── Cleanup ────────────────────────────────────────────────
    if let Some(db) = db {
        let closed = shutdown
            .cleanup_with_timeout(async move {
                if let Err(e) = db.close().await {
                    warn!("Error closing database connection: {}", e);
                }
            })
            .await;
        if closed {
            info!("Database connection closed");
        }
    }

    info!("Car rental service shutdown complete");
    Ok(())
}
