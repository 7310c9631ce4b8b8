//! API server entry point.

use api::config::{Config, LogFormat};
use api::seed::SeedData;
use booking_store::{BookingStore, InMemoryBookingStore, PostgresBookingStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_app<S: BookingStore + 'static>(
    store: S,
    config: &Config,
    seed: Option<&SeedData>,
    metrics_handle: PrometheusHandle,
) -> axum::Router {
    let state = api::create_default_state(store, config.orchestrator());
    if let Some(seed) = seed {
        seed.apply(state.directory(), state.inventory());
    }
    api::create_app(state, metrics_handle)
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env().expect("invalid configuration");
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Load seed data for the in-memory collaborators
    tracing::warn!("directory, inventory and notification gateways are in-memory fakes");
    let seed = config
        .seed_file
        .as_ref()
        .map(|path| SeedData::load(path).expect("failed to load seed file"));

    // 4. Create the booking store and application
    let app = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PostgresBookingStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL booking store");
            build_app(store, &config, seed.as_ref(), metrics_handle)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory booking store");
            build_app(InMemoryBookingStore::new(), &config, seed.as_ref(), metrics_handle)
        }
    };

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, policy = %config.room_selection, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
