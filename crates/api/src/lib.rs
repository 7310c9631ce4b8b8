//! HTTP API server with observability for the hotel booking engine.
//!
//! Exposes the booking and waiting-list operations as REST endpoints, with
//! structured logging (tracing) and Prometheus metrics.
//!
//! The user directory, hotel inventory and notification gateways wired here
//! are the in-memory fakes from the `booking` crate, populated from the seed
//! file. No network client for the real services ships with this crate; only
//! the booking store has a production (PostgreSQL) implementation.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use booking::{
    BookingOrchestrator, InMemoryDirectoryGateway, InMemoryInventoryGateway,
    InMemoryNotificationGateway, OrchestratorConfig,
};
use booking_store::BookingStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Orchestrator wired to the in-memory directory, inventory and notification
/// gateways. These are test fakes, not clients of the real services.
pub type Orchestrator<S> = BookingOrchestrator<
    S,
    InMemoryDirectoryGateway,
    InMemoryInventoryGateway,
    InMemoryNotificationGateway,
>;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub orchestrator: Orchestrator<S>,
}

impl<S: BookingStore + 'static> AppState<S> {
    /// Returns the in-memory user directory, for seeding.
    pub fn directory(&self) -> &InMemoryDirectoryGateway {
        self.orchestrator.directory()
    }

    /// Returns the in-memory hotel inventory, for seeding.
    pub fn inventory(&self) -> &InMemoryInventoryGateway {
        self.orchestrator.inventory()
    }

    pub fn notifications(&self) -> &InMemoryNotificationGateway {
        self.orchestrator.notifications()
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: BookingStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/bookings", post(routes::bookings::create::<S>))
        .route(
            "/bookings/{id}",
            get(routes::bookings::get::<S>).put(routes::bookings::update::<S>),
        )
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel::<S>))
        .route("/waitlist", post(routes::waitlist::create::<S>))
        .route(
            "/waitlist/{id}",
            get(routes::waitlist::get::<S>)
                .put(routes::waitlist::update::<S>)
                .delete(routes::waitlist::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store, with
/// in-memory collaborators.
pub fn create_default_state<S: BookingStore + 'static>(
    store: S,
    config: OrchestratorConfig,
) -> Arc<AppState<S>> {
    let orchestrator = BookingOrchestrator::new(
        Arc::new(store),
        Arc::new(InMemoryDirectoryGateway::new()),
        Arc::new(InMemoryInventoryGateway::new()),
        Arc::new(InMemoryNotificationGateway::new()),
        config,
    );

    Arc::new(AppState { orchestrator })
}
