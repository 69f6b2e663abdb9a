use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use notification_cell::{notification_channel, spawn_dispatcher, HttpDispatcher};
use shared_config::AppConfig;

const NOTIFICATION_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HealthMate booking API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Notification outbox: state transitions enqueue here, the worker
    // delivers independently so provider hiccups never fail a booking.
    let (outbox, receiver) = notification_channel(NOTIFICATION_QUEUE_CAPACITY);
    match HttpDispatcher::new(&config) {
        Ok(dispatcher) => {
            spawn_dispatcher(receiver, Arc::new(dispatcher));
        }
        Err(e) => {
            warn!("Notification dispatcher disabled: {}", e);
            drop(receiver);
        }
    }

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let state = Arc::new(config);

    // Build the application router
    let app = router::create_router(state)
        .layer(axum::Extension(outbox))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
