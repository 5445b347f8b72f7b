//! Food ordering backend.
//!
//! Customer and staff profile management plus an order checkout flow against
//! the PayOS hosted-checkout gateway. Handlers are thin: check the session,
//! move a row or two through the data-access layer, then render a view or
//! redirect.
//!
//! # Endpoints
//! - `GET|POST /login`, `POST /logout`, `GET|POST /register`
//! - `GET|POST /customer/profile/edit-profile`
//! - `GET /customer/payment/create-payment-link` (JSON)
//! - `GET /customer/payment/success`, `GET /customer/payment/cancel`
//! - `GET /customer/view-cart`, `POST /customer/order/place`
//! - `POST /customer/notifications/mark-read`
//! - `GET|POST /staff/profile/edit-profile`
//!
//! # Session attributes
//! Account id, role, email, user name, and the pending order id live in the
//! server-side session store behind the `sid` cookie; a persisted `email`
//! cookie is refreshed with a 30-day max-age on profile page loads.
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod dao;
pub mod database;
pub mod error;
pub mod models;
pub mod payment;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;
pub mod views;

use routes::build_router;
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = build_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
