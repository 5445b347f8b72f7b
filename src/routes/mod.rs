use std::sync::Arc;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use tracing::error;

use crate::{
    dao,
    error::AppError,
    models::Role,
    session::{Session, SESSION_COOKIE},
    state::AppState,
    utils,
};

pub mod auth;
pub mod notifications;
pub mod orders;
pub mod payment;
pub mod profile;
pub mod staff;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route(
            "/login",
            get(auth::login_page_handler).post(auth::login_handler),
        )
        .route("/logout", post(auth::logout_handler))
        .route(
            "/register",
            get(auth::register_page_handler).post(auth::register_handler),
        )
        .route(
            "/customer/profile/edit-profile",
            get(profile::edit_profile_page_handler).post(profile::edit_profile_handler),
        )
        .route(
            "/customer/payment/create-payment-link",
            get(payment::create_payment_link_handler),
        )
        .route("/customer/payment/success", get(payment::success_handler))
        .route("/customer/payment/cancel", get(payment::cancel_handler))
        .route("/customer/view-cart", get(orders::view_cart_handler))
        .route("/customer/order/place", post(orders::place_order_handler))
        .route(
            "/customer/notifications/mark-read",
            post(notifications::mark_read_handler),
        )
        .route(
            "/staff/profile/edit-profile",
            get(staff::edit_profile_page_handler).post(staff::edit_profile_handler),
        )
        .with_state(state)
}

async fn healthz_handler() -> &'static str {
    "ok"
}

/// Session behind the request's cookie, if any.
pub(crate) async fn current_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Option<(String, Session)> {
    let id = utils::cookie_value(headers, SESSION_COOKIE)?;
    let session = state.sessions.fetch(&id).await?;

    Some((id, session))
}

/// Signed-in customer or a redirect to /login.
pub(crate) async fn require_customer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Session), AppError> {
    match current_session(state, headers).await {
        Some((id, session)) if session.role == Role::Customer => Ok((id, session)),
        _ => Err(AppError::Unauthenticated),
    }
}

/// Payment routes only require a session whose customer row still exists.
pub(crate) async fn require_paying_customer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Session), AppError> {
    let (id, session) = current_session(state, headers)
        .await
        .ok_or(AppError::Unauthenticated)?;

    match dao::customers::get_by_email(&state.db, &session.email).await {
        Ok(Some(_)) => Ok((id, session)),
        Ok(None) => Err(AppError::Unauthenticated),
        Err(err) => {
            error!("customer lookup failed: {err}");
            Err(AppError::Database(err))
        }
    }
}
