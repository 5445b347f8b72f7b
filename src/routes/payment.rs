//! Checkout flow against the payment gateway.
//!
//! Three GET routes: create a hosted-checkout link for the pending order
//! (JSON), land back from the gateway on success (marks the order paid), and
//! land back on cancel (cancels the order and returns to the cart). POST is
//! 405 on all of them and unknown sub-paths are 404, both straight from the
//! router.
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tera::Context;
use tracing::{error, info, warn};

use crate::{dao, error::AppError, state::AppState, views};

use super::require_paying_customer;

const PAYMENT_DESCRIPTION: &str = "Payment for order";
const GENERIC_PAYMENT_ERROR: &str = "An error occurred while processing the payment.";

#[derive(Serialize)]
pub struct PaymentLinkResponse {
    pub error: i32,
    pub message: String,
    pub data: Option<CheckoutUrl>,
}

#[derive(Serialize)]
pub struct CheckoutUrl {
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
}

fn json_error(message: &str) -> Response {
    Json(PaymentLinkResponse {
        error: -1,
        message: message.to_string(),
        data: None,
    })
    .into_response()
}

pub async fn create_payment_link_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let session = match require_paying_customer(&state, &headers).await {
        Ok((_id, session)) => session,
        Err(AppError::Unauthenticated) => return Redirect::to("/login").into_response(),
        Err(_) => return json_error(GENERIC_PAYMENT_ERROR),
    };

    let Some(order_id) = session.pending_order_id else {
        return json_error("No pending order found.");
    };

    let order = match dao::orders::get_by_id(&state.db, order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return json_error("Order not found."),
        Err(err) => {
            error!("order lookup failed: {err}");
            return json_error(GENERIC_PAYMENT_ERROR);
        }
    };

    let order_code = Utc::now().timestamp_millis();
    let data = state.payos.payment_data(
        order_code,
        order.amount,
        PAYMENT_DESCRIPTION,
        &state.config.base_url,
    );

    match state.payos.create_payment_link(&data).await {
        Ok(checkout) => Json(PaymentLinkResponse {
            error: 0,
            message: "success".to_string(),
            data: Some(CheckoutUrl {
                checkout_url: checkout.checkout_url,
            }),
        })
        .into_response(),
        Err(err) => {
            error!("payment link creation failed: {err}");
            json_error(GENERIC_PAYMENT_ERROR)
        }
    }
}

/// Landing route after a completed gateway payment. The pending order, when
/// the session still holds one, is marked paid exactly once.
pub async fn success_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (id, session) = require_paying_customer(&state, &headers).await?;

    if let Some(order_id) = session.pending_order_id {
        match dao::orders::pay(&state.db, order_id).await {
            Ok(true) => info!("order #{order_id} marked paid"),
            Ok(false) => warn!("order #{order_id} was not pending, leaving it untouched"),
            Err(err) => error!("failed to mark order #{order_id} paid: {err}"),
        }

        state
            .sessions
            .update(&id, |s| s.pending_order_id = None)
            .await;
    }

    let mut context = Context::new();
    context.insert("user_name", &session.user_name);

    Ok(views::render(&state.templates, "success.html", &context)?.into_response())
}

/// Landing route when the customer backs out at the gateway. The order is
/// cancelled when it is still pending; the session attribute is cleared in
/// every case.
pub async fn cancel_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (id, session) = require_paying_customer(&state, &headers).await?;

    if let Some(order_id) = session.pending_order_id {
        match dao::orders::cancel(&state.db, order_id).await {
            Ok(true) => info!("order #{order_id} was successfully cancelled"),
            Ok(false) => {
                warn!("failed to cancel order #{order_id}, it might not be in pending state")
            }
            Err(err) => error!("error cancelling order #{order_id}: {err}"),
        }

        state
            .sessions
            .update(&id, |s| s.pending_order_id = None)
            .await;
    }

    Ok(Redirect::to("/customer/view-cart").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_matches_contract() {
        let json = serde_json::to_value(PaymentLinkResponse {
            error: -1,
            message: "No pending order found.".to_string(),
            data: None,
        })
        .unwrap();

        assert_eq!(json["error"], -1);
        assert_eq!(json["message"], "No pending order found.");
        assert!(json["data"].is_null());
    }

    #[test]
    fn success_payload_carries_checkout_url() {
        let json = serde_json::to_value(PaymentLinkResponse {
            error: 0,
            message: "success".to_string(),
            data: Some(CheckoutUrl {
                checkout_url: "https://pay.example/x".to_string(),
            }),
        })
        .unwrap();

        assert_eq!(json["error"], 0);
        assert_eq!(json["data"]["checkoutUrl"], "https://pay.example/x");
    }
}
