//! Cart view and order placement. Placing an order creates a pending row and
//! pins its id on the session; checkout consumes it from there.
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tera::Context;
use tracing::error;

use crate::{dao, error::AppError, state::AppState, views};

use super::require_customer;

#[derive(Deserialize)]
pub struct PlaceOrderForm {
    amount: i64,
}

pub async fn view_cart_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (_id, session) = require_customer(&state, &headers).await?;

    let mut context = Context::new();
    context.insert("user_name", &session.user_name);

    if let Some(order_id) = session.pending_order_id {
        match dao::orders::get_by_id(&state.db, order_id).await {
            Ok(Some(order)) => context.insert("order", &order),
            Ok(None) => {}
            Err(err) => error!("failed to load pending order #{order_id}: {err}"),
        }
    }

    Ok(views::render(&state.templates, "view_cart.html", &context)?.into_response())
}

pub async fn place_order_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response, AppError> {
    let (id, session) = require_customer(&state, &headers).await?;

    if form.amount <= 0 {
        let mut context = Context::new();
        context.insert("user_name", &session.user_name);
        context.insert("error", "Order amount must be positive.");
        return Ok(views::render(&state.templates, "view_cart.html", &context)?.into_response());
    }

    let order_id = dao::orders::insert_pending(&state.db, session.account_id, form.amount).await?;

    state
        .sessions
        .update(&id, |s| s.pending_order_id = Some(order_id))
        .await;

    Ok(Redirect::to("/customer/view-cart").into_response())
}
