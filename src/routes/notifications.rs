use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::Deserialize;
use tracing::warn;

use crate::{dao, error::AppError, state::AppState};

use super::require_customer;

#[derive(Deserialize)]
pub struct MarkReadForm {
    id: i32,
}

pub async fn mark_read_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<MarkReadForm>,
) -> Result<Redirect, AppError> {
    let (_id, session) = require_customer(&state, &headers).await?;

    if !dao::notifications::mark_read(&state.db, form.id, session.account_id).await? {
        warn!(
            "notification #{} not found for account #{}",
            form.id, session.account_id
        );
    }

    Ok(Redirect::to("/customer/profile/edit-profile"))
}
