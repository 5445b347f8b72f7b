//! Staff profile editing. Staff pages only require a signed-in session with
//! an email; the staff lookup itself scopes the rest.
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context;
use tracing::{error, warn};

use crate::{
    dao,
    error::AppError,
    state::AppState,
    utils::{self, MAX_NAME_LEN},
    views,
};

use super::current_session;

const TEMPLATE: &str = "staff_edit_profile.html";

#[derive(Deserialize)]
pub struct StaffForm {
    #[serde(rename = "fullName")]
    full_name: Option<String>,
}

pub async fn edit_profile_page_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let (_id, session) = current_session(&state, &headers)
        .await
        .ok_or(AppError::Unauthenticated)?;

    let mut context = Context::new();
    load_staff(&state, &session.email, &mut context).await;

    views::render(&state.templates, TEMPLATE, &context)
}

pub async fn edit_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<StaffForm>,
) -> Result<Response, AppError> {
    let (id, session) = current_session(&state, &headers)
        .await
        .ok_or(AppError::Unauthenticated)?;

    let mut context = Context::new();

    match utils::non_blank(form.full_name.as_deref()) {
        Some(name) => match utils::require_length("Full name", name, MAX_NAME_LEN) {
            Ok(()) => {
                let name = utils::normalize(name);

                match dao::staff::edit_name_by_email(&state.db, &session.email, &name).await {
                    Ok(true) => {
                        let user_name = name.clone();
                        state.sessions.update(&id, |s| s.user_name = user_name).await;
                        context.insert("message", "Profile updated successfully.");
                    }
                    Ok(false) => context.insert("error", "Failed to update profile."),
                    Err(err) => {
                        error!("staff profile update failed: {err}");
                        context.insert("error", "Failed to update profile.");
                    }
                }
            }
            Err(detail) => {
                warn!("validation error during staff profile update: {detail}");
                context.insert("error", &format!("Validation error: {detail}"));
            }
        },
        None => context.insert("error", "Invalid input."),
    }

    load_staff(&state, &session.email, &mut context).await;

    Ok(views::render(&state.templates, TEMPLATE, &context)?.into_response())
}

async fn load_staff(state: &AppState, email: &str, context: &mut Context) {
    match dao::staff::get_by_email(&state.db, email).await {
        Ok(Some(staff)) => context.insert("staff", &staff),
        Ok(None) => {}
        Err(err) => error!("failed to load staff profile: {err}"),
    }
}
