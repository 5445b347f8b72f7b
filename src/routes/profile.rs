//! Customer profile editing.
//!
//! Both verbs render the same view and always hand it enough data to draw the
//! page: unread notifications, the signed-in account, and a customer object
//! that falls back to the submitted form values when the row cannot be
//! loaded.
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context;
use tracing::{error, warn};

use crate::{
    dao,
    error::AppError,
    models::{Customer, Notification},
    session::Session,
    state::AppState,
    utils::{
        self, EMAIL_COOKIE, EMAIL_COOKIE_MAX_AGE, MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
    },
    views,
};

use super::require_customer;

const TEMPLATE: &str = "customer_edit_profile.html";

#[derive(Deserialize, Default)]
pub struct ProfileForm {
    #[serde(rename = "fullName")]
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

pub async fn edit_profile_page_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (_id, session) = require_customer(&state, &headers).await?;

    let mut context = Context::new();
    let refreshed_cookie = load_page_data(&state, &session, &headers, &mut context).await;

    match dao::customers::get_by_email(&state.db, &session.email).await {
        Ok(Some(customer)) => context.insert("customer", &customer),
        Ok(None) => {}
        Err(err) => error!("failed to load customer profile: {err}"),
    }
    ensure_minimum_page_data(&mut context, &session, &ProfileForm::default());

    respond(&state, context, refreshed_cookie)
}

pub async fn edit_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let (id, session) = require_customer(&state, &headers).await?;

    let mut context = Context::new();
    let refreshed_cookie = load_page_data(&state, &session, &headers, &mut context).await;

    // The current row is loaded up front so the form never renders blank,
    // whatever the validation outcome.
    match dao::customers::get_by_email(&state.db, &session.email).await {
        Ok(Some(customer)) => context.insert("customer", &customer),
        Ok(None) => {}
        Err(err) => error!("failed to load customer profile: {err}"),
    }

    let name = utils::non_blank(form.full_name.as_deref());
    let phone = utils::non_blank(form.phone.as_deref());
    let address = utils::non_blank(form.address.as_deref());

    match (name, phone, address) {
        (Some(name), Some(phone), Some(address)) => match validate(name, phone, address) {
            Ok(()) => {
                apply_update(&state, &id, &session, &mut context, name, phone, address).await;
            }
            Err(detail) => {
                warn!("validation error during profile update: {detail}");
                context.insert("error", &format!("Validation error: {detail}"));
            }
        },
        _ => context.insert("error", "All fields are required."),
    }

    ensure_minimum_page_data(&mut context, &session, &form);

    respond(&state, context, refreshed_cookie)
}

async fn apply_update(
    state: &AppState,
    session_id: &str,
    session: &Session,
    context: &mut Context,
    name: &str,
    phone: &str,
    address: &str,
) {
    let name = utils::normalize(name);

    match dao::customers::edit_info_by_email(&state.db, &session.email, &name, phone, address)
        .await
    {
        Ok(true) => {
            let user_name = name.clone();
            state
                .sessions
                .update(session_id, |s| s.user_name = user_name)
                .await;
            context.insert("message", "Profile updated successfully.");

            // Reload; if the row vanished mid-flight, echo the submitted
            // values instead.
            match dao::customers::get_by_email(&state.db, &session.email).await {
                Ok(Some(customer)) => context.insert("customer", &customer),
                _ => context.insert(
                    "customer",
                    &Customer {
                        email: session.email.clone(),
                        full_name: name.clone(),
                        phone: phone.to_string(),
                        address: address.to_string(),
                    },
                ),
            }

            if let Ok(Some(account)) = dao::accounts::find_by_email(&state.db, &session.email).await
            {
                context.insert("user_name", &account.full_name);
                context.insert("account", &account);
            }
        }
        Ok(false) => context.insert("error", "Failed to update profile."),
        Err(err) => {
            error!("profile update failed: {err}");
            context.insert("error", "Failed to update profile.");
        }
    }
}

fn validate(name: &str, phone: &str, address: &str) -> Result<(), String> {
    utils::require_length("Full name", name, MAX_NAME_LEN)?;
    utils::require_length("Phone", phone, MAX_PHONE_LEN)?;
    utils::require_length("Address", address, MAX_ADDRESS_LEN)
}

/// Account, unread notifications, and the 30-day refresh of the persisted
/// email cookie. Failures downgrade to template vars so the page still
/// renders. Returns the Set-Cookie value when the request carried an email
/// cookie.
async fn load_page_data(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    context: &mut Context,
) -> Option<String> {
    context.insert("notifications", &Vec::<Notification>::new());

    match dao::accounts::find_by_email(&state.db, &session.email).await {
        Ok(Some(account)) => {
            context.insert("user_name", &account.full_name);

            match dao::notifications::unread_by_customer(&state.db, account.id).await {
                Ok(list) => context.insert("notifications", &list),
                Err(err) => {
                    error!("failed to load notifications: {err}");
                    context.insert("error", "Error loading page data.");
                }
            }

            context.insert("account", &account);
        }
        Ok(None) => context.insert("error", "Account not found."),
        Err(err) => {
            error!("failed to load page data: {err}");
            context.insert("error", "Error loading page data.");
        }
    }

    utils::cookie_value(headers, EMAIL_COOKIE)
        .map(|value| utils::build_cookie(EMAIL_COOKIE, &value, EMAIL_COOKIE_MAX_AGE, false))
}

/// Guarantees the view's minimum data whatever happened above: an empty
/// notification list, a user name (session value, then a placeholder), and a
/// customer object echoing the submitted fields.
fn ensure_minimum_page_data(context: &mut Context, session: &Session, form: &ProfileForm) {
    if context.get("notifications").is_none() {
        context.insert("notifications", &Vec::<Notification>::new());
    }

    if context.get("user_name").is_none() {
        if session.user_name.is_empty() {
            context.insert("user_name", "User");
        } else {
            context.insert("user_name", &session.user_name);
        }
    }

    if context.get("customer").is_none() {
        context.insert(
            "customer",
            &Customer {
                email: session.email.clone(),
                full_name: utils::non_blank(form.full_name.as_deref())
                    .unwrap_or_default()
                    .to_string(),
                phone: utils::non_blank(form.phone.as_deref())
                    .unwrap_or_default()
                    .to_string(),
                address: utils::non_blank(form.address.as_deref())
                    .unwrap_or_default()
                    .to_string(),
            },
        );
    }
}

fn respond(
    state: &AppState,
    context: Context,
    refreshed_cookie: Option<String>,
) -> Result<Response, AppError> {
    let mut response = views::render(&state.templates, TEMPLATE, &context)?.into_response();

    if let Some(cookie) = refreshed_cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn session() -> Session {
        Session {
            account_id: 1,
            role: Role::Customer,
            email: "a@b.c".to_string(),
            user_name: "Ann".to_string(),
            pending_order_id: None,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn validate_rejects_oversized_fields() {
        assert!(validate(&"a".repeat(300), "0123", "addr").is_err());
        assert!(validate("Ann", &"0".repeat(16), "addr").is_err());
        assert!(validate("Ann", "0123", &"a".repeat(256)).is_err());
        assert!(validate("Ann", "0123", "addr").is_ok());
    }

    #[test]
    fn minimum_page_data_echoes_form_fields() {
        let mut context = Context::new();
        let form = ProfileForm {
            full_name: Some("  New Name ".to_string()),
            phone: Some("012345".to_string()),
            address: None,
        };

        ensure_minimum_page_data(&mut context, &session(), &form);

        let customer = context.get("customer").expect("customer fallback");
        assert_eq!(customer["full_name"], "New Name");
        assert_eq!(customer["phone"], "012345");
        assert_eq!(customer["address"], "");
        assert_eq!(*context.get("user_name").unwrap(), "Ann");
        assert!(context.get("notifications").is_some());
    }

    #[test]
    fn minimum_page_data_keeps_existing_values() {
        let mut context = Context::new();
        context.insert("user_name", "Loaded Name");

        ensure_minimum_page_data(&mut context, &session(), &ProfileForm::default());

        assert_eq!(*context.get("user_name").unwrap(), "Loaded Name");
    }
}
