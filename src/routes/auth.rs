//! Sign-in, sign-out, and customer registration.
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tera::Context;
use tracing::warn;

use crate::{
    dao,
    error::AppError,
    models::Role,
    session::SESSION_COOKIE,
    state::AppState,
    utils::{
        self, EMAIL_COOKIE, EMAIL_COOKIE_MAX_AGE, MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
    },
    views,
};

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
    #[serde(default)]
    remember: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "fullName")]
    full_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

pub async fn login_page_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "login.html", &Context::new())
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let digest = utils::password_digest(&state.config.auth_secret, &form.password);

    let Some((account, role)) =
        dao::accounts::verify_credentials(&state.db, form.email.trim(), &digest).await?
    else {
        warn!("rejected sign-in for {}", form.email.trim());
        let mut context = Context::new();
        context.insert("error", "Invalid email or password.");
        return Ok(views::render(&state.templates, "login.html", &context)?.into_response());
    };

    let session_id = state
        .sessions
        .create(
            account.id,
            role,
            account.email.clone(),
            account.full_name.clone(),
        )
        .await;

    let target = match role {
        Role::Customer => "/customer/view-cart",
        Role::Staff => "/staff/profile/edit-profile",
    };

    let mut response = Redirect::to(target).into_response();

    let ttl = state.config.session_ttl.as_secs() as i64;
    append_cookie(
        &mut response,
        utils::build_cookie(SESSION_COOKIE, &session_id, ttl, true),
    );

    if form.remember.is_some() {
        append_cookie(
            &mut response,
            utils::build_cookie(EMAIL_COOKIE, &account.email, EMAIL_COOKIE_MAX_AGE, false),
        );
    }

    Ok(response)
}

pub async fn logout_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = utils::cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.destroy(&id).await;
    }

    let mut response = Redirect::to("/login").into_response();
    append_cookie(&mut response, utils::expire_cookie(SESSION_COOKIE));
    response
}

pub async fn register_page_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "register.html", &Context::new())
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let name = utils::non_blank(form.full_name.as_deref());
    let email = utils::non_blank(form.email.as_deref());
    let password = utils::non_blank(form.password.as_deref());
    let phone = utils::non_blank(form.phone.as_deref());
    let address = utils::non_blank(form.address.as_deref());

    let (name, email, password, phone, address) = match (name, email, password, phone, address) {
        (Some(n), Some(e), Some(p), Some(ph), Some(a)) => (n, e, p, ph, a),
        _ => return render_register_error(&state, "All fields are required."),
    };

    if let Err(detail) = validate(name, email, phone, address) {
        return render_register_error(&state, &format!("Validation error: {detail}"));
    }

    let digest = utils::password_digest(&state.config.auth_secret, password);
    let name = utils::normalize(name);

    match dao::accounts::register_customer(&state.db, email, &name, &digest, phone, address).await
    {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            render_register_error(&state, "Email is already registered.")
        }
        Err(err) => Err(err.into()),
    }
}

fn validate(name: &str, email: &str, phone: &str, address: &str) -> Result<(), String> {
    utils::require_length("Full name", name, MAX_NAME_LEN)?;
    utils::require_length("Email", email, MAX_NAME_LEN)?;
    utils::require_length("Phone", phone, MAX_PHONE_LEN)?;
    utils::require_length("Address", address, MAX_ADDRESS_LEN)
}

fn render_register_error(state: &AppState, message: &str) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("error", message);
    Ok(views::render(&state.templates, "register.html", &context)?.into_response())
}

fn append_cookie(response: &mut Response, cookie: String) {
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}
