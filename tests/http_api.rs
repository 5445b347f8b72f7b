//! Router contract tests. No live database, Redis, or payment gateway: every
//! request here is answered before a connection would be needed, so the pool
//! is created lazily and never used.
use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use dine::{
    config::{Config, PayOsConfig},
    models::Role,
    payment::PayOsClient,
    routes::build_router,
    session::SessionStore,
    state::AppState,
    views,
};

fn test_state() -> Arc<AppState> {
    let config = Config {
        port: 0,
        database_url: "postgres://127.0.0.1:1/unused".to_string(),
        redis_url: None,
        base_url: "http://localhost:8080".to_string(),
        session_ttl: Duration::from_secs(60),
        auth_secret: "test-secret".to_string(),
        payos: PayOsConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            client_id: "client".to_string(),
            api_key: "key".to_string(),
            checksum_key: "checksum".to_string(),
        },
    };

    let db = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    let sessions = SessionStore::new(config.session_ttl, None);
    let payos = PayOsClient::new(config.payos.clone());
    let templates = views::init_templates();

    Arc::new(AppState {
        config,
        db,
        sessions,
        payos,
        templates,
    })
}

fn app() -> Router {
    build_router(test_state())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_responds_ok() {
    let response = app()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn login_page_renders_a_form() {
    let response = app()
        .oneshot(Request::get("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<form"));
}

#[tokio::test]
async fn unauthenticated_profile_get_redirects_to_login() {
    let response = app()
        .oneshot(
            Request::get("/customer/profile/edit-profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn stale_session_cookie_redirects_to_login() {
    let response = app()
        .oneshot(
            Request::get("/customer/profile/edit-profile")
                .header(header::COOKIE, "sid=long-gone")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn unauthenticated_payment_link_redirects_to_login() {
    let response = app()
        .oneshot(
            Request::get("/customer/payment/create-payment-link")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn unauthenticated_staff_profile_redirects_to_login() {
    let response = app()
        .oneshot(
            Request::get("/staff/profile/edit-profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn staff_session_cannot_open_customer_pages() {
    let state = test_state();
    let sid = state
        .sessions
        .create(9, Role::Staff, "s@b.c".into(), "Sam".into())
        .await;

    let response = build_router(state)
        .oneshot(
            Request::get("/customer/profile/edit-profile")
                .header(header::COOKIE, format!("sid={sid}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn post_to_payment_route_is_method_not_allowed() {
    for path in [
        "/customer/payment/create-payment-link",
        "/customer/payment/success",
        "/customer/payment/cancel",
    ] {
        let response = app()
            .oneshot(Request::post(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{path}");
    }
}

#[tokio::test]
async fn unknown_payment_sub_path_is_not_found() {
    let response = app()
        .oneshot(
            Request::get("/customer/payment/refund")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_without_session_still_redirects() {
    let response = app()
        .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("sid="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let state = test_state();
    let sid = state
        .sessions
        .create(3, Role::Customer, "a@b.c".into(), "Ann".into())
        .await;
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::post("/logout")
                .header(header::COOKIE, format!("sid={sid}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(state.sessions.fetch(&sid).await.is_none());

    let response = app
        .oneshot(
            Request::get("/customer/view-cart")
                .header(header::COOKIE, format!("sid={sid}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}
