//! # Storage
//!
//! Postgres holds the rows (accounts, customers, staff, orders,
//! notifications); the schema ships as a sqlx migration and is applied at
//! startup. Redis is optional and only backs the session store so a restart
//! does not log everyone out.
use std::time::Duration;

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;

pub async fn init_postgres(database_url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
        .expect("Database misconfigured!");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Migrations failed!");

    pool
}

pub async fn init_redis(redis_url: &str) -> Option<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)
        .map_err(|e| {
            warn!("Invalid redis url, sessions stay in-process: {e}");
        })
        .ok()?;

    client
        .get_connection_manager_with_config(config)
        .await
        .map_err(|e| {
            warn!("Redis unavailable, sessions stay in-process: {e}");
        })
        .ok()
}
