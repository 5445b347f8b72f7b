use std::sync::Arc;

use sqlx::PgPool;
use tera::Tera;

use crate::{
    config::Config,
    database::{init_postgres, init_redis},
    payment::PayOsClient,
    session::SessionStore,
    views::init_templates,
};

pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub sessions: SessionStore,
    pub payos: PayOsClient,
    pub templates: Tera,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = init_postgres(&config.database_url).await;

        let redis = match &config.redis_url {
            Some(url) => init_redis(url).await,
            None => None,
        };
        let sessions = SessionStore::new(config.session_ttl, redis);

        let payos = PayOsClient::new(config.payos.clone());
        let templates = init_templates();

        Arc::new(Self {
            config,
            db,
            sessions,
            payos,
            templates,
        })
    }
}
