use std::{sync::Arc, time::Duration};

use kinship::{
    auth::{Keys, init_generator},
    config::{Config, StorageBackend},
    state::AppState,
    store::{MemoryStore, PgStore},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Environment misconfigured!");

    init_generator(config.snowflake_worker_id, config.snowflake_data_center_id);
    let keys = Keys::new(config.jwt_secret.as_bytes());

    let app_state = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .expect("Failed to create Postgres pool");

            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run database migrations");

            AppState::new(
                Arc::new(PgStore::new(pool)),
                keys,
                config.access_token_ttl_seconds,
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, nothing survives a restart");
            AppState::new(
                Arc::new(MemoryStore::new()),
                keys,
                config.access_token_ttl_seconds,
            )
        }
    };

    let app = kinship::app(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    tracing::debug!(
        "listening on {}",
        listener.local_addr().expect("Listener has no local address")
    );
    axum::serve(listener, app).await.expect("Server error");
}
