use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use resumes::auth::jwt::JwtService;
use resumes::config::AppConfig;
use resumes::db;
use resumes::routes::create_router;
use resumes::s3::build_client;
use resumes::state::AppState;
use resumes::storage::S3Storage;
use resumes::store::PgResumeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "api",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        s3_bucket = %config.s3_bucket,
        s3_public_url = %config.s3_public_url,
        "loaded resume service configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let migration_pool = pool.clone();
    let applied = tokio::task::spawn_blocking(move || db::run_migrations(&migration_pool))
        .await
        .context("migration task panicked")??;
    tracing::info!(applied, "database migrations up to date");

    let s3_client = build_client(&config).await?;
    let storage = Arc::new(S3Storage::new(
        s3_client,
        config.s3_bucket.clone(),
        config.s3_public_url.clone(),
    ));
    let store = Arc::new(PgResumeStore::new(pool));
    let jwt = JwtService::from_config(&config)?;

    let listen_addr: SocketAddr =
        format!("{}:{}", config.server_host, config.server_port).parse()?;
    let state = AppState::new(config, store, storage, jwt);
    let router = create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                tracing::info!("received shutdown signal");
            }
        })
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
