use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ks_api::app::create_app;
use ks_api::routes::auth::AppState;
use ks_core::services::{
    AuthService, BcryptPasswordVerifier, Clock, SystemClock, TokenCleanupConfig, TokenCleanupService,
    TokenServiceConfig,
};
use ks_infra::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
use ks_shared::config::environment::LogFormat;
use ks_shared::LoggingConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ks_api::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting Keystone API server");

    if config.auth.jwt.is_using_default_secret() {
        if config.environment.is_production() {
            anyhow::bail!("refusing to start in production with the default JWT secret");
        }
        warn!("Using the default JWT secret; set APP__AUTH__JWT__SECRET");
    }

    let pool = DatabasePool::new(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        pool.run_migrations().await.context("failed to run migrations")?;
    }

    let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
    let tokens = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let auth_service = Arc::new(AuthService::new(
        users,
        tokens,
        BcryptPasswordVerifier::new()?,
        TokenServiceConfig::from(&config.auth.jwt),
        clock.clone(),
    )?);

    let cleanup = Arc::new(TokenCleanupService::new(
        auth_service.token_store(),
        clock,
        TokenCleanupConfig::from(&config.auth.cleanup),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(auth_service));
    let json_limit = config.server.json_limit;
    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone(), json_limit))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {bind_address}"))?
        .run()
        .await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    pool.close().await;
    info!("Server stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
