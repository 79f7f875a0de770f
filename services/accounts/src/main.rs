use std::time::Duration;

use anyhow::Context as _;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use unitask_accounts::config::AccountsConfig;
use unitask_accounts::infra::hasher::Argon2Hasher;
use unitask_accounts::router::build_router;
use unitask_accounts::state::AppState;
use unitask_accounts::usecase::login::EnsureAdminUseCase;
use unitask_accounts_migration::Migrator;
use unitask_core::config::Config;
use unitask_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AccountsConfig::from_env().context("load accounts config")?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        Migrator::up(&db, None).await.context("apply migrations")?;
        info!("migrations applied");
    }

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret.clone(),
        hasher: Argon2Hasher::default(),
        cors_origins: config.cors_allowed_origins.clone(),
    };

    if let Some((email, password)) = config.admin_seed() {
        let seed = EnsureAdminUseCase {
            repo: state.account_repo(),
            hasher: state.hasher.clone(),
        };
        seed.execute(email, password)
            .await
            .context("seed admin identity")?;
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.accounts_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("accounts service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
