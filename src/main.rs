// main.rs
use blogicum::{
    AppState, auth::TokenKeys, build_app, config::Config, migration::Migrator,
    service::accounts,
};
use chrono::Duration;
use poem::{Server, listener::TcpListener};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let db = Database::connect(config.database_url.as_str()).await?;
    Migrator::up(&db, None).await?;

    if let Some(superuser) = &config.superuser {
        accounts::ensure_superuser(&db, superuser).await?;
    }

    let tokens = TokenKeys::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.token_ttl_hours),
    );
    let app = build_app(AppState::new(db, tokens));

    tracing::info!(addr = %config.bind_addr, "listening");
    Server::new(TcpListener::bind(config.bind_addr.clone()))
        .run_with_graceful_shutdown(
            app,
            async {
                let _ = tokio::signal::ctrl_c().await;
            },
            None,
        )
        .await?;
    Ok(())
}
