use anyhow::Context;
use nexo_api::{app, AppState};
use nexo_catalog::RpcCatalogClient;
use nexo_core::{OrderRules, OrderService};
use nexo_store::{app_config::Config, DbClient, PgOrderRepository, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexo_api=debug,nexo_core=debug,nexo_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting order service on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let repo = Arc::new(PgOrderRepository::new(db.pool.clone()));

    // Catalog request/reply over Redis
    let redis = RedisClient::new(&config.redis.url, config.catalog.poll_interval())
        .await
        .context("Failed to open Redis client")?
        .with_reply_ttl(config.catalog.reply_ttl());
    if let Err(e) = redis.ping().await {
        tracing::warn!("Redis not reachable yet: {}", e);
    }
    let catalog = Arc::new(RpcCatalogClient::new(
        Arc::new(redis),
        config.catalog.subject.clone(),
        config.catalog.timeout(),
    ));

    let rules = OrderRules {
        reject_unresolved_products: config.business_rules.reject_unresolved_products,
    };
    let state = AppState::new(OrderService::new(repo, catalog, rules));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
