mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use foodme_listings::ListingsClient;
use foodme_search::{SearchService, ThreadRandom};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = foodme_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting foodme-server");
    if config.is_development() && config.listings_api_key.is_none() {
        tracing::warn!("FOODME_LISTINGS_API_KEY is unset; provider requests are unauthenticated");
    }

    let pool_config = foodme_db::PoolConfig::from_app_config(&config);
    let pool = foodme_db::connect_pool(&config.database_url, pool_config).await?;
    foodme_db::run_migrations(&pool).await?;

    let listings = ListingsClient::with_base_url(
        config.listings_api_key.as_deref(),
        config.provider_timeout_secs,
        &config.listings_user_agent,
        &config.listings_base_url,
    )?;
    let search = SearchService::new(
        Arc::new(listings),
        Arc::new(ThreadRandom),
        Duration::from_secs(config.provider_timeout_secs),
    );

    let state = AppState {
        directory: Arc::new(foodme_db::PgDirectory::new(pool)),
        search,
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
