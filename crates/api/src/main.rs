//! Helpdesk API server

use anyhow::Context;
use helpdesk_api::{routes::create_router, AppState, Config, Store};
use helpdesk_shared::{create_pool, run_migrations};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("helpdesk_api=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to init subscriber: {}", e))
}

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set - using in-memory store, data is lost on restart");
        return Ok(Store::memory());
    };

    let pool = create_pool(url, config.database_max_connections)
        .await
        .context("connecting to database")?;
    if config.run_migrations {
        run_migrations(&pool).await.context("running migrations")?;
        tracing::info!("Database migrations applied");
    }
    Ok(Store::Postgres(helpdesk_api::store::PgStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = Config::from_env().context("loading configuration")?;
    let bind_address = config.bind_address.clone();

    let store = open_store(&config).await?;
    let state = AppState::new(config, store).context("building application state")?;
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {}", bind_address))?;
    tracing::info!(address = %bind_address, version = env!("CARGO_PKG_VERSION"), "Helpdesk API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
