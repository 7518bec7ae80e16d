//! # StudioPlan API Server
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/studioplan \
//! AUTH_JWT_SECRET=... \
//! cargo run -p studioplan-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured logs.

use anyhow::Context;
use std::sync::Arc;
use studioplan_api::{
    app::{build_router, AppState},
    config::Config,
};
use studioplan_shared::db::{migrations::run_migrations, pool};
use studioplan_shared::genai::gemini::GeminiClient;
use studioplan_shared::store::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "StudioPlan API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("failed to load configuration")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    run_migrations(&db)
        .await
        .context("failed to run migrations")?;

    let generator =
        GeminiClient::new(config.gemini.client_config()).context("failed to build Gemini client")?;

    let address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(db.clone())), Arc::new(generator), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studioplan_api=debug,studioplan_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
