mod db;
mod handlers;
mod models;
mod platform;
mod rooms;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use db::guild_config::GuildConfigStore;
use db::registry::RoomRegistry;
use db::store::RoomStore;
use db::RetryPolicy;
use platform::{Platform, RestPlatformClient};
use rooms::{CleanupScheduler, LifecycleController};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub controller: LifecycleController<RestPlatformClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicerooms=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set")?;
    let api_url = std::env::var("PLATFORM_API_URL")
        .context("PLATFORM_API_URL must be set")?;
    let bot_token = std::env::var("PLATFORM_BOT_TOKEN")
        .context("PLATFORM_BOT_TOKEN must be set")?;
    let bot_user_id = std::env::var("PLATFORM_BOT_USER_ID")
        .context("PLATFORM_BOT_USER_ID must be set")?;
    let host = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .context("Invalid PORT")?;
    let sweep_secs = std::env::var("SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .context("Invalid SWEEP_INTERVAL_SECS")?;

    let retry = RetryPolicy::default();

    // Set up the store; nothing works without it, so exhausting the retry
    // budget here is fatal.
    tracing::info!("Connecting to room store: {}", database_url);
    let pool = db::connect_with_retry(&database_url, &retry)
        .await
        .context("Failed to initialize room store")?;

    let store = RoomStore::new(pool.clone(), retry.clone());
    let registry = RoomRegistry::new(store);
    let configs = GuildConfigStore::new(pool, retry.clone());
    let client = RestPlatformClient::new(api_url, bot_token, bot_user_id);

    let controller = LifecycleController::new(client.clone(), registry.clone(), configs.clone());

    // The sweep only starts once the platform connection is live; a platform
    // that is slow to come up delays startup rather than aborting it.
    tracing::info!("Waiting for platform readiness");
    wait_until_ready(&client).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = CleanupScheduler::new(
        client,
        registry,
        configs,
        Duration::from_secs(sweep_secs),
    );
    let sweep_task = tokio::spawn(scheduler.run(shutdown_rx));

    let state = Arc::new(AppState { controller });

    // Build router
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/commands", post(handlers::handle_slash_command))
        .route("/components", post(handlers::handle_component))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // Stop the sweep between cycles; in-flight rows finish their branch.
    shutdown_tx.send(true).ok();
    sweep_task.await.ok();

    Ok(())
}

/// Poll the platform until it answers, backing off up to 30 seconds between
/// attempts. Boot waits for a slow platform instead of giving up on it.
async fn wait_until_ready<P: Platform>(platform: &P) {
    let mut delay = Duration::from_secs(1);
    loop {
        match platform.ping().await {
            Ok(()) => return,
            Err(e) => {
                tracing::warn!("platform not ready yet, retrying in {:?}: {}", delay, e);
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(30));
            }
        }
    }
}
