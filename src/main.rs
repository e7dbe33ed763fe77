//! Gigboard binary entry point

use gigboard::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging from the `logging` section
/// 3. Initialize metrics
/// 4. Initialize AppState
/// 5. Start the background profile sync task (if enabled)
/// 6. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    init_tracing(&config.logging);
    tracing::info!(
        remote = %config.remote.path.display(),
        cache = %config.cache.path.display(),
        "Starting Gigboard..."
    );

    // 3. Initialize metrics
    gigboard::metrics::init_metrics();

    // 4. Initialize application state
    let state = AppState::new(config.clone()).await?;

    // 5. Start background tasks
    if config.sync.enabled {
        spawn_profile_sync_task(state.clone());
    }

    // 6. Start HTTP server
    let app = gigboard::build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `logging.level` when set.
fn init_tracing(logging: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("gigboard={},tower_http=debug", logging.level).into()
    });

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Spawn background profile sync task
fn spawn_profile_sync_task(state: AppState) {
    tokio::spawn(async move {
        let configured_interval_secs = state.config.sync.interval_seconds;
        let interval_secs = configured_interval_secs.max(1);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));

        // Consume the immediate first tick so the first sync runs one interval after startup.
        interval.tick().await;

        loop {
            interval.tick().await;

            match state.workers.sync_cached_profile().await {
                Ok(Some(outcome)) => {
                    tracing::info!(outcome = outcome.as_str(), "Scheduled profile sync completed")
                }
                Ok(None) => tracing::debug!("No cached profile; skipping scheduled sync"),
                Err(error) => tracing::error!(%error, "Scheduled profile sync failed"),
            }
        }
    });

    tracing::info!("Profile sync task spawned");
}
