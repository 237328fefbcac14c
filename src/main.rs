use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assessment_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::HttpRecommender,
};

/// How often abandoned sessions are looked for
const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize application state
    let recommender = HttpRecommender::new(config.recommender_url.clone());
    let state = AppState::new(Arc::new(recommender))
        .with_session_idle_timeout(config.session_idle_timeout());
    state.spawn_session_sweeper(SESSION_SWEEP_PERIOD);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(
        address = %address,
        recommender_url = %config.recommender_url,
        "Server running"
    );
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
