//! shift-portal — weekly shift availability links
//!
//! Long-running service that:
//! - Issues single-week shift tokens for employees (admin API key)
//! - Shows token holders the shifts their branch assignments allow
//! - Records their weekly choices

use std::net::SocketAddr;

use shift_portal::BoxError;
use shift_portal::api;
use shift_portal::config::Config;
use shift_portal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_portal=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting shift-portal (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    tracing::info!(storage = state.store.backend(), "Storage ready");

    let app = api::create_router(state.clone());

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("shift-portal HTTP listening on {http_addr}");

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
