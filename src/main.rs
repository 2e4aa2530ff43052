use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use reelbox::config::AppConfig;
use reelbox::server::{self, AppState};
use reelbox::services::search;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let state = AppState::build(config).context("building application state")?;

    if let Err(err) = state.email.validate_provider().await {
        warn!(error = %err, "email provider misconfigured, sending will fail");
    }

    // Index bootstrap is best effort; the vendor may be briefly unreachable
    if let Err(err) = search::bootstrap_indexes(&state.search).await {
        warn!(error = %err, "search index bootstrap failed, continuing");
    }

    server::serve(state).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
