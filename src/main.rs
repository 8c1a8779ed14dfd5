use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use voice_studio_api::{config::Config, create_app, services::ExpirySweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,voice_studio_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.bind_address();
    let sweep_interval = config.sweep_interval_secs;

    tracing::info!("Voice Studio API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Generated audio directory: {}", config.generated_audio_dir);
    tracing::info!("Cloned voice directory: {}", config.cloned_voice_dir);

    let state = AppState::from_config(config)
        .await
        .context("Failed to initialise application state")?;

    let _sweeper = if sweep_interval > 0 {
        tracing::info!("Expiry sweep every {}s", sweep_interval);
        Some(ExpirySweeper::new(&state).spawn(Duration::from_secs(sweep_interval)))
    } else {
        tracing::info!("Expiry sweep disabled");
        None
    };

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
