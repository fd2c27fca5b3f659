use anyhow::Context;

use hagakure_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hagakure_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let state = app::build_state(&config).context("failed to build application state")?;
    let router = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        token_scheme = config.token_scheme.as_str(),
        "listening"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
