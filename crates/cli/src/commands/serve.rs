//! `careerlens serve`: start the HTTP API server.

use std::path::Path;

use tracing::error;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🧭 CareerLens Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Locale:    {}", config.locale);

    // The gateway must not accept traffic before the store is reachable.
    let coach = super::build_coach(&config).await.inspect_err(|e| {
        error!(error = %e, "Startup aborted");
    })?;

    careerlens_gateway::start(&config, coach).await?;

    Ok(())
}
