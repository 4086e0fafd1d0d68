pub mod advice;
pub mod doctor;
pub mod history;
pub mod onboard;
pub mod question;
pub mod save;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use careerlens_agent::ReflectionCoach;
use careerlens_config::AppConfig;
use careerlens_core::memory::ReflectionStore;
use careerlens_memory::{ConnectionGuard, connect_store};
use careerlens_providers::DifyClient;

/// Load config from `path` (or the default location) with env overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => AppConfig::load()?,
    };
    Ok(config)
}

/// Connect to the configured store under the connection guard.
pub async fn open_store(
    config: &AppConfig,
) -> Result<Arc<dyn ReflectionStore>, Box<dyn std::error::Error>> {
    let guard = ConnectionGuard::new(
        config.database.connect_attempts,
        config.database.retry_delay(),
    );
    let store = connect_store(&guard, &config.database.url, config.database.max_connections)
        .await
        .map_err(|e| format!("Database unavailable: {e}"))?;
    Ok(store)
}

/// Build the coach: store first, then the generation client.
pub async fn build_coach(config: &AppConfig) -> Result<ReflectionCoach, Box<dyn std::error::Error>> {
    let settings = config.generation_settings()?;
    let store = open_store(config).await?;
    let client = DifyClient::new(settings)?;
    Ok(ReflectionCoach::new(store, Arc::new(client), config.locale))
}
