//! `careerlens doctor`: diagnose configuration and connectivity.

use std::path::Path;
use std::sync::Arc;

use careerlens_config::AppConfig;
use careerlens_core::provider::Generator;
use careerlens_providers::DifyClient;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 CareerLens Doctor: System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `careerlens onboard`)");
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid (locale: {})", config.locale);
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid config.");
            return Ok(());
        }
    };

    // A single attempt: doctor reports, it does not wait out outages.
    match careerlens_memory::open_store(&config.database.url, 1).await {
        Ok(store) => match store.ping().await {
            Ok(()) => {
                let count = store.count().await.unwrap_or_default();
                println!("  ✅ Database reachable ({}, {count} reflections)", store.name());
            }
            Err(e) => {
                println!("  ❌ Database ping failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Database unavailable: {e}");
            issues += 1;
        }
    }

    match config.generation_settings() {
        Ok(settings) => {
            let client: Arc<dyn Generator> = Arc::new(DifyClient::new(settings)?);
            match client.health_check().await {
                Ok(true) => println!("  ✅ Generation service configured"),
                Ok(false) | Err(_) => {
                    println!("  ❌ Generation service settings rejected");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ⚠️  {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
