//! `careerlens onboard`: first-time setup.

use std::path::Path;

use careerlens_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    println!("🧭 CareerLens: First-Time Setup");
    println!("===============================\n");

    if let Some(dir) = config_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set generation.endpoint and generation.api_key");
    println!("      (or export DIFY_API_ENDPOINT and DIFY_API_KEY)");
    println!("   2. Run: careerlens doctor");
    println!("   3. Run: careerlens serve\n");

    Ok(())
}
