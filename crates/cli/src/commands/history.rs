//! `careerlens history`: list past reflections, newest first.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    let reflections = match limit {
        Some(limit) => store.recent(limit).await?,
        None => store.list_newest_first().await?,
    };

    if reflections.is_empty() {
        println!("No reflections yet. Run `careerlens question` to get started.");
        return Ok(());
    }

    println!("📓 Reflections ({})", reflections.len());
    println!("==================");
    for r in &reflections {
        println!();
        println!("#{}  {}", r.id, r.created_at.format("%Y-%m-%d %H:%M"));
        println!("  Q: {}", r.question);
        println!("  A: {}", r.answer);
    }

    Ok(())
}
