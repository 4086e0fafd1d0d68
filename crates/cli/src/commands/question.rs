//! `careerlens question`: print the next reflection question.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let coach = super::build_coach(&config).await?;

    let result = coach.next_question().await?;
    if result.fallback {
        println!("⚠️  {}", result.text);
    } else {
        println!("❓ {}", result.text);
    }

    Ok(())
}
