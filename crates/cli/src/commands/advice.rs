//! `careerlens advice`: synthesize advice from the whole history.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let coach = super::build_coach(&config).await?;

    let result = coach.advice().await?;
    if result.fallback {
        println!("⚠️  {}", result.text);
    } else {
        println!("💡 Career advice");
        println!("================\n");
        println!("{}", result.text);
    }

    Ok(())
}
